//! Conversation use cases.
//!
//! Colleagues answer from the generator when it is available and from their
//! own canned dialogue patterns otherwise.

use std::sync::Arc;

mod converse;

pub use converse::Converse;

/// Container for conversation use cases.
pub struct ConversationUseCases {
    pub converse: Arc<Converse>,
}

impl ConversationUseCases {
    pub fn new(converse: Arc<Converse>) -> Self {
        Self { converse }
    }
}
