//! Protagonist use cases.

use std::sync::Arc;

mod management;

pub use management::ProtagonistManagement;

/// Container for protagonist use cases.
pub struct ProtagonistUseCases {
    pub management: Arc<ProtagonistManagement>,
}

impl ProtagonistUseCases {
    pub fn new(management: Arc<ProtagonistManagement>) -> Self {
        Self { management }
    }
}
