//! Chapter use cases.
//!
//! A chapter walks the protagonist through a fixed chain of stages. Each
//! choice goes through one of four steps:
//! 1. Background-building choices feed the accumulator (RecordChoice)
//! 2. The technical investigation resolves a discovery tier (ResolveDiscovery)
//! 3. The underground contact reaches out (SelectContact)
//! 4. The protagonist answers the contact (RespondToContact)
//!
//! ChapterProgression owns the stage chain and the per-character locking.

use std::sync::Arc;

use solterra_domain::{BackgroundCategory, ConsequenceSet, ConsequenceSource, Dialogue};

mod accumulator;
mod contact;
mod discovery;
mod error;
mod progression;

pub use accumulator::RecordChoice;
pub use contact::{RespondToContact, SelectContact};
pub use discovery::ResolveDiscovery;
pub use error::ChapterError;
pub use progression::{
    ChapterProgression, ChapterStatus, ChoiceOutcome, FinalizedChapter, CONTACT_REPLY_CHOICE,
    DISCOVERY_CHOICE, INITIAL_CONTACT_CHOICE,
};

/// What a single step produced, before the consequences are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub consequences: ConsequenceSet,
    pub source: ConsequenceSource,
    /// Set when this step made a background decisive.
    pub background_established: Option<BackgroundCategory>,
    pub contact: Option<Dialogue>,
}

impl StepOutcome {
    pub fn new(consequences: ConsequenceSet, source: ConsequenceSource) -> Self {
        Self {
            consequences,
            source,
            background_established: None,
            contact: None,
        }
    }
}

/// Container for chapter use cases.
pub struct ChapterUseCases {
    pub progression: Arc<ChapterProgression>,
}

impl ChapterUseCases {
    pub fn new(progression: Arc<ChapterProgression>) -> Self {
        Self { progression }
    }
}
