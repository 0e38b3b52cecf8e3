//! Errors surfaced to callers of the chapter pipeline.
//!
//! Only precondition violations end up here. Generator trouble and unknown
//! choice patterns are recovered inside the pipeline and never reach callers.

use solterra_domain::{DomainError, ProtagonistId, Stage};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChapterError {
    #[error("Character not found: {0}")]
    CharacterNotFound(ProtagonistId),

    /// Another choice for the same character is still being processed.
    #[error("A choice is already in progress for character {0}")]
    ChoiceInProgress(ProtagonistId),

    #[error("Stage mismatch: chapter is at {expected}, choice was made in {got}")]
    StageMismatch { expected: Stage, got: Stage },

    #[error("No chapter in progress for character {0}")]
    ChapterNotStarted(ProtagonistId),

    #[error("Discovery already resolved this chapter")]
    DiscoveryAlreadyResolved,

    #[error("No underground contact has been made")]
    NoActiveContact,

    #[error("Unknown colleague: {0}")]
    UnknownColleague(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
