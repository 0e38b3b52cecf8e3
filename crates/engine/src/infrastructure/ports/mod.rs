//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Language model calls (could swap the messages API for another provider)
//! - Narrative generation (live vs. unavailable)
//! - Save storage (SQLite, in-memory)
//! - Clock/Random (for testing)

mod error;
mod external;
mod testing;

pub use external::{
    ChatMessage, FinishReason, GenerationKind, GenerationRequest, GeneratorUsage, LlmPort,
    LlmRequest, LlmResponse, MessageRole, NarrativeGenerator, SaveStore, TokenUsage,
};

#[cfg(test)]
pub use external::{MockLlmPort, MockNarrativeGenerator, MockSaveStore};

#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};

pub use testing::{ClockPort, RandomPort};

pub use error::{GeneratorError, LlmError, RepoError};
