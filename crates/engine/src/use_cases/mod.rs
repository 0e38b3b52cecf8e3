//! Use cases - Player-facing operations of the narrative engine.
//!
//! Each module contains use cases for one area of play. Use cases
//! orchestrate the stores, the domain rules and the infrastructure ports.

pub mod chapter;
pub mod consequences;
pub mod conversation;
pub mod persistence;
pub mod prompts;
pub mod protagonist;

#[cfg(test)]
mod pipeline_tests;

// Re-export main types
pub use chapter::{ChapterError, ChapterUseCases};
pub use conversation::ConversationUseCases;
pub use persistence::{LoadGame, LoadOutcome, SaveGame, SaveState};
pub use protagonist::ProtagonistUseCases;
