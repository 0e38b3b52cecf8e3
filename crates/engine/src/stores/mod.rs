//! In-memory state storage modules.
//!
//! Stores hold the live game state between persistence checkpoints:
//! - `GameStore` - protagonists, per-character chapter sessions, world state
//! - `DelayedQueue` - FIFO of delayed consequences awaiting promotion

pub mod delayed_queue;
pub mod game_store;

pub use delayed_queue::DelayedQueue;
pub use game_store::{ChapterSession, GameStore};
