//! Consequence use cases - parsing, resolution, application and promotion.

pub mod apply;
pub mod normalize;
pub mod resolve;
pub mod scheduler;

pub use apply::{ApplyConsequences, ApplySummary};
pub use normalize::{normalize, normalize_dialogue, NormalizeError};
pub use resolve::ResolveConsequences;
pub use scheduler::PromoteDelayed;
