//! Domain entities - Core business objects with identity

mod chapter;
mod colleague;
mod protagonist;
mod queued_consequence;
mod world;

pub use chapter::{ChapterProgress, ChapterRecord, ChapterSetup, ChapterSummary};
pub use colleague::Colleague;
pub use protagonist::{ChoiceRecord, Protagonist, ProtagonistSummary, StatKind};
pub use queued_consequence::QueuedConsequence;
pub use world::{affiliated_faction, FactionState, GlobalEvent, RegionState, WorldState};
