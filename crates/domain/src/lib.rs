//! Core types and rules of the Solterra narrative engine.
//!
//! Pure data and pure functions only: the closed enumerations, static content
//! tables, and the rules the engine's pipeline is built from. Nothing here
//! performs I/O or logs.

extern crate self as solterra_domain;

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{
    affiliated_faction, ChapterProgress, ChapterRecord, ChapterSetup, ChapterSummary, ChoiceRecord,
    Colleague, FactionState, GlobalEvent, Protagonist, ProtagonistSummary, QueuedConsequence,
    RegionState, StatKind, WorldState,
};
pub use error::DomainError;
pub use ids::{ProtagonistId, QueuedConsequenceId};
pub use value_objects::{
    choice_fallback, choice_pattern, discovery_fallback, response_fallback,
    response_options, BackgroundCategory, BackgroundScore, Consequence, ConsequenceKind,
    ConsequenceSet, ConsequenceSource, ContactMethod, ContactRecord, DelayedConsequence,
    DelayedKind, Dialogue, DialogueOption, DiscoveryState, DiscoveryTier, Faction, KnowledgeFlag,
    MessageTemplate, PatternWeights, Region, RiskLevel, SocialClass, Stage, StageInfo, TierPolicy,
    Urgency, DEFAULT_BACKGROUND_THRESHOLD, DEFAULT_NARRATIVE, FALLBACK_DIALOGUE_LINES, PLACEHOLDER_NARRATIVE,
    RESPONSE_WINDOW_HOURS, SECURITY_ALERT_SURVEILLANCE, SURVEILLANCE_INFLUENCE_TARGET,
};
