//! Value objects - Immutable objects defined by their attributes

mod background;
mod consequence;
mod contact;
mod dialogue;
mod discovery;
mod fallback;
mod realm;
mod stage;

pub use background::{
    choice_pattern, BackgroundCategory, BackgroundScore, PatternWeights,
    DEFAULT_BACKGROUND_THRESHOLD,
};
pub use consequence::{
    Consequence, ConsequenceKind, ConsequenceSet, ConsequenceSource, DelayedConsequence,
    DelayedKind, PLACEHOLDER_NARRATIVE, SURVEILLANCE_INFLUENCE_TARGET,
};
pub use contact::{
    response_options, ContactMethod, ContactRecord, MessageTemplate, Urgency,
    RESPONSE_WINDOW_HOURS,
};
pub use dialogue::{Dialogue, DialogueOption};
pub use discovery::{
    DiscoveryState, DiscoveryTier, KnowledgeFlag, RiskLevel, TierPolicy,
    SECURITY_ALERT_SURVEILLANCE,
};
pub use fallback::{
    choice_fallback, discovery_fallback, response_fallback, DEFAULT_NARRATIVE,
    FALLBACK_DIALOGUE_LINES,
};
pub use realm::{Faction, Region, SocialClass};
pub use stage::{Stage, StageInfo};
