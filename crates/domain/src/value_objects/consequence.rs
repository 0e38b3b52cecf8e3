//! Canonical consequence records.
//!
//! Everything the pipeline applies to a protagonist or the world is expressed
//! as a [`ConsequenceSet`]. Generated output is parsed into this shape at the
//! boundary; fallback tables are written in it directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target name of the global surveillance accumulator for `world_state` consequences.
pub const SURVEILLANCE_INFLUENCE_TARGET: &str = "surveillance_influence";

/// Narrative used when a consequence payload carries none.
pub const PLACEHOLDER_NARRATIVE: &str = "Something happens as a result of your choice.";

/// What part of the state a consequence touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsequenceKind {
    Reputation,
    Relationship,
    Trait,
    #[serde(alias = "stats")]
    Stat,
    #[serde(alias = "worldState", alias = "world")]
    WorldState,
    #[serde(alias = "storyFlag")]
    StoryFlag,
}

impl fmt::Display for ConsequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConsequenceKind::Reputation => "reputation",
            ConsequenceKind::Relationship => "relationship",
            ConsequenceKind::Trait => "trait",
            ConsequenceKind::Stat => "stat",
            ConsequenceKind::WorldState => "world_state",
            ConsequenceKind::StoryFlag => "story_flag",
        };
        f.write_str(s)
    }
}

/// A single immediate effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consequence {
    #[serde(rename = "type")]
    pub kind: ConsequenceKind,
    pub target: String,
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub description: String,
}

impl Consequence {
    pub fn new(
        kind: ConsequenceKind,
        target: impl Into<String>,
        value: i32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            target: target.into(),
            value,
            description: description.into(),
        }
    }

    pub fn reputation(target: impl Into<String>, value: i32, description: impl Into<String>) -> Self {
        Self::new(ConsequenceKind::Reputation, target, value, description)
    }

    pub fn relationship(target: impl Into<String>, value: i32, description: impl Into<String>) -> Self {
        Self::new(ConsequenceKind::Relationship, target, value, description)
    }

    pub fn trait_tag(target: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(ConsequenceKind::Trait, target, 1, description)
    }

    pub fn stat(target: impl Into<String>, value: i32, description: impl Into<String>) -> Self {
        Self::new(ConsequenceKind::Stat, target, value, description)
    }

    pub fn story_flag(target: impl Into<String>, value: i32, description: impl Into<String>) -> Self {
        Self::new(ConsequenceKind::StoryFlag, target, value, description)
    }

    /// Whether a `world_state` target names the surveillance accumulator.
    pub fn targets_surveillance(&self) -> bool {
        let folded: String = self
            .target
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        matches!(folded.as_str(), "surveillanceinfluence" | "eaiinfluence")
    }
}

/// Flavor of a deferred consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DelayedKind {
    #[default]
    Event,
    Opportunity,
    Threat,
}

/// A consequence that becomes due some time after it was queued.
///
/// `timeline` is narrative text ("72 hours"); only `delay_secs` drives
/// scheduling, and it defaults to 0 (due on the next tick).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayedConsequence {
    #[serde(rename = "type", default)]
    pub kind: DelayedKind,
    #[serde(default)]
    pub trigger: String,
    #[serde(default, alias = "description")]
    pub effect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default)]
    pub delay_secs: u64,
}

impl DelayedConsequence {
    pub fn event(trigger: impl Into<String>, effect: impl Into<String>, timeline: impl Into<String>) -> Self {
        Self {
            kind: DelayedKind::Event,
            trigger: trigger.into(),
            effect: effect.into(),
            timeline: Some(timeline.into()),
            delay_secs: 0,
        }
    }

    pub fn with_delay_secs(mut self, delay_secs: u64) -> Self {
        self.delay_secs = delay_secs;
        self
    }
}

/// Immediate effects, deferred effects, and the narrative shown to the player.
///
/// Both sequences are always present; an empty list means "none".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsequenceSet {
    pub immediate: Vec<Consequence>,
    pub delayed: Vec<DelayedConsequence>,
    pub narrative: String,
}

impl ConsequenceSet {
    pub fn new(
        immediate: Vec<Consequence>,
        delayed: Vec<DelayedConsequence>,
        narrative: impl Into<String>,
    ) -> Self {
        Self {
            immediate,
            delayed,
            narrative: narrative.into(),
        }
    }

    /// A set that changes nothing.
    pub fn empty(narrative: impl Into<String>) -> Self {
        Self::new(Vec::new(), Vec::new(), narrative)
    }

    pub fn is_empty(&self) -> bool {
        self.immediate.is_empty() && self.delayed.is_empty()
    }
}

/// Where a consequence set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsequenceSource {
    Generated,
    Fallback,
    /// No consequences were produced (unknown choice pattern).
    None,
}
