//! Protagonist entity - the player character and everything the pipeline
//! mutates on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::{
    BackgroundCategory, ChapterRecord, DomainError, Faction, ProtagonistId, Region, SocialClass,
    Stage,
};

/// Numeric stats tracked on a protagonist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Stress,
    Knowledge,
    Influence,
}

impl StatKind {
    pub fn all() -> &'static [StatKind] {
        &[StatKind::Stress, StatKind::Knowledge, StatKind::Influence]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Stress => "stress",
            StatKind::Knowledge => "knowledge",
            StatKind::Influence => "influence",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stress" => Ok(StatKind::Stress),
            "knowledge" => Ok(StatKind::Knowledge),
            "influence" => Ok(StatKind::Influence),
            _ => Err(DomainError::parse(format!("Unknown stat: {}", s))),
        }
    }
}

/// One processed choice in a chapter's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    pub stage: Stage,
    pub choice_type: String,
    pub choice_value: String,
    pub made_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protagonist {
    pub id: ProtagonistId,
    pub name: String,
    /// `None` until one category has become decisive.
    pub background: Option<BackgroundCategory>,
    pub traits: BTreeSet<String>,
    pub social_class: SocialClass,
    pub region: Region,
    pub stats: BTreeMap<StatKind, i32>,
    pub reputation: BTreeMap<Region, i32>,
    pub relationships: BTreeMap<Faction, i32>,
    pub specializations: BTreeSet<String>,
    pub chapter_history: BTreeMap<u32, ChapterRecord>,
    pub chapter: u32,
    pub created_at: DateTime<Utc>,
}

impl Protagonist {
    /// A fresh Qadir technician from Valoria with every map zeroed.
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ProtagonistId::new(),
            name: name.into(),
            background: None,
            traits: BTreeSet::new(),
            social_class: SocialClass::Qadir,
            region: Region::Valoria,
            stats: StatKind::all().iter().map(|s| (*s, 0)).collect(),
            reputation: Region::all().iter().map(|r| (*r, 0)).collect(),
            relationships: Faction::all().iter().map(|f| (*f, 0)).collect(),
            specializations: BTreeSet::new(),
            chapter_history: BTreeMap::new(),
            chapter: 1,
            created_at: now,
        }
    }

    /// Set the background if none is established yet.
    ///
    /// Returns `false` (and changes nothing) once a background exists.
    pub fn establish_background(&mut self, category: BackgroundCategory) -> bool {
        if self.background.is_some() {
            return false;
        }
        self.background = Some(category);
        self.traits
            .extend(category.trait_tags().iter().map(|t| t.to_string()));
        self.specializations
            .extend(category.specializations().iter().map(|s| s.to_string()));
        true
    }

    pub fn add_trait(&mut self, tag: impl Into<String>) -> bool {
        self.traits.insert(tag.into())
    }

    /// Adjust reputation in a known region. Unknown targets are ignored.
    pub fn adjust_reputation(&mut self, target: &str, delta: i32) -> bool {
        let Ok(region) = target.parse::<Region>() else {
            return false;
        };
        match self.reputation.get_mut(&region) {
            Some(value) => {
                *value += delta;
                true
            }
            None => false,
        }
    }

    /// Adjust the relationship with a known faction. Unknown targets are ignored.
    pub fn adjust_relationship(&mut self, target: &str, delta: i32) -> bool {
        let Ok(faction) = target.parse::<Faction>() else {
            return false;
        };
        match self.relationships.get_mut(&faction) {
            Some(value) => {
                *value += delta;
                true
            }
            None => false,
        }
    }

    /// Adjust a tracked stat. Unknown stats are ignored.
    pub fn adjust_stat(&mut self, target: &str, delta: i32) -> bool {
        let Ok(stat) = target.parse::<StatKind>() else {
            return false;
        };
        match self.stats.get_mut(&stat) {
            Some(value) => {
                *value += delta;
                true
            }
            None => false,
        }
    }

    pub fn stat(&self, stat: StatKind) -> i32 {
        self.stats.get(&stat).copied().unwrap_or(0)
    }

    pub fn reputation_in(&self, region: Region) -> i32 {
        self.reputation.get(&region).copied().unwrap_or(0)
    }

    pub fn relationship_with(&self, faction: Faction) -> i32 {
        self.relationships.get(&faction).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> ProtagonistSummary {
        ProtagonistSummary {
            id: self.id,
            name: self.name.clone(),
            background: self.background,
            social_class: self.social_class,
            region: self.region,
            traits: self.traits.iter().cloned().collect(),
            total_reputation: self.reputation.values().sum(),
            total_relationships: self.relationships.values().sum(),
            chapter: self.chapter,
        }
    }
}

/// Compact view used by status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtagonistSummary {
    pub id: ProtagonistId,
    pub name: String,
    pub background: Option<BackgroundCategory>,
    pub social_class: SocialClass,
    pub region: Region,
    pub traits: Vec<String>,
    pub total_reputation: i32,
    pub total_relationships: i32,
    pub chapter: u32,
}
