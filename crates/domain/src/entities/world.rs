//! World state - regional and faction standing shared by every protagonist

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{BackgroundCategory, DiscoveryTier, Faction, Region};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionState {
    pub stability: i32,
    /// Surveillance pressure in the region.
    pub eai_presence: i32,
    pub controlling_power: String,
}

impl Default for RegionState {
    fn default() -> Self {
        Self {
            stability: 50,
            eai_presence: 30,
            controlling_power: "government".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionState {
    pub influence: i32,
    pub activity: String,
    pub disposition: String,
    /// Standing the player has earned with the faction across chapters.
    #[serde(default)]
    pub player_standing: i32,
}

impl Default for FactionState {
    fn default() -> Self {
        Self {
            influence: 20,
            activity: "normal".to_string(),
            disposition: "neutral".to_string(),
            player_standing: 0,
        }
    }
}

/// Entry in the append-only world history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub region: Region,
    pub discovery_tier: Option<DiscoveryTier>,
    pub background: Option<BackgroundCategory>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    pub regions: BTreeMap<Region, RegionState>,
    pub factions: BTreeMap<Faction, FactionState>,
    pub surveillance_influence: i32,
    pub global_events: Vec<GlobalEvent>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            regions: Region::all()
                .iter()
                .map(|r| (*r, RegionState::default()))
                .collect(),
            factions: Faction::all()
                .iter()
                .map(|f| (*f, FactionState::default()))
                .collect(),
            surveillance_influence: 0,
            global_events: Vec::new(),
        }
    }
}

impl WorldState {
    pub fn add_surveillance(&mut self, delta: i32) -> i32 {
        self.surveillance_influence += delta;
        self.surveillance_influence
    }

    /// Returns `false` if the faction is not tracked.
    pub fn adjust_player_standing(&mut self, faction: Faction, delta: i32) -> bool {
        match self.factions.get_mut(&faction) {
            Some(state) => {
                state.player_standing += delta;
                true
            }
            None => false,
        }
    }

    pub fn record_event(&mut self, event: GlobalEvent) {
        self.global_events.push(event);
    }
}

/// The faction that reaches out to a protagonist of the given background.
pub fn affiliated_faction(background: BackgroundCategory) -> Faction {
    match background {
        BackgroundCategory::Methodical => Faction::EchoTraders,
        BackgroundCategory::Confident => Faction::NullboundCoalition,
        BackgroundCategory::Strategic => Faction::ShadowSyndicate,
    }
}
