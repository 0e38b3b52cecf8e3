//! Discovery tiers and their fixed policies.
//!
//! The player names the tier directly; nothing escalates automatically.
//! Every tier-dependent number lives here so severity can be checked for
//! monotonicity in one place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Surveillance added to the world when a tier raises a security alert.
pub const SECURITY_ALERT_SURVEILLANCE: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryTier {
    Surface,
    Medium,
    Deep,
}

impl DiscoveryTier {
    pub fn all() -> &'static [DiscoveryTier] {
        &[DiscoveryTier::Surface, DiscoveryTier::Medium, DiscoveryTier::Deep]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryTier::Surface => "surface",
            DiscoveryTier::Medium => "medium",
            DiscoveryTier::Deep => "deep",
        }
    }

    pub fn policy(&self) -> TierPolicy {
        match self {
            DiscoveryTier::Surface => TierPolicy {
                risk: RiskLevel::Low,
                investigation_window_hours: 72,
                security_alert_raised: false,
                investigation_triggered: false,
                evidence_left: false,
                underground_knowledge: false,
            },
            DiscoveryTier::Medium => TierPolicy {
                risk: RiskLevel::Moderate,
                investigation_window_hours: 72,
                security_alert_raised: true,
                investigation_triggered: false,
                evidence_left: true,
                underground_knowledge: false,
            },
            DiscoveryTier::Deep => TierPolicy {
                risk: RiskLevel::High,
                investigation_window_hours: 48,
                security_alert_raised: true,
                investigation_triggered: true,
                evidence_left: true,
                underground_knowledge: true,
            },
        }
    }

    /// Knowledge stat granted on resolution.
    pub fn knowledge_gain(&self) -> i32 {
        match self {
            DiscoveryTier::Surface => 1,
            DiscoveryTier::Medium => 3,
            DiscoveryTier::Deep => 5,
        }
    }

    /// Surveillance folded into the world when the chapter is finalized.
    pub fn chapter_surveillance_delta(&self) -> i32 {
        match self {
            DiscoveryTier::Surface => 2,
            DiscoveryTier::Medium => 5,
            DiscoveryTier::Deep => 8,
        }
    }

    /// Flags learned at this tier, including everything below it.
    pub fn knowledge_flags(&self) -> Vec<KnowledgeFlag> {
        KnowledgeFlag::all()
            .iter()
            .copied()
            .filter(|flag| flag.unlocked_at() <= *self)
            .collect()
    }

    /// The `discovery_approach` choice value whose weights this tier carries.
    pub fn approach(&self) -> &'static str {
        match self {
            DiscoveryTier::Surface => "retreat_immediately",
            DiscoveryTier::Medium => "document_carefully",
            DiscoveryTier::Deep => "dig_deeper_boldly",
        }
    }

    pub fn key_moment(&self) -> &'static str {
        match self {
            DiscoveryTier::Surface => "Discovered surveillance exists",
            DiscoveryTier::Medium => "Uncovered colleague targeting",
            DiscoveryTier::Deep => "Revealed full EAI scope",
        }
    }
}

impl fmt::Display for DiscoveryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscoveryTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surface" => Ok(DiscoveryTier::Surface),
            "medium" => Ok(DiscoveryTier::Medium),
            "deep" => Ok(DiscoveryTier::Deep),
            _ => Err(DomainError::invalid_discovery_level(s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

/// Fixed consequences of reaching a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPolicy {
    pub risk: RiskLevel,
    pub investigation_window_hours: u32,
    pub security_alert_raised: bool,
    pub investigation_triggered: bool,
    pub evidence_left: bool,
    pub underground_knowledge: bool,
}

impl TierPolicy {
    /// World surveillance added immediately on resolution.
    pub fn surveillance_delta(&self) -> i32 {
        if self.security_alert_raised {
            SECURITY_ALERT_SURVEILLANCE
        } else {
            0
        }
    }
}

/// What the protagonist has learned about the surveillance program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeFlag {
    SurveillanceExists,
    PersonalMonitoring,
    ColleagueTargeting,
    CrossCompanyCoordination,
    EaiScopeAllRegions,
    Phase4Protocols,
    ResistanceMonitoring,
}

impl KnowledgeFlag {
    pub fn all() -> &'static [KnowledgeFlag] {
        &[
            KnowledgeFlag::SurveillanceExists,
            KnowledgeFlag::PersonalMonitoring,
            KnowledgeFlag::ColleagueTargeting,
            KnowledgeFlag::CrossCompanyCoordination,
            KnowledgeFlag::EaiScopeAllRegions,
            KnowledgeFlag::Phase4Protocols,
            KnowledgeFlag::ResistanceMonitoring,
        ]
    }

    /// Lowest tier at which this flag is learned.
    pub fn unlocked_at(&self) -> DiscoveryTier {
        match self {
            KnowledgeFlag::SurveillanceExists | KnowledgeFlag::PersonalMonitoring => {
                DiscoveryTier::Surface
            }
            KnowledgeFlag::ColleagueTargeting | KnowledgeFlag::CrossCompanyCoordination => {
                DiscoveryTier::Medium
            }
            KnowledgeFlag::EaiScopeAllRegions
            | KnowledgeFlag::Phase4Protocols
            | KnowledgeFlag::ResistanceMonitoring => DiscoveryTier::Deep,
        }
    }
}

/// Snapshot of the discovery made this chapter. Set once, never re-entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryState {
    pub tier: DiscoveryTier,
    pub knowledge_flags: BTreeMap<KnowledgeFlag, bool>,
}

impl DiscoveryState {
    pub fn reached(tier: DiscoveryTier) -> Self {
        let learned = tier.knowledge_flags();
        let knowledge_flags = KnowledgeFlag::all()
            .iter()
            .map(|flag| (*flag, learned.contains(flag)))
            .collect();
        Self {
            tier,
            knowledge_flags,
        }
    }

    pub fn knows(&self, flag: KnowledgeFlag) -> bool {
        self.knowledge_flags.get(&flag).copied().unwrap_or(false)
    }

    pub fn known_count(&self) -> usize {
        self.knowledge_flags.values().filter(|v| **v).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_tiers_are_supersets() {
        let surface = DiscoveryTier::Surface.knowledge_flags();
        let medium = DiscoveryTier::Medium.knowledge_flags();
        let deep = DiscoveryTier::Deep.knowledge_flags();
        assert_eq!(surface.len(), 2);
        assert_eq!(medium.len(), 4);
        assert_eq!(deep.len(), 7);
        assert!(surface.iter().all(|f| medium.contains(f)));
        assert!(medium.iter().all(|f| deep.contains(f)));
    }

    #[test]
    fn severity_is_monotonic() {
        let tiers = DiscoveryTier::all();
        for pair in tiers.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            assert!(lo.knowledge_gain() <= hi.knowledge_gain());
            assert!(lo.policy().surveillance_delta() <= hi.policy().surveillance_delta());
            assert!(lo.chapter_surveillance_delta() <= hi.chapter_surveillance_delta());
            assert!(lo.policy().risk <= hi.policy().risk);
        }
    }

    #[test]
    fn only_surface_skips_security_alert() {
        assert!(!DiscoveryTier::Surface.policy().security_alert_raised);
        assert!(DiscoveryTier::Medium.policy().security_alert_raised);
        assert_eq!(DiscoveryTier::Deep.policy().surveillance_delta(), 5);
    }

    #[test]
    fn every_tier_has_a_weighted_approach() {
        for tier in DiscoveryTier::all() {
            assert!(crate::choice_pattern("discovery_approach", tier.approach()).is_ok());
        }
    }

    #[test]
    fn invalid_level_is_rejected() {
        let err = "abyssal".parse::<DiscoveryTier>().unwrap_err();
        assert_eq!(err, DomainError::invalid_discovery_level("abyssal"));
        assert_eq!("Deep".parse::<DiscoveryTier>(), Ok(DiscoveryTier::Deep));
    }

    #[test]
    fn discovery_state_marks_learned_flags() {
        let state = DiscoveryState::reached(DiscoveryTier::Medium);
        assert!(state.knows(KnowledgeFlag::ColleagueTargeting));
        assert!(!state.knows(KnowledgeFlag::Phase4Protocols));
        assert_eq!(state.known_count(), 4);
        assert_eq!(state.knowledge_flags.len(), 7);
    }
}
