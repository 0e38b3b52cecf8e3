//! Background categories and the choice-pattern weighting table.
//!
//! A protagonist starts with an undetermined background. Every recognised
//! choice adds integer weights to a running [`BackgroundScore`]; once one
//! category is strictly ahead of the others and has reached the decisiveness
//! threshold, the background is established and never changes again through
//! scoring.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Default score a category needs before a background is established.
pub const DEFAULT_BACKGROUND_THRESHOLD: u32 = 3;

/// Personality archetype inferred from accumulated choices.
///
/// Declaration order is the tie-break order used by [`BackgroundScore::dominant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundCategory {
    Methodical,
    Confident,
    Strategic,
}

impl BackgroundCategory {
    pub fn all() -> &'static [BackgroundCategory] {
        &[
            BackgroundCategory::Methodical,
            BackgroundCategory::Confident,
            BackgroundCategory::Strategic,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundCategory::Methodical => "methodical",
            BackgroundCategory::Confident => "confident",
            BackgroundCategory::Strategic => "strategic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BackgroundCategory::Methodical => "Methodical",
            BackgroundCategory::Confident => "Confident",
            BackgroundCategory::Strategic => "Strategic",
        }
    }

    /// Trait tags granted when this background is established.
    pub fn trait_tags(&self) -> &'static [&'static str] {
        match self {
            BackgroundCategory::Methodical => &[
                "systematic_approach",
                "documentation_focused",
                "family_pressure",
                "precision_oriented",
                "careful_planning",
                "earned_advancement",
            ],
            BackgroundCategory::Confident => &[
                "family_tradition",
                "institutional_knowledge",
                "moral_clarity",
                "direct_communication",
                "leadership_natural",
                "legacy_awareness",
            ],
            BackgroundCategory::Strategic => &[
                "efficiency_focused",
                "opportunity_seeking",
                "advancement_driven",
                "business_minded",
                "resource_optimization",
                "market_thinking",
            ],
        }
    }

    /// Specializations granted when this background is established.
    pub fn specializations(&self) -> &'static [&'static str] {
        match self {
            BackgroundCategory::Methodical => &[
                "Network Security",
                "Documentation Systems",
                "Protocol Analysis",
            ],
            BackgroundCategory::Confident => &[
                "Infrastructure Management",
                "Team Leadership",
                "System Architecture",
            ],
            BackgroundCategory::Strategic => &[
                "Data Analysis",
                "Efficiency Optimization",
                "Resource Management",
            ],
        }
    }
}

impl fmt::Display for BackgroundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackgroundCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "methodical" => Ok(BackgroundCategory::Methodical),
            "confident" => Ok(BackgroundCategory::Confident),
            "strategic" => Ok(BackgroundCategory::Strategic),
            _ => Err(DomainError::unknown_background_template(s)),
        }
    }
}

/// Weights contributed by one (choice type, choice value) pair.
pub type PatternWeights = &'static [(BackgroundCategory, u32)];

use BackgroundCategory::{Confident, Methodical, Strategic};

const CHOICE_PATTERNS: &[(&str, &str, PatternWeights)] = &[
    ("work_priority", "check_logs_immediately", &[(Strategic, 2), (Confident, 1)]),
    ("work_priority", "review_notes_methodically", &[(Methodical, 3), (Strategic, 1)]),
    ("work_priority", "assess_team_status", &[(Confident, 2), (Methodical, 1)]),
    ("workspace_setup", "efficiency_shortcuts", &[(Strategic, 2), (Methodical, 1)]),
    ("workspace_setup", "methodical_arrangement", &[(Methodical, 3), (Confident, 1)]),
    ("workspace_setup", "inherited_optimizations", &[(Confident, 3), (Strategic, 1)]),
    ("colleague_interaction", "direct_information_sharing", &[(Confident, 2), (Strategic, 1)]),
    ("colleague_interaction", "cautious_professionalism", &[(Methodical, 2), (Confident, 1)]),
    ("colleague_interaction", "curious_questioning", &[(Strategic, 2), (Methodical, 1)]),
    ("technical_approach", "security_protocols_focus", &[(Methodical, 2), (Confident, 1)]),
    ("technical_approach", "efficiency_patterns_focus", &[(Strategic, 3), (Methodical, 1)]),
    ("technical_approach", "infrastructure_knowledge", &[(Confident, 3), (Strategic, 1)]),
    ("investigation_start", "recent_anomalies_first", &[(Confident, 2), (Strategic, 1)]),
    ("investigation_start", "establish_baseline_first", &[(Methodical, 3), (Confident, 1)]),
    ("investigation_start", "volume_spikes_focus", &[(Strategic, 2), (Methodical, 1)]),
    ("discovery_approach", "dig_deeper_boldly", &[(Confident, 3), (Strategic, 1)]),
    ("discovery_approach", "document_carefully", &[(Methodical, 3), (Strategic, 1)]),
    ("discovery_approach", "retreat_immediately", &[(Methodical, 1), (Strategic, 2)]),
    ("contact_response", "immediate_engagement", &[(Confident, 3), (Strategic, 2)]),
    ("contact_response", "cautious_information_gathering", &[(Methodical, 3), (Confident, 1)]),
    ("contact_response", "strategic_evaluation", &[(Strategic, 3), (Methodical, 1)]),
    ("contact_response", "seek_alternative_counsel", &[(Methodical, 2), (Confident, 2)]),
];

/// Look up the static weights for a choice.
pub fn choice_pattern(choice_type: &str, choice_value: &str) -> Result<PatternWeights, DomainError> {
    CHOICE_PATTERNS
        .iter()
        .find(|(t, v, _)| *t == choice_type && *v == choice_value)
        .map(|(_, _, weights)| *weights)
        .ok_or_else(|| DomainError::unknown_choice_pattern(choice_type, choice_value))
}

/// Running per-category totals. The category set is fixed; scores only grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundScore {
    pub methodical: u32,
    pub confident: u32,
    pub strategic: u32,
}

impl BackgroundScore {
    pub fn get(&self, category: BackgroundCategory) -> u32 {
        match category {
            Methodical => self.methodical,
            Confident => self.confident,
            Strategic => self.strategic,
        }
    }

    pub fn add(&mut self, category: BackgroundCategory, weight: u32) {
        let slot = match category {
            Methodical => &mut self.methodical,
            Confident => &mut self.confident,
            Strategic => &mut self.strategic,
        };
        *slot = slot.saturating_add(weight);
    }

    pub fn add_weights(&mut self, weights: PatternWeights) {
        for (category, weight) in weights {
            self.add(*category, *weight);
        }
    }

    /// Argmax over the categories, ties going to the first declared one.
    pub fn dominant(&self) -> (BackgroundCategory, u32) {
        let mut best = (Methodical, self.methodical);
        for category in &BackgroundCategory::all()[1..] {
            let score = self.get(*category);
            if score > best.1 {
                best = (*category, score);
            }
        }
        best
    }

    /// The category that should be established, if any.
    ///
    /// Requires a strict maximum (no tie for first place) at or above `threshold`.
    pub fn decisive(&self, threshold: u32) -> Option<BackgroundCategory> {
        let (leader, score) = self.dominant();
        if score < threshold {
            return None;
        }
        let tied = BackgroundCategory::all()
            .iter()
            .filter(|c| **c != leader)
            .any(|c| self.get(*c) == score);
        (!tied).then_some(leader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_lookup_returns_weights() {
        let weights = choice_pattern("work_priority", "review_notes_methodically").unwrap();
        assert_eq!(weights, &[(Methodical, 3), (Strategic, 1)]);
    }

    #[test]
    fn unknown_pattern_is_an_error() {
        let err = choice_pattern("work_priority", "nap").unwrap_err();
        assert!(matches!(err, DomainError::UnknownChoicePattern { .. }));
    }

    #[test]
    fn three_methodical_reviews_are_decisive() {
        let mut score = BackgroundScore::default();
        let weights = choice_pattern("work_priority", "review_notes_methodically").unwrap();
        for _ in 0..3 {
            score.add_weights(weights);
        }
        assert_eq!(score.methodical, 9);
        assert_eq!(score.strategic, 3);
        assert_eq!(score.decisive(DEFAULT_BACKGROUND_THRESHOLD), Some(Methodical));
    }

    #[test]
    fn dominant_breaks_ties_by_declaration_order() {
        let score = BackgroundScore {
            methodical: 0,
            confident: 4,
            strategic: 4,
        };
        assert_eq!(score.dominant(), (Confident, 4));
    }

    #[test]
    fn tie_for_first_is_not_decisive() {
        let score = BackgroundScore {
            methodical: 4,
            confident: 4,
            strategic: 0,
        };
        assert_eq!(score.decisive(3), None);
    }

    #[test]
    fn below_threshold_is_not_decisive() {
        let mut score = BackgroundScore::default();
        score.add(Strategic, 2);
        assert_eq!(score.decisive(3), None);
        assert_eq!(score.decisive(2), Some(Strategic));
    }

    #[test]
    fn every_category_has_six_traits_and_three_specializations() {
        for category in BackgroundCategory::all() {
            assert_eq!(category.trait_tags().len(), 6);
            assert_eq!(category.specializations().len(), 3);
        }
    }

    #[test]
    fn unknown_category_name_fails() {
        assert_eq!("Strategic".parse::<BackgroundCategory>(), Ok(Strategic));
        assert!("reckless".parse::<BackgroundCategory>().is_err());
    }
}
