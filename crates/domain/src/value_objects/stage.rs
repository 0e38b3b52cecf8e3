//! The fixed chain of narrative stages in a chapter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    MorningArrival,
    WorkplaceDynamics,
    TechnicalInvestigation,
    ProcessingParanoia,
    BlackmailerContact,
    ChapterConclusion,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[
            Stage::MorningArrival,
            Stage::WorkplaceDynamics,
            Stage::TechnicalInvestigation,
            Stage::ProcessingParanoia,
            Stage::BlackmailerContact,
            Stage::ChapterConclusion,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::MorningArrival => "morning_arrival",
            Stage::WorkplaceDynamics => "workplace_dynamics",
            Stage::TechnicalInvestigation => "technical_investigation",
            Stage::ProcessingParanoia => "processing_paranoia",
            Stage::BlackmailerContact => "blackmailer_contact",
            Stage::ChapterConclusion => "chapter_conclusion",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::MorningArrival => "Routine Morning",
            Stage::WorkplaceDynamics => "Workplace Interaction",
            Stage::TechnicalInvestigation => "The Discovery",
            Stage::ProcessingParanoia => "Processing and Paranoia",
            Stage::BlackmailerContact => "The Contact",
            Stage::ChapterConclusion => "First Choice Consequences",
        }
    }

    /// Nominal length of the stage in minutes of play.
    pub fn duration(&self) -> u32 {
        match self {
            Stage::MorningArrival => 4,
            Stage::WorkplaceDynamics => 5,
            Stage::TechnicalInvestigation => 6,
            Stage::ProcessingParanoia => 4,
            Stage::BlackmailerContact => 5,
            Stage::ChapterConclusion => 3,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Stage::MorningArrival => {
                "ACN Central Hub, Network Maintenance Division, Floor 47. Early morning shift, 6:30 AM."
            }
            Stage::WorkplaceDynamics => "Initial colleague interactions and work assignment.",
            Stage::TechnicalInvestigation => {
                "Administrative Priority analysis leads to unauthorized access."
            }
            Stage::ProcessingParanoia => {
                "Character processes discovery and growing workplace paranoia."
            }
            Stage::BlackmailerContact => "Evening contact through underground network.",
            Stage::ChapterConclusion => "Immediate results and Chapter 2 setup.",
        }
    }

    pub fn objectives(&self) -> &'static [&'static str] {
        match self {
            Stage::MorningArrival => &[
                "Establish work routine",
                "Meet colleagues",
                "Begin background discovery",
            ],
            Stage::WorkplaceDynamics => &[
                "Build relationships",
                "Receive Terminal 7 assignment",
                "Continue background discovery",
            ],
            Stage::TechnicalInvestigation => &[
                "Investigate anomalies",
                "Discover EAI surveillance",
                "Process implications",
            ],
            Stage::ProcessingParanoia => &[
                "Internal conflict",
                "Observation of surveillance",
                "Prepare for contact",
            ],
            Stage::BlackmailerContact => &[
                "Mysterious contact",
                "Proof of knowledge",
                "Critical choice",
            ],
            Stage::ChapterConclusion => &[
                "Process choice",
                "Set Chapter 2 state",
                "Save progress",
            ],
        }
    }

    /// The single stage that follows this one. `None` for the conclusion.
    pub fn successor(&self) -> Option<Stage> {
        match self {
            Stage::MorningArrival => Some(Stage::WorkplaceDynamics),
            Stage::WorkplaceDynamics => Some(Stage::TechnicalInvestigation),
            Stage::TechnicalInvestigation => Some(Stage::ProcessingParanoia),
            Stage::ProcessingParanoia => Some(Stage::BlackmailerContact),
            Stage::BlackmailerContact => Some(Stage::ChapterConclusion),
            Stage::ChapterConclusion => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.successor().is_none()
    }

    /// Check that `next` is this stage's successor.
    pub fn transition_to(&self, next: Stage) -> Result<Stage, DomainError> {
        match self.successor() {
            Some(successor) if successor == next => Ok(next),
            _ => Err(DomainError::invalid_stage_transition(
                self.as_str(),
                next.as_str(),
            )),
        }
    }

    pub fn info(&self) -> StageInfo {
        StageInfo {
            stage: *self,
            title: self.title().to_string(),
            duration: self.duration(),
            description: self.description().to_string(),
            objectives: self.objectives().iter().map(|o| o.to_string()).collect(),
            next: self.successor(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Stage::all()
            .iter()
            .copied()
            .find(|stage| stage.as_str() == wanted)
            .ok_or_else(|| DomainError::parse(format!("Unknown stage: {}", s)))
    }
}

/// Presentation-ready view of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInfo {
    pub stage: Stage,
    pub title: String,
    pub duration: u32,
    pub description: String,
    pub objectives: Vec<String>,
    pub next: Option<Stage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_linear_and_ends_at_conclusion() {
        let mut stage = Stage::default();
        let mut visited = vec![stage];
        while let Some(next) = stage.successor() {
            stage = next;
            visited.push(stage);
        }
        assert_eq!(visited, Stage::all());
        assert!(Stage::ChapterConclusion.is_terminal());
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        let err = Stage::MorningArrival
            .transition_to(Stage::ChapterConclusion)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStageTransition { .. }));
        assert_eq!(
            Stage::MorningArrival.transition_to(Stage::WorkplaceDynamics),
            Ok(Stage::WorkplaceDynamics)
        );
    }

    #[test]
    fn stage_parses_from_snake_case() {
        assert_eq!("blackmailer_contact".parse::<Stage>(), Ok(Stage::BlackmailerContact));
        assert!("chapter_2".parse::<Stage>().is_err());
    }

    #[test]
    fn every_stage_has_three_objectives() {
        for stage in Stage::all() {
            assert_eq!(stage.objectives().len(), 3, "{}", stage);
        }
    }
}
