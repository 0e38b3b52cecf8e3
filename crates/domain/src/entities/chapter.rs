//! Chapter-scoped progress, the immutable record written at completion, and
//! the lookup that decides how the next chapter opens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    BackgroundCategory, BackgroundScore, ChoiceRecord, Colleague, ContactRecord, DiscoveryState,
    DiscoveryTier, Faction, KnowledgeFlag, Protagonist, Stage,
};

/// Mutable state of the chapter a protagonist is currently playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterProgress {
    pub chapter: u32,
    pub current_stage: Stage,
    pub background_score: BackgroundScore,
    pub discovery: Option<DiscoveryState>,
    pub contact: Option<ContactRecord>,
    pub choices: Vec<ChoiceRecord>,
    /// Incremented once per processed choice.
    pub time_elapsed: u32,
    pub colleague_relationships: BTreeMap<String, i32>,
    /// Faction relationships when the chapter started, for computing deltas.
    pub relationship_baseline: BTreeMap<Faction, i32>,
    pub started_at: DateTime<Utc>,
}

impl ChapterProgress {
    pub fn start(protagonist: &Protagonist, now: DateTime<Utc>) -> Self {
        Self {
            chapter: protagonist.chapter,
            current_stage: Stage::default(),
            background_score: BackgroundScore::default(),
            discovery: None,
            contact: None,
            choices: Vec::new(),
            time_elapsed: 0,
            colleague_relationships: Colleague::all()
                .iter()
                .map(|c| (c.name.to_string(), 0))
                .collect(),
            relationship_baseline: protagonist.relationships.clone(),
            started_at: now,
        }
    }

    /// Adjust standing with a colleague met this chapter. Unknown names are ignored.
    pub fn adjust_colleague(&mut self, name: &str, delta: i32) -> bool {
        match self.colleague_relationships.get_mut(name.trim()) {
            Some(value) => {
                *value += delta;
                true
            }
            None => false,
        }
    }

    pub fn discovery_tier(&self) -> Option<DiscoveryTier> {
        self.discovery.as_ref().map(|d| d.tier)
    }
}

/// Opening scenario for the following chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSetup {
    pub title: String,
    pub description: String,
    pub starting_location: String,
    pub available_options: Vec<String>,
}

impl ChapterSetup {
    fn from_row(row: &SetupRow) -> Self {
        Self {
            title: row.title.to_string(),
            description: row.description.to_string(),
            starting_location: row.starting_location.to_string(),
            available_options: row.options.iter().map(|o| o.to_string()).collect(),
        }
    }

    /// Look up the scenario for how the chapter went, falling back to the
    /// baseline "Careful Alliance" when the combination is not mapped.
    pub fn select(
        background: Option<BackgroundCategory>,
        tier: Option<DiscoveryTier>,
        contact_made: bool,
    ) -> Self {
        let row = SETUPS
            .iter()
            .find(|row| {
                Some(row.background) == background && Some(row.tier) == tier && row.contact_made == contact_made
            })
            .unwrap_or(&SETUPS[0]);
        Self::from_row(row)
    }
}

struct SetupRow {
    background: BackgroundCategory,
    tier: DiscoveryTier,
    contact_made: bool,
    title: &'static str,
    description: &'static str,
    starting_location: &'static str,
    options: [&'static str; 3],
}

const SETUPS: &[SetupRow] = &[
    SetupRow {
        background: BackgroundCategory::Methodical,
        tier: DiscoveryTier::Medium,
        contact_made: true,
        title: "The Careful Alliance",
        description: "Working with underground contacts while maintaining professional cover",
        starting_location: "ACN workplace with underground communication",
        options: ["continue_surveillance", "expand_network", "protect_colleagues"],
    },
    SetupRow {
        background: BackgroundCategory::Confident,
        tier: DiscoveryTier::Deep,
        contact_made: true,
        title: "The Bold Resistance",
        description: "Active resistance operations with full underground integration",
        starting_location: "Underground safe house",
        options: ["sabotage_operations", "recruit_colleagues", "expose_eai"],
    },
    SetupRow {
        background: BackgroundCategory::Strategic,
        tier: DiscoveryTier::Surface,
        contact_made: true,
        title: "The Strategic Approach",
        description: "Playing multiple sides while gathering intelligence",
        starting_location: "Public location with multiple contacts",
        options: ["information_brokering", "advancement_opportunities", "risk_management"],
    },
];

/// Immutable snapshot written once when a chapter completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub chapter: u32,
    pub background: Option<BackgroundCategory>,
    pub traits: Vec<String>,
    /// Non-zero changes keyed by faction or colleague name.
    pub relationship_deltas: BTreeMap<String, i32>,
    pub discovery_tier: Option<DiscoveryTier>,
    pub knowledge_flags: BTreeMap<KnowledgeFlag, bool>,
    pub choices: Vec<ChoiceRecord>,
    pub contact: Option<ContactRecord>,
    pub completed_at: DateTime<Utc>,
    pub next_chapter: ChapterSetup,
}

impl ChapterRecord {
    pub fn compile(protagonist: &Protagonist, progress: &ChapterProgress, now: DateTime<Utc>) -> Self {
        let mut relationship_deltas = BTreeMap::new();
        for (faction, value) in &protagonist.relationships {
            let baseline = progress.relationship_baseline.get(faction).copied().unwrap_or(0);
            if *value != baseline {
                relationship_deltas.insert(faction.display_name().to_string(), value - baseline);
            }
        }
        for (name, value) in &progress.colleague_relationships {
            if *value != 0 {
                relationship_deltas.insert(name.clone(), *value);
            }
        }

        let tier = progress.discovery_tier();
        Self {
            chapter: progress.chapter,
            background: protagonist.background,
            traits: protagonist.traits.iter().cloned().collect(),
            relationship_deltas,
            discovery_tier: tier,
            knowledge_flags: progress
                .discovery
                .as_ref()
                .map(|d| d.knowledge_flags.clone())
                .unwrap_or_default(),
            choices: progress.choices.clone(),
            contact: progress.contact.clone(),
            completed_at: now,
            next_chapter: ChapterSetup::select(
                protagonist.background,
                tier,
                progress.contact.is_some(),
            ),
        }
    }

    pub fn contact_made(&self) -> bool {
        self.contact.is_some()
    }
}

/// Player-facing recap of a completed chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub background_established: Option<BackgroundCategory>,
    pub traits_acquired: usize,
    pub relationships_formed: usize,
    pub discovery_depth: Option<DiscoveryTier>,
    pub knowledge_gained: usize,
    pub choices_made: usize,
    pub contact_made: bool,
    pub total_playtime_minutes: i64,
    pub key_moments: Vec<String>,
}

impl ChapterSummary {
    pub fn from_record(record: &ChapterRecord) -> Self {
        let mut key_moments = Vec::new();
        if let Some(background) = record.background {
            key_moments.push(format!("Established as {} specialist", background.display_name()));
        }
        if let Some(tier) = record.discovery_tier {
            key_moments.push(tier.key_moment().to_string());
        }
        if record.contact_made() {
            key_moments.push("Made contact with underground network".to_string());
        }

        Self {
            background_established: record.background,
            traits_acquired: record.traits.len(),
            relationships_formed: record.relationship_deltas.len(),
            discovery_depth: record.discovery_tier,
            knowledge_gained: record.knowledge_flags.values().filter(|v| **v).count(),
            choices_made: record.choices.len(),
            contact_made: record.contact_made(),
            total_playtime_minutes: playtime_minutes(&record.choices),
            key_moments,
        }
    }
}

/// Minutes between the first and last choice, rounded.
fn playtime_minutes(choices: &[ChoiceRecord]) -> i64 {
    match (choices.first(), choices.last()) {
        (Some(first), Some(last)) if choices.len() >= 2 => {
            let secs = (last.made_at - first.made_at).num_seconds();
            (secs as f64 / 60.0).round() as i64
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContactMethod, Protagonist};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 6, 30, 0).unwrap()
    }

    fn choice(at: DateTime<Utc>) -> ChoiceRecord {
        ChoiceRecord {
            stage: Stage::MorningArrival,
            choice_type: "work_priority".to_string(),
            choice_value: "review_notes_methodically".to_string(),
            made_at: at,
        }
    }

    #[test]
    fn setup_lookup_matches_exact_keys() {
        let setup = ChapterSetup::select(
            Some(BackgroundCategory::Confident),
            Some(DiscoveryTier::Deep),
            true,
        );
        assert_eq!(setup.title, "The Bold Resistance");
        assert_eq!(setup.available_options.len(), 3);
    }

    #[test]
    fn unmapped_setup_defaults_to_baseline() {
        let setup = ChapterSetup::select(Some(BackgroundCategory::Confident), Some(DiscoveryTier::Deep), false);
        assert_eq!(setup.title, "The Careful Alliance");
        let setup = ChapterSetup::select(None, None, false);
        assert_eq!(setup.title, "The Careful Alliance");
    }

    #[test]
    fn progress_starts_with_colleagues_at_zero() {
        let p = Protagonist::new("Aria", now());
        let mut progress = ChapterProgress::start(&p, now());
        assert_eq!(progress.current_stage, Stage::MorningArrival);
        assert_eq!(progress.colleague_relationships.len(), 4);
        assert!(progress.adjust_colleague("Supervisor Thane", 1));
        assert!(!progress.adjust_colleague("Echo Traders", 1));
    }

    #[test]
    fn record_captures_relationship_deltas() {
        let mut p = Protagonist::new("Aria", now());
        p.adjust_relationship("Echo Traders", 1);
        let mut progress = ChapterProgress::start(&p, now());
        p.adjust_relationship("Echo Traders", 2);
        progress.adjust_colleague("Mira Chen", 1);

        let record = ChapterRecord::compile(&p, &progress, now());
        assert_eq!(record.relationship_deltas.get("Echo Traders"), Some(&2));
        assert_eq!(record.relationship_deltas.get("Mira Chen"), Some(&1));
        assert_eq!(record.relationship_deltas.len(), 2);
    }

    #[test]
    fn summary_counts_and_key_moments() {
        let mut p = Protagonist::new("Aria", now());
        p.establish_background(BackgroundCategory::Methodical);
        let mut progress = ChapterProgress::start(&p, now());
        progress.discovery = Some(DiscoveryState::reached(DiscoveryTier::Medium));
        progress.contact = Some(ContactRecord::new(
            ContactMethod::EveningHome,
            BackgroundCategory::Methodical,
            DiscoveryTier::Medium,
            now(),
        ));
        progress.choices = vec![choice(now()), choice(now() + Duration::seconds(150))];

        let record = ChapterRecord::compile(&p, &progress, now());
        assert_eq!(record.next_chapter.title, "The Careful Alliance");

        let summary = ChapterSummary::from_record(&record);
        assert_eq!(summary.traits_acquired, 6);
        assert_eq!(summary.knowledge_gained, 4);
        assert_eq!(summary.choices_made, 2);
        assert_eq!(summary.total_playtime_minutes, 3);
        assert_eq!(
            summary.key_moments,
            vec![
                "Established as Methodical specialist".to_string(),
                "Uncovered colleague targeting".to_string(),
                "Made contact with underground network".to_string(),
            ]
        );
    }

    #[test]
    fn single_choice_has_no_playtime() {
        assert_eq!(playtime_minutes(&[choice(now())]), 0);
    }
}
