//! End-to-end tests of the choice pipeline, wired the way the app wires it
//! but with a fixed clock, an in-memory save store and no generator.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Notify;

use solterra_domain::{
    BackgroundCategory, ConsequenceSource, DelayedConsequence, DiscoveryTier, Faction,
    Protagonist, ProtagonistId, QueuedConsequence, Region, Stage, StatKind,
};

use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::generator::NullGenerator;
use crate::infrastructure::ports::{
    ClockPort, GenerationRequest, GeneratorError, GeneratorUsage, NarrativeGenerator,
};
use crate::infrastructure::save_store::InMemorySaveStore;
use crate::stores::{DelayedQueue, GameStore};
use crate::use_cases::chapter::{
    ChapterError, ChapterProgression, RecordChoice, RespondToContact, ResolveDiscovery,
    SelectContact, CONTACT_REPLY_CHOICE, DISCOVERY_CHOICE, INITIAL_CONTACT_CHOICE,
};
use crate::use_cases::consequences::{ApplyConsequences, PromoteDelayed, ResolveConsequences};
use crate::use_cases::persistence::SaveGame;

const THRESHOLD: u32 = 3;

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 6, 30, 0).unwrap()
}

struct Pipeline {
    store: Arc<GameStore>,
    queue: Arc<DelayedQueue>,
    progression: Arc<ChapterProgression>,
}

impl Pipeline {
    fn new() -> Self {
        Self::with_generator(Arc::new(NullGenerator))
    }

    fn with_generator(generator: Arc<dyn NarrativeGenerator>) -> Self {
        let store = Arc::new(GameStore::new());
        let queue = Arc::new(DelayedQueue::new());
        let clock: Arc<dyn ClockPort> = Arc::new(FixedClock(start_time()));
        let resolver = Arc::new(ResolveConsequences::new(generator.clone()));
        let save = Arc::new(SaveGame::new(
            store.clone(),
            queue.clone(),
            Arc::new(InMemorySaveStore::new()),
            clock.clone(),
        ));

        let progression = Arc::new(ChapterProgression::new(
            store.clone(),
            Arc::new(RecordChoice::new(store.clone(), resolver.clone(), THRESHOLD)),
            Arc::new(ResolveDiscovery::new(store.clone(), resolver.clone(), THRESHOLD)),
            Arc::new(SelectContact::new(generator)),
            Arc::new(RespondToContact::new(store.clone(), resolver)),
            Arc::new(ApplyConsequences::new(store.clone(), queue.clone())),
            save,
            clock,
        ));
        Self {
            store,
            queue,
            progression,
        }
    }

    async fn protagonist(&self) -> ProtagonistId {
        let protagonist = Protagonist::new("Aria", start_time());
        let id = protagonist.id;
        self.store.insert_protagonist(protagonist);
        self.progression.start_chapter(id).await.unwrap();
        id
    }

    async fn walk_to(&self, id: ProtagonistId, target: Stage) {
        let status = self.progression.status(id).await.unwrap();
        let mut stage = status.stage.unwrap().stage;
        while stage != target {
            let next = stage.successor().unwrap();
            self.progression.transition_to_stage(id, next).await.unwrap();
            stage = next;
        }
    }

    fn get(&self, id: ProtagonistId) -> Protagonist {
        self.store.protagonist(id).unwrap()
    }
}

#[tokio::test]
async fn three_methodical_choices_establish_methodical() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;

    let mut established = Vec::new();
    for _ in 0..3 {
        let outcome = pipeline
            .progression
            .advance(id, Stage::MorningArrival, "work_priority", "review_notes_methodically")
            .await
            .unwrap();
        assert_eq!(outcome.source, ConsequenceSource::Fallback);
        assert!(outcome.saved);
        established.push(outcome.background_established);
    }

    assert_eq!(established, vec![true, false, false]);
    let protagonist = pipeline.get(id);
    assert_eq!(protagonist.background, Some(BackgroundCategory::Methodical));
    assert_eq!(protagonist.traits.len(), 6);
    assert_eq!(protagonist.specializations.len(), 3);

    let status = pipeline.progression.status(id).await.unwrap();
    let score = status.background_score.unwrap();
    assert_eq!((score.methodical, score.strategic), (9, 3));
    assert_eq!(status.time_elapsed, 3);
    assert_eq!(status.choices_made, 3);
}

#[tokio::test]
async fn deep_discovery_without_generator() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;
    pipeline.walk_to(id, Stage::TechnicalInvestigation).await;

    let outcome = pipeline
        .progression
        .advance(id, Stage::TechnicalInvestigation, DISCOVERY_CHOICE, "deep")
        .await
        .unwrap();

    assert_eq!(outcome.source, ConsequenceSource::Fallback);
    let protagonist = pipeline.get(id);
    assert_eq!(protagonist.reputation_in(Region::Valoria), -3);
    assert_eq!(protagonist.stat(StatKind::Knowledge), 5);
    assert_eq!(protagonist.relationship_with(Faction::EchoTraders), 1);
    assert_eq!(protagonist.background, Some(BackgroundCategory::Confident));
    assert_eq!(pipeline.store.world().await.surveillance_influence, 5);
    assert_eq!(pipeline.queue.len().await, 1);

    let status = pipeline.progression.status(id).await.unwrap();
    assert_eq!(status.discovery_tier, Some(DiscoveryTier::Deep));
}

#[tokio::test]
async fn discovery_resolves_once_per_chapter() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;
    pipeline.walk_to(id, Stage::TechnicalInvestigation).await;

    pipeline
        .progression
        .advance(id, Stage::TechnicalInvestigation, DISCOVERY_CHOICE, "surface")
        .await
        .unwrap();
    let err = pipeline
        .progression
        .advance(id, Stage::TechnicalInvestigation, DISCOVERY_CHOICE, "deep")
        .await
        .unwrap_err();

    assert_eq!(err, ChapterError::DiscoveryAlreadyResolved);
    assert_eq!(pipeline.get(id).stat(StatKind::Knowledge), 1);
}

#[tokio::test]
async fn invalid_discovery_level_changes_nothing() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;
    pipeline.walk_to(id, Stage::TechnicalInvestigation).await;
    let before = pipeline.get(id);

    let err = pipeline
        .progression
        .advance(id, Stage::TechnicalInvestigation, DISCOVERY_CHOICE, "bottomless")
        .await
        .unwrap_err();

    assert!(matches!(err, ChapterError::Domain(_)));
    assert_eq!(pipeline.get(id), before);
    let status = pipeline.progression.status(id).await.unwrap();
    assert_eq!(status.time_elapsed, 0);
    assert!(status.discovery_tier.is_none());
}

#[tokio::test]
async fn discovery_severity_grows_with_tier() {
    let mut results = Vec::new();
    for tier in ["surface", "medium", "deep"] {
        let pipeline = Pipeline::new();
        let id = pipeline.protagonist().await;
        pipeline.walk_to(id, Stage::TechnicalInvestigation).await;
        pipeline
            .progression
            .advance(id, Stage::TechnicalInvestigation, DISCOVERY_CHOICE, tier)
            .await
            .unwrap();

        let protagonist = pipeline.get(id);
        results.push((
            protagonist.reputation_in(Region::Valoria),
            protagonist.stat(StatKind::Knowledge),
            pipeline.store.world().await.surveillance_influence,
        ));
    }

    for pair in results.windows(2) {
        let (lower, higher) = (pair[0], pair[1]);
        assert!(higher.0 <= lower.0, "reputation penalty must not shrink");
        assert!(higher.1 > lower.1, "knowledge must grow");
        assert!(higher.2 >= lower.2, "surveillance must not shrink");
    }
}

#[tokio::test]
async fn fallback_consequences_are_deterministic() {
    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let pipeline = Pipeline::new();
        let id = pipeline.protagonist().await;
        let outcome = pipeline
            .progression
            .advance(id, Stage::MorningArrival, "work_priority", "check_logs_immediately")
            .await
            .unwrap();
        outcomes.push(outcome.consequences);
    }
    assert_eq!(outcomes[0], outcomes[1]);
}

#[tokio::test]
async fn scores_never_decrease() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;
    let choices = [
        ("work_priority", "assess_team_status"),
        ("workspace_setup", "efficiency_shortcuts"),
        ("colleague_interaction", "curious_questioning"),
        ("work_priority", "no_such_value"),
        ("workspace_setup", "methodical_arrangement"),
    ];

    let mut previous = pipeline.progression.status(id).await.unwrap().background_score.unwrap();
    for (choice_type, value) in choices {
        pipeline
            .progression
            .advance(id, Stage::MorningArrival, choice_type, value)
            .await
            .unwrap();
        let score = pipeline.progression.status(id).await.unwrap().background_score.unwrap();
        for category in BackgroundCategory::all() {
            assert!(score.get(*category) >= previous.get(*category));
        }
        previous = score;
    }
}

#[tokio::test]
async fn established_background_is_never_replaced() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;
    pipeline
        .progression
        .advance(id, Stage::MorningArrival, "work_priority", "review_notes_methodically")
        .await
        .unwrap();

    for _ in 0..4 {
        let outcome = pipeline
            .progression
            .advance(id, Stage::MorningArrival, "workspace_setup", "inherited_optimizations")
            .await
            .unwrap();
        assert!(!outcome.background_established);
    }

    let protagonist = pipeline.get(id);
    assert_eq!(protagonist.background, Some(BackgroundCategory::Methodical));
    assert_eq!(protagonist.traits.len(), 6);
    let score = pipeline.progression.status(id).await.unwrap().background_score.unwrap();
    assert!(score.confident > score.methodical);
}

#[tokio::test]
async fn unknown_choice_records_nothing() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;
    let before = pipeline.get(id);

    let outcome = pipeline
        .progression
        .advance(id, Stage::MorningArrival, "daydream", "stare_out_window")
        .await
        .unwrap();

    assert_eq!(outcome.source, ConsequenceSource::None);
    assert!(outcome.consequences.is_empty());
    assert_eq!(pipeline.get(id), before);
    let status = pipeline.progression.status(id).await.unwrap();
    assert_eq!(status.choices_made, 0);
    assert_eq!(status.time_elapsed, 1);
}

#[tokio::test]
async fn advance_checks_the_current_stage() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;

    let err = pipeline
        .progression
        .advance(id, Stage::WorkplaceDynamics, "work_priority", "assess_team_status")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ChapterError::StageMismatch {
            expected: Stage::MorningArrival,
            got: Stage::WorkplaceDynamics,
        }
    );

    let unknown = ProtagonistId::new();
    assert_eq!(
        pipeline
            .progression
            .advance(unknown, Stage::MorningArrival, "work_priority", "assess_team_status")
            .await
            .unwrap_err(),
        ChapterError::CharacterNotFound(unknown)
    );
}

#[tokio::test]
async fn stages_follow_the_chain() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;

    let next = pipeline.progression.available_stages(id).await.unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].stage, Stage::WorkplaceDynamics);

    let err = pipeline
        .progression
        .transition_to_stage(id, Stage::ChapterConclusion)
        .await
        .unwrap_err();
    assert!(matches!(err, ChapterError::Domain(_)));

    pipeline.walk_to(id, Stage::ChapterConclusion).await;
    assert!(pipeline.progression.available_stages(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn reply_requires_contact() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;
    pipeline.walk_to(id, Stage::BlackmailerContact).await;

    let err = pipeline
        .progression
        .advance(id, Stage::BlackmailerContact, CONTACT_REPLY_CHOICE, "negotiation")
        .await
        .unwrap_err();
    assert_eq!(err, ChapterError::NoActiveContact);
}

#[tokio::test]
async fn full_chapter_finalizes_into_the_next() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;
    pipeline.walk_to(id, Stage::TechnicalInvestigation).await;
    pipeline
        .progression
        .advance(id, Stage::TechnicalInvestigation, DISCOVERY_CHOICE, "deep")
        .await
        .unwrap();
    pipeline.walk_to(id, Stage::BlackmailerContact).await;

    let contact = pipeline
        .progression
        .advance(id, Stage::BlackmailerContact, INITIAL_CONTACT_CHOICE, "open")
        .await
        .unwrap();
    let dialogue = contact.contact.unwrap();
    assert!(dialogue.main_dialogue.starts_with("Your digital fingerprints"));
    assert_eq!(dialogue.options.len(), 3);

    let reply = pipeline
        .progression
        .advance(id, Stage::BlackmailerContact, CONTACT_REPLY_CHOICE, "challenge_response")
        .await
        .unwrap();
    assert_eq!(reply.source, ConsequenceSource::Fallback);

    let finalized = pipeline.progression.finalize_chapter(id).await.unwrap();
    let record = &finalized.record;
    assert!(record.contact_made());
    assert_eq!(record.next_chapter.title, "The Bold Resistance");

    let protagonist = pipeline.get(id);
    assert_eq!(protagonist.chapter, 2);
    assert!(protagonist.chapter_history.contains_key(&1));
    assert_eq!(protagonist.relationship_with(Faction::NullboundCoalition), 2);
    assert_eq!(protagonist.stat(StatKind::Influence), 1);

    let world = pipeline.store.world().await;
    assert_eq!(world.surveillance_influence, 5 + 8);
    assert_eq!(world.global_events.len(), 1);
    assert_eq!(
        world.factions.get(&Faction::NullboundCoalition).unwrap().player_standing,
        1
    );
    assert_eq!(pipeline.store.current_chapter().await, 2);

    let summary = pipeline.progression.chapter_summary(id).await.unwrap().unwrap();
    assert!(summary.contact_made);
    assert_eq!(summary.discovery_depth, Some(DiscoveryTier::Deep));

    assert_eq!(
        pipeline.progression.finalize_chapter(id).await.unwrap_err(),
        ChapterError::ChapterNotStarted(id)
    );
}

#[tokio::test]
async fn reset_restarts_the_current_chapter() {
    let pipeline = Pipeline::new();
    assert!(pipeline.progression.reset_chapter_state().await.unwrap().is_none());

    let id = pipeline.protagonist().await;
    pipeline.walk_to(id, Stage::ProcessingParanoia).await;
    let info = pipeline.progression.reset_chapter_state().await.unwrap().unwrap();

    assert_eq!(info.stage, Stage::MorningArrival);
    let status = pipeline.progression.status(id).await.unwrap();
    assert_eq!(status.stage.unwrap().stage, Stage::MorningArrival);
}

#[tokio::test]
async fn delayed_entries_become_due_after_their_delay() {
    let queue = Arc::new(DelayedQueue::new());
    let queued_at = start_time();
    let owner = ProtagonistId::new();
    queue
        .enqueue(QueuedConsequence::new(
            owner,
            DelayedConsequence::event("Security review", "Formal investigation", "72 hours")
                .with_delay_secs(60),
            queued_at,
        ))
        .await;
    let scheduler = PromoteDelayed::new(queue.clone(), Arc::new(FixedClock(queued_at)));

    let due_at = queued_at + Duration::seconds(60);
    assert!(scheduler.tick(due_at - Duration::seconds(1)).await.is_empty());
    assert_eq!(queue.len().await, 1);

    let due = scheduler.tick(due_at).await;
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].protagonist_id, owner);
    assert!(queue.is_empty().await);
}

/// Holds every generation until released, so a choice stays in flight.
struct GatedGenerator {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl NarrativeGenerator for GatedGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<String, GeneratorError> {
        self.entered.notify_one();
        self.release.notified().await;
        Err(GeneratorError::Unavailable)
    }

    async fn usage(&self) -> GeneratorUsage {
        GeneratorUsage::default()
    }

    async fn clear_cache(&self) {}
}

#[tokio::test]
async fn concurrent_choice_for_same_character_fails_fast() {
    let generator = Arc::new(GatedGenerator {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let pipeline = Pipeline::with_generator(generator.clone());
    let id = pipeline.protagonist().await;

    let progression = pipeline.progression.clone();
    let first = tokio::spawn(async move {
        progression
            .advance(id, Stage::MorningArrival, "work_priority", "assess_team_status")
            .await
    });
    generator.entered.notified().await;

    let second = pipeline
        .progression
        .advance(id, Stage::MorningArrival, "work_priority", "check_logs_immediately")
        .await;
    assert_eq!(second.unwrap_err(), ChapterError::ChoiceInProgress(id));

    generator.release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.source, ConsequenceSource::Fallback);
    assert_eq!(first.time_elapsed, 1);
}

#[tokio::test]
async fn status_answers_while_a_choice_is_in_flight() {
    let generator = Arc::new(GatedGenerator {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let pipeline = Pipeline::with_generator(generator.clone());
    let id = pipeline.protagonist().await;

    let progression = pipeline.progression.clone();
    let in_flight = tokio::spawn(async move {
        progression
            .advance(id, Stage::MorningArrival, "work_priority", "assess_team_status")
            .await
    });
    generator.entered.notified().await;

    let status = pipeline.progression.status(id).await.unwrap();
    assert_eq!(status.stage.unwrap().stage, Stage::MorningArrival);
    assert_eq!(status.choices_made, 0);
    assert_eq!(status.time_elapsed, 0);
    let next = pipeline.progression.available_stages(id).await.unwrap();
    assert_eq!(next.len(), 1);

    generator.release.notify_one();
    in_flight.await.unwrap().unwrap();
    let status = pipeline.progression.status(id).await.unwrap();
    assert_eq!(status.choices_made, 1);
    assert_eq!(status.time_elapsed, 1);
}

#[tokio::test]
async fn status_after_finalize_reports_no_chapter_in_progress() {
    let pipeline = Pipeline::new();
    let id = pipeline.protagonist().await;
    pipeline.progression.finalize_chapter(id).await.unwrap();

    let status = pipeline.progression.status(id).await.unwrap();
    assert!(status.stage.is_none());
    assert_eq!(status.chapter, 2);
    assert_eq!(
        pipeline.progression.available_stages(id).await.unwrap_err(),
        ChapterError::ChapterNotStarted(id)
    );
}
