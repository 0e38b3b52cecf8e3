//! Chapter progression controller.
//!
//! Owns the stage chain of a chapter and routes each choice to the step that
//! handles it. A choice is processed on working copies of the protagonist
//! and the chapter progress; both are committed together once the step and
//! its consequences have been applied, followed by one save checkpoint.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::MutexGuard;

use solterra_domain::{
    affiliated_faction, BackgroundCategory, BackgroundScore, ChapterProgress, ChapterRecord,
    ChapterSummary, ChoiceRecord, ConsequenceSet, ConsequenceSource, Dialogue, DiscoveryTier,
    GlobalEvent, ProtagonistId, ProtagonistSummary, Region, Stage, StageInfo,
};

use super::{
    ChapterError, RecordChoice, RespondToContact, ResolveDiscovery, SelectContact, StepOutcome,
};
use crate::infrastructure::ports::ClockPort;
use crate::stores::{ChapterSession, GameStore};
use crate::use_cases::consequences::ApplyConsequences;
use crate::use_cases::persistence::SaveGame;

/// Choice type that resolves the investigation in the technical stage.
pub const DISCOVERY_CHOICE: &str = "discovery_approach";
/// Choice type that triggers the underground contact.
pub const INITIAL_CONTACT_CHOICE: &str = "initial_contact";
/// Choice type for the reply to the contact; the value is the reply key.
pub const CONTACT_REPLY_CHOICE: &str = "contact_reply";

const DISCOVERY_EVENT: &str = "surveillance_discovery";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Accumulate,
    Discovery,
    Contact,
    Reply,
}

fn route(stage: Stage, choice_type: &str) -> Route {
    match (stage, choice_type) {
        (Stage::TechnicalInvestigation, DISCOVERY_CHOICE) => Route::Discovery,
        (Stage::BlackmailerContact, INITIAL_CONTACT_CHOICE) => Route::Contact,
        (Stage::BlackmailerContact, CONTACT_REPLY_CHOICE) => Route::Reply,
        _ => Route::Accumulate,
    }
}

/// Result of one processed choice.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceOutcome {
    pub consequences: ConsequenceSet,
    pub source: ConsequenceSource,
    pub background: Option<BackgroundCategory>,
    pub background_established: bool,
    /// The contact's message and reply options, after initial contact.
    pub contact: Option<Dialogue>,
    pub stage: Stage,
    pub time_elapsed: u32,
    /// Whether the checkpoint after this choice was written.
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterStatus {
    pub protagonist: ProtagonistSummary,
    pub chapter: u32,
    /// `None` when no chapter is in progress.
    pub stage: Option<StageInfo>,
    pub background_score: Option<BackgroundScore>,
    pub discovery_tier: Option<DiscoveryTier>,
    pub contact_made: bool,
    pub choices_made: usize,
    pub time_elapsed: u32,
    pub surveillance_influence: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizedChapter {
    pub record: ChapterRecord,
    pub saved: bool,
}

pub struct ChapterProgression {
    store: Arc<GameStore>,
    record_choice: Arc<RecordChoice>,
    resolve_discovery: Arc<ResolveDiscovery>,
    select_contact: Arc<SelectContact>,
    respond_to_contact: Arc<RespondToContact>,
    apply: Arc<ApplyConsequences>,
    save: Arc<SaveGame>,
    clock: Arc<dyn ClockPort>,
}

impl ChapterProgression {
    pub fn new(
        store: Arc<GameStore>,
        record_choice: Arc<RecordChoice>,
        resolve_discovery: Arc<ResolveDiscovery>,
        select_contact: Arc<SelectContact>,
        respond_to_contact: Arc<RespondToContact>,
        apply: Arc<ApplyConsequences>,
        save: Arc<SaveGame>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            store,
            record_choice,
            resolve_discovery,
            select_contact,
            respond_to_contact,
            apply,
            save,
            clock,
        }
    }

    fn session(&self, id: ProtagonistId) -> Result<ChapterSession, ChapterError> {
        self.store
            .session(id)
            .ok_or(ChapterError::CharacterNotFound(id))
    }

    /// Start (or restart) the protagonist's current chapter at its first stage.
    pub async fn start_chapter(&self, id: ProtagonistId) -> Result<StageInfo, ChapterError> {
        let session = self.session(id)?;
        let mut guard = lock(&session, id)?;
        let protagonist = self
            .store
            .protagonist(id)
            .ok_or(ChapterError::CharacterNotFound(id))?;

        let progress = ChapterProgress::start(&protagonist, self.clock.now());
        let info = progress.current_stage.info();
        self.store.publish_progress(id, &progress);
        *guard = Some(progress);
        drop(guard);

        self.store.set_current_protagonist(id).await;
        self.store.set_current_chapter(protagonist.chapter).await;
        tracing::info!(
            character_id = %id,
            chapter = protagonist.chapter,
            "Chapter started"
        );
        self.save.execute().await;
        Ok(info)
    }

    /// Process one choice made in `stage`.
    pub async fn advance(
        &self,
        id: ProtagonistId,
        stage: Stage,
        choice_type: &str,
        choice_value: &str,
    ) -> Result<ChoiceOutcome, ChapterError> {
        let session = self.session(id)?;
        let mut guard = lock(&session, id)?;
        let progress = guard.as_mut().ok_or(ChapterError::ChapterNotStarted(id))?;
        if progress.current_stage != stage {
            return Err(ChapterError::StageMismatch {
                expected: progress.current_stage,
                got: stage,
            });
        }

        let mut protagonist = self
            .store
            .protagonist(id)
            .ok_or(ChapterError::CharacterNotFound(id))?;
        let mut working = progress.clone();
        let now = self.clock.now();

        let route = route(stage, choice_type);
        tracing::debug!(
            character_id = %id,
            stage = %stage,
            choice_type,
            route = ?route,
            "Routing choice"
        );

        let step: StepOutcome = match route {
            Route::Accumulate => {
                self.record_choice
                    .execute(&mut protagonist, &mut working, choice_type, choice_value, now)
                    .await
            }
            Route::Discovery => {
                self.resolve_discovery
                    .execute(&mut protagonist, &mut working, choice_value)
                    .await?
            }
            Route::Contact => {
                self.select_contact
                    .execute(&protagonist, &mut working, now)
                    .await?
            }
            Route::Reply => {
                self.respond_to_contact
                    .execute(&protagonist, &mut working, choice_value)
                    .await?
            }
        };
        if route != Route::Accumulate {
            working.choices.push(ChoiceRecord {
                stage,
                choice_type: choice_type.to_string(),
                choice_value: choice_value.to_string(),
                made_at: now,
            });
        }

        self.apply
            .execute(&step.consequences, &mut protagonist, &mut working, now)
            .await;
        working.time_elapsed += 1;

        let background = protagonist.background;
        let time_elapsed = working.time_elapsed;
        self.store.commit_protagonist(protagonist);
        self.store.publish_progress(id, &working);
        *progress = working;
        drop(guard);

        let saved = self.save.execute().await;
        Ok(ChoiceOutcome {
            background_established: step.background_established.is_some(),
            consequences: step.consequences,
            source: step.source,
            background,
            contact: step.contact,
            stage,
            time_elapsed,
            saved,
        })
    }

    /// Move to the next stage in the chain.
    pub async fn transition_to_stage(
        &self,
        id: ProtagonistId,
        next: Stage,
    ) -> Result<StageInfo, ChapterError> {
        let session = self.session(id)?;
        let mut guard = lock(&session, id)?;
        let progress = guard.as_mut().ok_or(ChapterError::ChapterNotStarted(id))?;

        progress.current_stage = progress.current_stage.transition_to(next)?;
        self.store.publish_progress(id, progress);
        tracing::info!(character_id = %id, stage = %next, "Stage transition");
        Ok(next.info())
    }

    /// Stages reachable from the current one.
    pub async fn available_stages(&self, id: ProtagonistId) -> Result<Vec<StageInfo>, ChapterError> {
        if !self.store.contains(id) {
            return Err(ChapterError::CharacterNotFound(id));
        }
        let progress = self
            .store
            .committed_progress(id)
            .ok_or(ChapterError::ChapterNotStarted(id))?;
        Ok(progress
            .current_stage
            .successor()
            .map(|s| s.info())
            .into_iter()
            .collect())
    }

    /// Close the chapter: write its record, fold its outcome into the world
    /// and move the protagonist on to the next chapter.
    pub async fn finalize_chapter(&self, id: ProtagonistId) -> Result<FinalizedChapter, ChapterError> {
        let session = self.session(id)?;
        let mut guard = lock(&session, id)?;
        let progress = guard.as_ref().ok_or(ChapterError::ChapterNotStarted(id))?;
        let mut protagonist = self
            .store
            .protagonist(id)
            .ok_or(ChapterError::CharacterNotFound(id))?;

        let now = self.clock.now();
        let record = ChapterRecord::compile(&protagonist, progress, now);

        if let Some(tier) = record.discovery_tier {
            self.store.add_surveillance(tier.chapter_surveillance_delta()).await;
        }
        self.store
            .record_event(GlobalEvent {
                kind: DISCOVERY_EVENT.to_string(),
                region: Region::Valoria,
                discovery_tier: record.discovery_tier,
                background: record.background,
                occurred_at: now,
            })
            .await;
        if let Some(contact) = &record.contact {
            let faction = affiliated_faction(contact.background);
            self.store.adjust_player_standing(faction, 1).await;
        }

        protagonist
            .chapter_history
            .insert(record.chapter, record.clone());
        protagonist.chapter = record.chapter + 1;
        let next_chapter = protagonist.chapter;
        self.store.commit_protagonist(protagonist);
        self.store.clear_progress(id);
        *guard = None;
        drop(guard);

        self.store.set_current_chapter(next_chapter).await;
        tracing::info!(
            character_id = %id,
            chapter = record.chapter,
            discovery = ?record.discovery_tier,
            contact_made = record.contact_made(),
            next = %record.next_chapter.title,
            "Chapter finalized"
        );

        let saved = self.save.execute().await;
        Ok(FinalizedChapter { record, saved })
    }

    /// Reads committed state only, so it answers while a choice is in flight.
    pub async fn status(&self, id: ProtagonistId) -> Result<ChapterStatus, ChapterError> {
        let protagonist = self
            .store
            .protagonist(id)
            .ok_or(ChapterError::CharacterNotFound(id))?;
        let world = self.store.world().await;

        let committed = self.store.committed_progress(id);
        let progress = committed.as_ref();
        Ok(ChapterStatus {
            chapter: protagonist.chapter,
            protagonist: protagonist.summary(),
            stage: progress.map(|p| p.current_stage.info()),
            background_score: progress.map(|p| p.background_score),
            discovery_tier: progress.and_then(|p| p.discovery_tier()),
            contact_made: progress.is_some_and(|p| p.contact.is_some()),
            choices_made: progress.map_or(0, |p| p.choices.len()),
            time_elapsed: progress.map_or(0, |p| p.time_elapsed),
            surveillance_influence: world.surveillance_influence,
        })
    }

    /// Restart the current protagonist's chapter from its first stage.
    ///
    /// Does nothing when no protagonist is selected.
    pub async fn reset_chapter_state(&self) -> Result<Option<StageInfo>, ChapterError> {
        let Some(id) = self.store.current_protagonist().await else {
            tracing::debug!("No current protagonist, nothing to reset");
            return Ok(None);
        };
        let session = self.session(id)?;
        let mut guard = lock(&session, id)?;
        let protagonist = self
            .store
            .protagonist(id)
            .ok_or(ChapterError::CharacterNotFound(id))?;

        let progress = ChapterProgress::start(&protagonist, self.clock.now());
        let info = progress.current_stage.info();
        self.store.publish_progress(id, &progress);
        *guard = Some(progress);
        tracing::info!(character_id = %id, "Chapter state reset");
        Ok(Some(info))
    }

    /// Recap of the most recently completed chapter.
    pub async fn chapter_summary(
        &self,
        id: ProtagonistId,
    ) -> Result<Option<ChapterSummary>, ChapterError> {
        let protagonist = self
            .store
            .protagonist(id)
            .ok_or(ChapterError::CharacterNotFound(id))?;
        Ok(protagonist
            .chapter_history
            .values()
            .next_back()
            .map(ChapterSummary::from_record))
    }
}

fn lock(
    session: &ChapterSession,
    id: ProtagonistId,
) -> Result<MutexGuard<'_, Option<ChapterProgress>>, ChapterError> {
    session
        .try_lock()
        .map_err(|_| ChapterError::ChoiceInProgress(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_depends_on_stage_and_type() {
        assert_eq!(route(Stage::TechnicalInvestigation, DISCOVERY_CHOICE), Route::Discovery);
        assert_eq!(route(Stage::MorningArrival, DISCOVERY_CHOICE), Route::Accumulate);
        assert_eq!(route(Stage::BlackmailerContact, INITIAL_CONTACT_CHOICE), Route::Contact);
        assert_eq!(route(Stage::BlackmailerContact, CONTACT_REPLY_CHOICE), Route::Reply);
        assert_eq!(route(Stage::BlackmailerContact, "contact_response"), Route::Accumulate);
        assert_eq!(route(Stage::TechnicalInvestigation, "technical_approach"), Route::Accumulate);
    }
}
