//! Background accumulation from background-building choices.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use solterra_domain::{
    choice_fallback, choice_pattern, BackgroundCategory, ChapterProgress, ChoiceRecord,
    ConsequenceSet, ConsequenceSource, PatternWeights, Protagonist, DEFAULT_NARRATIVE,
};

use super::StepOutcome;
use crate::stores::GameStore;
use crate::use_cases::consequences::ResolveConsequences;
use crate::use_cases::prompts::{self, ChoiceContext};

/// Add a pattern's weights and establish the background if one became decisive.
///
/// Returns the category established by this call, if any. An established
/// background is never replaced.
pub(crate) fn accumulate(
    protagonist: &mut Protagonist,
    progress: &mut ChapterProgress,
    weights: PatternWeights,
    threshold: u32,
) -> Option<BackgroundCategory> {
    progress.background_score.add_weights(weights);

    if protagonist.background.is_some() {
        return None;
    }
    let category = progress.background_score.decisive(threshold)?;
    if !protagonist.establish_background(category) {
        return None;
    }

    tracing::info!(
        character_id = %protagonist.id,
        background = %category,
        score = progress.background_score.get(category),
        "Background established"
    );
    Some(category)
}

/// Records a choice against the static pattern table.
pub struct RecordChoice {
    store: Arc<GameStore>,
    resolver: Arc<ResolveConsequences>,
    threshold: u32,
}

impl RecordChoice {
    pub fn new(store: Arc<GameStore>, resolver: Arc<ResolveConsequences>, threshold: u32) -> Self {
        Self {
            store,
            resolver,
            threshold,
        }
    }

    pub async fn execute(
        &self,
        protagonist: &mut Protagonist,
        progress: &mut ChapterProgress,
        choice_type: &str,
        choice_value: &str,
        now: DateTime<Utc>,
    ) -> StepOutcome {
        let weights = match choice_pattern(choice_type, choice_value) {
            Ok(weights) => weights,
            Err(e) => {
                tracing::warn!(
                    character_id = %protagonist.id,
                    choice_type,
                    choice_value,
                    error = %e,
                    "Unknown choice pattern, no consequences"
                );
                return StepOutcome::new(
                    ConsequenceSet::empty(DEFAULT_NARRATIVE),
                    ConsequenceSource::None,
                );
            }
        };

        let stage = progress.current_stage;
        progress.choices.push(ChoiceRecord {
            stage,
            choice_type: choice_type.to_string(),
            choice_value: choice_value.to_string(),
            made_at: now,
        });
        let established = accumulate(protagonist, progress, weights, self.threshold);

        let world = self.store.world().await;
        let request = prompts::consequence_request(
            protagonist,
            &world,
            ChoiceContext {
                stage,
                choice_type,
                choice_value,
            },
        );
        let (consequences, source) = self
            .resolver
            .execute(protagonist.id, request, || choice_fallback(choice_type))
            .await;

        let mut outcome = StepOutcome::new(consequences, source);
        outcome.background_established = established;
        outcome
    }
}
