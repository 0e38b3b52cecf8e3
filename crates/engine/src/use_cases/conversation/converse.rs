//! A line of dialogue from one of the protagonist's colleagues.

use std::sync::Arc;

use solterra_domain::{Colleague, Dialogue, ProtagonistId, FALLBACK_DIALOGUE_LINES};

use crate::infrastructure::ports::{GeneratorError, NarrativeGenerator, RandomPort};
use crate::stores::GameStore;
use crate::use_cases::chapter::ChapterError;
use crate::use_cases::consequences::{normalize_dialogue, NormalizeError};
use crate::use_cases::prompts;

pub struct Converse {
    store: Arc<GameStore>,
    generator: Arc<dyn NarrativeGenerator>,
    random: Arc<dyn RandomPort>,
}

impl Converse {
    pub fn new(
        store: Arc<GameStore>,
        generator: Arc<dyn NarrativeGenerator>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            store,
            generator,
            random,
        }
    }

    /// Ask `colleague_name` for a line about `interaction`.
    ///
    /// Never fails on the generator: an unavailable generator yields the
    /// colleague's own canned line, and a line outside the length window is
    /// swapped for a generic one.
    pub async fn execute(
        &self,
        character_id: ProtagonistId,
        colleague_name: &str,
        interaction: &str,
    ) -> Result<Dialogue, ChapterError> {
        let colleague = Colleague::find(colleague_name)
            .ok_or_else(|| ChapterError::UnknownColleague(colleague_name.to_string()))?;
        let protagonist = self
            .store
            .protagonist(character_id)
            .ok_or(ChapterError::CharacterNotFound(character_id))?;
        let standing = self.standing(character_id, colleague.name);

        let request = prompts::colleague_request(&protagonist, colleague, interaction, standing);
        let line = match self.generator.generate(request).await {
            Ok(raw) => match normalize_dialogue(&raw) {
                Ok(line) => line,
                Err(e) => self.generic_line(character_id, &e),
            },
            Err(e) => return Ok(self.canned(character_id, colleague, interaction, &e)),
        };

        Ok(Dialogue::new(line, Colleague::reply_options()))
    }

    /// Standing as of the last committed choice. Zero outside a chapter.
    fn standing(&self, character_id: ProtagonistId, name: &str) -> i32 {
        self.store
            .committed_progress(character_id)
            .and_then(|p| p.colleague_relationships.get(name).copied())
            .unwrap_or(0)
    }

    fn canned(
        &self,
        character_id: ProtagonistId,
        colleague: &Colleague,
        interaction: &str,
        error: &GeneratorError,
    ) -> Dialogue {
        tracing::warn!(
            character_id = %character_id,
            colleague = colleague.name,
            interaction,
            error = %error,
            "Generator unavailable, using canned colleague line"
        );
        colleague.canned_dialogue(interaction)
    }

    fn generic_line(&self, character_id: ProtagonistId, error: &NormalizeError) -> String {
        let last = FALLBACK_DIALOGUE_LINES.len() as i32 - 1;
        let index = self.random.gen_range(0, last).max(0) as usize;
        tracing::warn!(character_id = %character_id, error = %error, "Rejected generated dialogue");
        FALLBACK_DIALOGUE_LINES
            .get(index)
            .copied()
            .unwrap_or_default()
            .to_string()
    }
}
