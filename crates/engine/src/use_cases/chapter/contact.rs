//! Underground contact: choosing how it reaches out, and the reply.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use solterra_domain::{
    response_fallback, response_options, ChapterProgress, ConsequenceSet, ConsequenceSource,
    ContactMethod, ContactRecord, Dialogue, DomainError, MessageTemplate, Protagonist,
};

use super::{ChapterError, StepOutcome};
use crate::infrastructure::ports::NarrativeGenerator;
use crate::stores::GameStore;
use crate::use_cases::consequences::{normalize_dialogue, ResolveConsequences};
use crate::use_cases::prompts;

/// Picks the contact method from the discovery tier and the message from
/// the established background.
pub struct SelectContact {
    generator: Arc<dyn NarrativeGenerator>,
}

impl SelectContact {
    pub fn new(generator: Arc<dyn NarrativeGenerator>) -> Self {
        Self { generator }
    }

    pub async fn execute(
        &self,
        protagonist: &Protagonist,
        progress: &mut ChapterProgress,
        now: DateTime<Utc>,
    ) -> Result<StepOutcome, ChapterError> {
        let tier = progress
            .discovery_tier()
            .ok_or_else(|| DomainError::invalid_discovery_level("none"))?;
        let background = protagonist
            .background
            .ok_or_else(|| DomainError::unknown_background_template("undetermined"))?;

        let method = ContactMethod::for_tier(tier);
        let template = MessageTemplate::for_background(background);

        let request = prompts::contact_message_request(protagonist, method, &template);
        let generated = match self.generator.generate(request).await {
            Ok(raw) => normalize_dialogue(&raw).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        let (message, source) = match generated {
            Ok(message) => (message, ConsequenceSource::Generated),
            Err(error) => {
                tracing::warn!(
                    character_id = %protagonist.id,
                    error = %error,
                    "Contact message unavailable, using template"
                );
                (template.render(), ConsequenceSource::Fallback)
            }
        };

        if progress.contact.is_none() {
            progress.contact = Some(ContactRecord::new(method, background, tier, now));
            tracing::info!(
                character_id = %protagonist.id,
                method = %method,
                urgency = ?method.urgency(),
                background = %background,
                "Underground contact made"
            );
        }

        let mut outcome = StepOutcome::new(ConsequenceSet::empty(message.clone()), source);
        outcome.contact = Some(Dialogue::new(message, response_options(background)));
        Ok(outcome)
    }
}

/// Resolves the reply the protagonist sends back to the contact.
pub struct RespondToContact {
    store: Arc<GameStore>,
    resolver: Arc<ResolveConsequences>,
}

impl RespondToContact {
    pub fn new(store: Arc<GameStore>, resolver: Arc<ResolveConsequences>) -> Self {
        Self { store, resolver }
    }

    pub async fn execute(
        &self,
        protagonist: &Protagonist,
        progress: &mut ChapterProgress,
        response_key: &str,
    ) -> Result<StepOutcome, ChapterError> {
        let contact = progress
            .contact
            .as_mut()
            .ok_or(ChapterError::NoActiveContact)?;
        contact.response = Some(response_key.to_string());
        let method = contact.method;

        let world = self.store.world().await;
        let request = prompts::response_request(protagonist, &world, method, response_key);
        let (consequences, source) = self
            .resolver
            .execute(protagonist.id, request, || response_fallback(response_key))
            .await;
        Ok(StepOutcome::new(consequences, source))
    }
}
