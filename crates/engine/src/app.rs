//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    config::EngineConfig,
    generator::{GeneratorSettings, LiveGenerator, NullGenerator},
    messages_api::MessagesApiClient,
    ports::{ClockPort, NarrativeGenerator, RandomPort, SaveStore},
    resilient_llm::{ResilientLlmClient, RetryConfig},
    save_store::{InMemorySaveStore, SqliteSaveStore},
};
use crate::stores::{DelayedQueue, GameStore};
use crate::use_cases::{
    self,
    chapter::{
        ChapterProgression, RecordChoice, RespondToContact, ResolveDiscovery, SelectContact,
    },
    consequences::{ApplyConsequences, PromoteDelayed, ResolveConsequences},
    conversation::Converse,
    persistence::{LoadGame, SaveGame},
    protagonist::ProtagonistManagement,
};

/// Main application state.
///
/// Holds the in-memory stores, the narrative generator and all use cases.
pub struct App {
    pub store: Arc<GameStore>,
    pub queue: Arc<DelayedQueue>,
    pub generator: Arc<dyn NarrativeGenerator>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub chapter: use_cases::ChapterUseCases,
    pub conversation: use_cases::ConversationUseCases,
    pub protagonist: use_cases::ProtagonistUseCases,
    pub save: Arc<SaveGame>,
    pub load: Arc<LoadGame>,
    pub scheduler: Arc<PromoteDelayed>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        config: &EngineConfig,
        generator: Arc<dyn NarrativeGenerator>,
        save_store: Arc<dyn SaveStore>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let store = Arc::new(GameStore::new());
        let queue = Arc::new(DelayedQueue::new());
        let threshold = config.background_threshold;

        let resolver = Arc::new(ResolveConsequences::new(generator.clone()));
        let scheduler = Arc::new(PromoteDelayed::new(queue.clone(), clock.clone()));
        let save = Arc::new(SaveGame::new(
            store.clone(),
            queue.clone(),
            save_store.clone(),
            clock.clone(),
        ));
        let load = Arc::new(LoadGame::new(
            store.clone(),
            queue.clone(),
            save_store,
            scheduler.clone(),
            clock.clone(),
        ));

        let progression = Arc::new(ChapterProgression::new(
            store.clone(),
            Arc::new(RecordChoice::new(store.clone(), resolver.clone(), threshold)),
            Arc::new(ResolveDiscovery::new(store.clone(), resolver.clone(), threshold)),
            Arc::new(SelectContact::new(generator.clone())),
            Arc::new(RespondToContact::new(store.clone(), resolver)),
            Arc::new(ApplyConsequences::new(store.clone(), queue.clone())),
            save.clone(),
            clock.clone(),
        ));
        let converse = Arc::new(Converse::new(store.clone(), generator.clone(), random));
        let management = Arc::new(ProtagonistManagement::new(store.clone(), save.clone(), clock));

        let use_cases = UseCases {
            chapter: use_cases::ChapterUseCases::new(progression),
            conversation: use_cases::ConversationUseCases::new(converse),
            protagonist: use_cases::ProtagonistUseCases::new(management),
            save,
            load,
            scheduler,
        };

        Self {
            store,
            queue,
            generator,
            use_cases,
        }
    }

    /// Wire the production adapters described by `config`.
    pub async fn from_config(config: &EngineConfig) -> Self {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
        let generator = build_generator(config);
        let save_store = open_save_store(config, clock.clone()).await;
        Self::new(config, generator, save_store, clock, Arc::new(SystemRandom))
    }
}

fn build_generator(config: &EngineConfig) -> Arc<dyn NarrativeGenerator> {
    let Some(api_key) = config.api_key.as_deref() else {
        tracing::warn!("SOLTERRA_API_KEY not set, narrative generator unavailable");
        return Arc::new(NullGenerator);
    };

    let client = Arc::new(MessagesApiClient::new(
        &config.api_url,
        api_key,
        &config.model,
        config.timeout,
    ));
    let retry_config = RetryConfig::default();
    tracing::info!(
        model = %config.model,
        max_retries = retry_config.max_retries,
        base_delay_ms = retry_config.base_delay_ms,
        timeout_secs = config.timeout.as_secs(),
        "Narrative generator configured"
    );
    let llm = Arc::new(ResilientLlmClient::new(client, retry_config));
    Arc::new(LiveGenerator::new(
        llm,
        GeneratorSettings {
            timeout: config.timeout,
            cache_ttl: config.cache_ttl,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        },
    ))
}

async fn open_save_store(config: &EngineConfig, clock: Arc<dyn ClockPort>) -> Arc<dyn SaveStore> {
    match SqliteSaveStore::new(&config.save_db, clock).await {
        Ok(store) => {
            tracing::info!(path = %config.save_db, "Save store opened");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(
                path = %config.save_db,
                error = %e,
                "Failed to open save store, progress will not survive a restart"
            );
            Arc::new(InMemorySaveStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::{GenerationKind, GenerationRequest, GeneratorError};
    use chrono::{TimeZone, Utc};
    use solterra_domain::Stage;

    fn app() -> App {
        App::new(
            &EngineConfig::default(),
            Arc::new(NullGenerator),
            Arc::new(InMemorySaveStore::new()),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 6, 30, 0).unwrap())),
            Arc::new(FixedRandom(0)),
        )
    }

    #[tokio::test]
    async fn missing_api_key_means_unavailable_generator() {
        let generator = build_generator(&EngineConfig::default());
        let request = GenerationRequest {
            kind: GenerationKind::Dialogue,
            system_prompt: String::new(),
            prompt: "Say hello".into(),
        };
        assert!(matches!(
            generator.generate(request).await,
            Err(GeneratorError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn save_and_load_round_trip_through_the_app() {
        let first = app();
        let protagonist = first
            .use_cases
            .protagonist
            .management
            .create("Aria")
            .await
            .unwrap();
        first
            .use_cases
            .chapter
            .progression
            .start_chapter(protagonist.id)
            .await
            .unwrap();
        first
            .use_cases
            .chapter
            .progression
            .advance(protagonist.id, Stage::MorningArrival, "work_priority", "review_notes_methodically")
            .await
            .unwrap();

        let loaded = first.use_cases.load.execute().await;
        assert!(loaded.restored);
        let restored = first.store.protagonist(protagonist.id).unwrap();
        assert!(restored.background.is_some());
        assert_eq!(first.store.current_protagonist().await, Some(protagonist.id));
    }
}
