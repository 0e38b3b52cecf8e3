//! Protagonist management operations.

use std::sync::Arc;

use solterra_domain::{DomainError, Protagonist, ProtagonistId, ProtagonistSummary};

use crate::infrastructure::ports::ClockPort;
use crate::stores::GameStore;
use crate::use_cases::chapter::ChapterError;
use crate::use_cases::persistence::SaveGame;

pub struct ProtagonistManagement {
    store: Arc<GameStore>,
    save: Arc<SaveGame>,
    clock: Arc<dyn ClockPort>,
}

impl ProtagonistManagement {
    pub fn new(store: Arc<GameStore>, save: Arc<SaveGame>, clock: Arc<dyn ClockPort>) -> Self {
        Self { store, save, clock }
    }

    /// Create a protagonist and make them the current one.
    pub async fn create(&self, name: &str) -> Result<Protagonist, ChapterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::parse("Protagonist name cannot be empty").into());
        }

        let protagonist = Protagonist::new(name, self.clock.now());
        self.store.insert_protagonist(protagonist.clone());
        self.store.set_current_protagonist(protagonist.id).await;
        self.store.set_current_chapter(protagonist.chapter).await;

        tracing::info!(character_id = %protagonist.id, name, "Protagonist created");
        self.save.execute().await;
        Ok(protagonist)
    }

    /// Make an existing protagonist the current one.
    pub async fn switch(&self, id: ProtagonistId) -> Result<ProtagonistSummary, ChapterError> {
        let protagonist = self
            .store
            .protagonist(id)
            .ok_or(ChapterError::CharacterNotFound(id))?;
        self.store.set_current_protagonist(id).await;
        self.store.set_current_chapter(protagonist.chapter).await;

        tracing::info!(character_id = %id, chapter = protagonist.chapter, "Switched protagonist");
        self.save.execute().await;
        Ok(protagonist.summary())
    }

    pub fn get(&self, id: ProtagonistId) -> Result<Protagonist, ChapterError> {
        self.store
            .protagonist(id)
            .ok_or(ChapterError::CharacterNotFound(id))
    }

    pub fn summary(&self, id: ProtagonistId) -> Result<ProtagonistSummary, ChapterError> {
        self.get(id).map(|p| p.summary())
    }

    pub fn list(&self) -> Vec<ProtagonistSummary> {
        self.store
            .protagonists()
            .iter()
            .map(Protagonist::summary)
            .collect()
    }
}
