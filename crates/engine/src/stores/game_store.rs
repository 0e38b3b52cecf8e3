//! Character and world store.
//!
//! Committed protagonists live in a concurrent map. Chapter progress lives
//! in a per-character session guarded by its own mutex, which is what gives
//! one in-flight choice per character. The world is a single shared value
//! that is only ever changed through increment-style methods, so
//! interleaved updates from different characters never lose writes.
//!
//! Every committed change to a session is also published as a progress
//! snapshot. Readers use the snapshot and never wait on a choice in flight.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};

use solterra_domain::{
    ChapterProgress, Faction, GlobalEvent, Protagonist, ProtagonistId, WorldState,
};

/// Chapter progress for one character. `None` between chapters.
pub type ChapterSession = Arc<Mutex<Option<ChapterProgress>>>;

#[derive(Debug, Clone, Copy, Default)]
struct Pointer {
    protagonist: Option<ProtagonistId>,
    chapter: u32,
}

pub struct GameStore {
    protagonists: DashMap<ProtagonistId, Protagonist>,
    sessions: DashMap<ProtagonistId, ChapterSession>,
    progress: DashMap<ProtagonistId, ChapterProgress>,
    world: RwLock<WorldState>,
    pointer: RwLock<Pointer>,
}

impl GameStore {
    pub fn new() -> Self {
        Self {
            protagonists: DashMap::new(),
            sessions: DashMap::new(),
            progress: DashMap::new(),
            world: RwLock::new(WorldState::default()),
            pointer: RwLock::new(Pointer {
                protagonist: None,
                chapter: 1,
            }),
        }
    }

    // =========================================================================
    // Protagonists
    // =========================================================================

    pub fn insert_protagonist(&self, protagonist: Protagonist) {
        self.protagonists.insert(protagonist.id, protagonist);
    }

    /// Snapshot of the committed protagonist.
    pub fn protagonist(&self, id: ProtagonistId) -> Option<Protagonist> {
        self.protagonists.get(&id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: ProtagonistId) -> bool {
        self.protagonists.contains_key(&id)
    }

    /// Replace the committed protagonist with an updated copy.
    pub fn commit_protagonist(&self, protagonist: Protagonist) {
        self.protagonists.insert(protagonist.id, protagonist);
    }

    /// All protagonists, oldest first.
    pub fn protagonists(&self) -> Vec<Protagonist> {
        let mut all: Vec<Protagonist> = self
            .protagonists
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        all
    }

    /// Chapter session for a known protagonist, created on first use.
    pub fn session(&self, id: ProtagonistId) -> Option<ChapterSession> {
        if !self.contains(id) {
            return None;
        }
        let session = self
            .sessions
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .value()
            .clone();
        Some(session)
    }

    /// Publish the session's committed progress for lock-free readers.
    pub fn publish_progress(&self, id: ProtagonistId, progress: &ChapterProgress) {
        self.progress.insert(id, progress.clone());
    }

    /// Chapter closed; nothing left to read.
    pub fn clear_progress(&self, id: ProtagonistId) {
        self.progress.remove(&id);
    }

    /// Last committed progress, unaffected by a choice still in flight.
    pub fn committed_progress(&self, id: ProtagonistId) -> Option<ChapterProgress> {
        self.progress.get(&id).map(|entry| entry.value().clone())
    }

    // =========================================================================
    // World
    // =========================================================================

    pub async fn world(&self) -> WorldState {
        self.world.read().await.clone()
    }

    /// Returns the new accumulator value.
    pub async fn add_surveillance(&self, delta: i32) -> i32 {
        self.world.write().await.add_surveillance(delta)
    }

    pub async fn adjust_player_standing(&self, faction: Faction, delta: i32) -> bool {
        self.world.write().await.adjust_player_standing(faction, delta)
    }

    pub async fn record_event(&self, event: GlobalEvent) {
        self.world.write().await.record_event(event);
    }

    // =========================================================================
    // Session pointer
    // =========================================================================

    pub async fn current_protagonist(&self) -> Option<ProtagonistId> {
        self.pointer.read().await.protagonist
    }

    pub async fn set_current_protagonist(&self, id: ProtagonistId) {
        self.pointer.write().await.protagonist = Some(id);
    }

    pub async fn current_chapter(&self) -> u32 {
        self.pointer.read().await.chapter
    }

    pub async fn set_current_chapter(&self, chapter: u32) {
        self.pointer.write().await.chapter = chapter;
    }

    /// Replace everything with loaded state. Chapter sessions are dropped.
    pub async fn restore(
        &self,
        world: WorldState,
        protagonists: Vec<Protagonist>,
        current_protagonist: Option<ProtagonistId>,
        current_chapter: u32,
    ) {
        self.sessions.clear();
        self.progress.clear();
        self.protagonists.clear();
        for protagonist in protagonists {
            self.insert_protagonist(protagonist);
        }
        *self.world.write().await = world;
        *self.pointer.write().await = Pointer {
            protagonist: current_protagonist.filter(|id| self.contains(*id)),
            chapter: current_chapter,
        };
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}
