//! Save and load checkpoints.
//!
//! The whole game is stored as one JSON blob. A failed save is reported as
//! `false` and never loses in-memory state; a missing or unreadable blob
//! loads as a fresh game.
//!
//! Checkpoints are serialized: each one snapshots and writes while holding
//! the save lock, so a later snapshot is never overwritten by an earlier one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use solterra_domain::{Protagonist, ProtagonistId, QueuedConsequence, WorldState};

use crate::infrastructure::ports::{ClockPort, RepoError, SaveStore};
use crate::stores::{DelayedQueue, GameStore};
use crate::use_cases::consequences::PromoteDelayed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub current_chapter: u32,
    pub current_protagonist: Option<ProtagonistId>,
    pub world: WorldState,
    pub protagonists: Vec<Protagonist>,
    #[serde(default)]
    pub delayed_consequences: Vec<QueuedConsequence>,
    pub saved_at: DateTime<Utc>,
}

pub struct SaveGame {
    store: Arc<GameStore>,
    queue: Arc<DelayedQueue>,
    save_store: Arc<dyn SaveStore>,
    clock: Arc<dyn ClockPort>,
    write_lock: Mutex<()>,
}

impl SaveGame {
    pub fn new(
        store: Arc<GameStore>,
        queue: Arc<DelayedQueue>,
        save_store: Arc<dyn SaveStore>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            store,
            queue,
            save_store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Snapshot and persist. Returns whether the checkpoint was written.
    pub async fn execute(&self) -> bool {
        match self.try_save().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save game state");
                false
            }
        }
    }

    async fn try_save(&self) -> Result<(), RepoError> {
        let _write = self.write_lock.lock().await;
        let state = SaveState {
            current_chapter: self.store.current_chapter().await,
            current_protagonist: self.store.current_protagonist().await,
            world: self.store.world().await,
            protagonists: self.store.protagonists(),
            delayed_consequences: self.queue.snapshot().await,
            saved_at: self.clock.now(),
        };
        let blob = serde_json::to_string(&state).map_err(RepoError::serialization)?;
        self.save_store.save(&blob).await?;
        tracing::debug!(
            protagonists = state.protagonists.len(),
            queued = state.delayed_consequences.len(),
            "Game state saved"
        );
        Ok(())
    }
}

/// What a load found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadOutcome {
    /// `false` when fresh defaults were used.
    pub restored: bool,
    /// When the loaded checkpoint was written, or the load time for a fresh game.
    pub saved_at: DateTime<Utc>,
    /// Delayed consequences that came due while the game was closed.
    pub triggered: Vec<QueuedConsequence>,
}

pub struct LoadGame {
    store: Arc<GameStore>,
    queue: Arc<DelayedQueue>,
    save_store: Arc<dyn SaveStore>,
    scheduler: Arc<PromoteDelayed>,
    clock: Arc<dyn ClockPort>,
}

impl LoadGame {
    pub fn new(
        store: Arc<GameStore>,
        queue: Arc<DelayedQueue>,
        save_store: Arc<dyn SaveStore>,
        scheduler: Arc<PromoteDelayed>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            store,
            queue,
            save_store,
            scheduler,
            clock,
        }
    }

    pub async fn execute(&self) -> LoadOutcome {
        let state = match self.save_store.load().await {
            Ok(Some(blob)) => match serde_json::from_str::<SaveState>(&blob) {
                Ok(state) => Some(state),
                Err(e) => {
                    tracing::warn!(error = %e, "Saved game is unreadable, starting fresh");
                    None
                }
            },
            Ok(None) => {
                tracing::info!("No saved game, starting fresh");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load saved game, starting fresh");
                None
            }
        };

        let restored = state.is_some();
        let state = state.unwrap_or_else(|| SaveState {
            current_chapter: 1,
            current_protagonist: None,
            world: WorldState::default(),
            protagonists: Vec::new(),
            delayed_consequences: Vec::new(),
            saved_at: self.clock.now(),
        });

        if restored {
            tracing::info!(
                protagonists = state.protagonists.len(),
                queued = state.delayed_consequences.len(),
                saved_at = %state.saved_at,
                "Game state loaded"
            );
        }

        let saved_at = state.saved_at;
        self.store
            .restore(
                state.world,
                state.protagonists,
                state.current_protagonist,
                state.current_chapter,
            )
            .await;
        self.queue.restore(state.delayed_consequences).await;

        let triggered = self.scheduler.execute().await;
        LoadOutcome {
            restored,
            saved_at,
            triggered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::MockSaveStore;
    use crate::infrastructure::save_store::InMemorySaveStore;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use solterra_domain::{BackgroundCategory, DelayedConsequence};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    struct Harness {
        store: Arc<GameStore>,
        queue: Arc<DelayedQueue>,
        save: SaveGame,
        load: LoadGame,
    }

    fn harness(save_store: Arc<dyn SaveStore>, now: DateTime<Utc>) -> Harness {
        let store = Arc::new(GameStore::new());
        let queue = Arc::new(DelayedQueue::new());
        let clock: Arc<dyn ClockPort> = Arc::new(FixedClock(now));
        let scheduler = Arc::new(PromoteDelayed::new(queue.clone(), clock.clone()));
        Harness {
            save: SaveGame::new(store.clone(), queue.clone(), save_store.clone(), clock.clone()),
            load: LoadGame::new(store.clone(), queue.clone(), save_store, scheduler, clock),
            store,
            queue,
        }
    }

    #[tokio::test]
    async fn save_then_load_restores_state() {
        let blobs: Arc<dyn SaveStore> = Arc::new(InMemorySaveStore::new());
        let first = harness(blobs.clone(), t());
        let aria = Protagonist::new("Aria", t());
        let id = aria.id;
        first.store.insert_protagonist(aria);
        first.store.set_current_protagonist(id).await;
        first.store.add_surveillance(7).await;
        first
            .queue
            .enqueue(QueuedConsequence::new(
                id,
                DelayedConsequence::event("Audit", "Questions", "1 day").with_delay_secs(3600),
                t(),
            ))
            .await;
        assert!(first.save.execute().await);

        let second = harness(blobs, t() + Duration::minutes(5));
        let outcome = second.load.execute().await;
        assert!(outcome.restored);
        assert_eq!(outcome.saved_at, t());
        assert!(outcome.triggered.is_empty());
        assert_eq!(second.store.current_protagonist().await, Some(id));
        assert_eq!(second.store.world().await.surveillance_influence, 7);
        assert_eq!(second.queue.len().await, 1);
    }

    #[tokio::test]
    async fn due_consequences_trigger_on_load() {
        let blobs: Arc<dyn SaveStore> = Arc::new(InMemorySaveStore::new());
        let first = harness(blobs.clone(), t());
        first
            .queue
            .enqueue(QueuedConsequence::new(
                solterra_domain::ProtagonistId::new(),
                DelayedConsequence::event("Security review", "Investigation launched", "72 hours"),
                t(),
            ))
            .await;
        assert!(first.save.execute().await);

        let second = harness(blobs, t() + Duration::seconds(1));
        let outcome = second.load.execute().await;
        assert_eq!(outcome.triggered.len(), 1);
        assert!(second.queue.is_empty().await);
    }

    #[tokio::test]
    async fn malformed_blob_loads_fresh_defaults() {
        let mut blobs = MockSaveStore::new();
        blobs
            .expect_load()
            .returning(|| Ok(Some("{not json".to_string())));
        let h = harness(Arc::new(blobs), t());

        let outcome = h.load.execute().await;
        assert!(!outcome.restored);
        assert_eq!(outcome.saved_at, t());
        assert!(h.store.protagonists().is_empty());
        assert_eq!(h.store.current_chapter().await, 1);
        assert_eq!(h.store.world().await, WorldState::default());
    }

    #[tokio::test]
    async fn failed_save_reports_false() {
        let mut blobs = MockSaveStore::new();
        blobs
            .expect_save()
            .returning(|_| Err(RepoError::database("save_store", "disk full")));
        let h = harness(Arc::new(blobs), t());
        h.store.insert_protagonist(Protagonist::new("Aria", t()));

        assert!(!h.save.execute().await);
        assert_eq!(h.store.protagonists().len(), 1);
    }

    /// Holds the first write until released, recording every blob it stores.
    struct SlowFirstSave {
        writes: std::sync::Mutex<Vec<String>>,
        held: AtomicBool,
        first_entered: Notify,
        release_first: Notify,
    }

    #[async_trait]
    impl SaveStore for SlowFirstSave {
        async fn save(&self, blob: &str) -> Result<(), RepoError> {
            if !self.held.swap(true, Ordering::SeqCst) {
                self.first_entered.notify_one();
                self.release_first.notified().await;
            }
            self.writes.lock().unwrap().push(blob.to_string());
            Ok(())
        }

        async fn load(&self) -> Result<Option<String>, RepoError> {
            Ok(self.writes.lock().unwrap().last().cloned())
        }
    }

    #[tokio::test]
    async fn later_checkpoint_is_never_overwritten_by_an_earlier_one() {
        let blobs = Arc::new(SlowFirstSave {
            writes: std::sync::Mutex::new(Vec::new()),
            held: AtomicBool::new(false),
            first_entered: Notify::new(),
            release_first: Notify::new(),
        });
        let h = Arc::new(harness(blobs.clone(), t()));
        let aria = Protagonist::new("Aria", t());
        let aria_id = aria.id;
        h.store.insert_protagonist(aria);

        let first = {
            let h = h.clone();
            tokio::spawn(async move { h.save.execute().await })
        };
        blobs.first_entered.notified().await;

        let mut bram = Protagonist::new("Bram", t());
        bram.establish_background(BackgroundCategory::Methodical);
        let bram_id = bram.id;
        h.store.insert_protagonist(bram);
        let second = {
            let h = h.clone();
            tokio::spawn(async move { h.save.execute().await })
        };
        tokio::task::yield_now().await;

        blobs.release_first.notify_one();
        assert!(first.await.unwrap());
        assert!(second.await.unwrap());

        let fresh = harness(blobs.clone(), t());
        assert!(fresh.load.execute().await.restored);
        assert!(fresh.store.contains(aria_id));
        let bram = fresh.store.protagonist(bram_id).unwrap();
        assert_eq!(bram.background, Some(BackgroundCategory::Methodical));
        assert_eq!(blobs.writes.lock().unwrap().len(), 2);
    }
}
