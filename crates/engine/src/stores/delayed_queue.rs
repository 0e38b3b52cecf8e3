//! Process-wide FIFO of delayed consequences.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use std::collections::VecDeque;

use solterra_domain::QueuedConsequence;

#[derive(Default)]
pub struct DelayedQueue {
    entries: Mutex<VecDeque<QueuedConsequence>>,
}

impl DelayedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enqueue(&self, entry: QueuedConsequence) {
        self.entries.lock().await.push_back(entry);
    }

    /// Remove and return every entry due at `now`, in insertion order.
    ///
    /// Entries that are not yet due keep their relative order.
    pub async fn take_due(&self, now: DateTime<Utc>) -> Vec<QueuedConsequence> {
        let mut guard = self.entries.lock().await;
        let (due, waiting): (VecDeque<_>, VecDeque<_>) =
            guard.drain(..).partition(|entry| entry.is_due(now));
        *guard = waiting;
        due.into()
    }

    pub async fn snapshot(&self) -> Vec<QueuedConsequence> {
        self.entries.lock().await.iter().cloned().collect()
    }

    pub async fn restore(&self, entries: Vec<QueuedConsequence>) {
        *self.entries.lock().await = entries.into();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
