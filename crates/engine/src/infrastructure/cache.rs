//! TTL cache for generated text.
//!
//! Keys are a SHA-256 digest of the full request (kind, system prompt and
//! prompt). Prompts embed the protagonist's context, so two characters whose
//! requests differ never share an entry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{GenerationKind, GenerationRequest};

pub struct ResponseCache {
    entries: RwLock<HashMap<String, CachedResponse>>,
    ttl: Duration,
}

struct CachedResponse {
    text: String,
    inserted_at: Instant,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Content-derived key for a request.
    pub fn key_for(request: &GenerationRequest) -> String {
        let mut hasher = Sha256::new();
        hasher.update(match request.kind {
            GenerationKind::Consequences => b"consequences".as_slice(),
            GenerationKind::Dialogue => b"dialogue".as_slice(),
        });
        hasher.update([0u8]);
        hasher.update(request.system_prompt.as_bytes());
        hasher.update([0u8]);
        hasher.update(request.prompt.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub async fn insert(&self, key: String, text: String) {
        let entry = CachedResponse {
            text,
            inserted_at: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    #[cfg(test)]
    async fn insert_at(&self, key: String, text: String, inserted_at: Instant) {
        let entry = CachedResponse { text, inserted_at };
        self.entries.write().await.insert(key, entry);
    }

    /// Cached text, if present and not expired.
    pub async fn get(&self, key: &str) -> Option<String> {
        let guard = self.entries.read().await;
        guard
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.text.clone())
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut guard = self.entries.write().await;
        let before = guard.len();
        guard.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
