//! Per-seller reputation cache with a fixed time-to-live.
//!
//! Owned by the composition root and shared by clone. Entries are replaced
//! whole under the write lock, so readers never observe a partial score.
//! Expired entries are never served.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::types::ReputationScore;

#[derive(Debug, Clone)]
struct CachedScore {
    score: ReputationScore,
    stored_at: Instant,
}

impl CachedScore {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

#[derive(Debug, Clone)]
pub struct ReputationCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CachedScore>>>,
}

impl ReputationCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh score for `seller_key`, if one is cached.
    pub async fn get(&self, seller_key: &str) -> Option<ReputationScore> {
        self.get_at(seller_key, Instant::now()).await
    }

    pub async fn get_at(&self, seller_key: &str, now: Instant) -> Option<ReputationScore> {
        let entries = self.entries.read().await;
        let cached = entries.get(seller_key)?;
        if cached.is_fresh(self.ttl, now) {
            tracing::debug!(seller_key, "reputation cache hit");
            Some(cached.score.clone())
        } else {
            tracing::debug!(seller_key, "reputation cache entry expired");
            None
        }
    }

    pub async fn insert(&self, seller_key: &str, score: ReputationScore) {
        self.insert_at(seller_key, score, Instant::now()).await;
    }

    /// Stores `score`, replacing any previous entry, and drops expired ones.
    pub async fn insert_at(&self, seller_key: &str, score: ReputationScore, now: Instant) {
        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, cached| cached.is_fresh(ttl, now));
        entries.insert(
            seller_key.to_string(),
            CachedScore {
                score,
                stored_at: now,
            },
        );
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
