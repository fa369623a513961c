//! Short-lived in-memory cache of upstream response bodies, keyed by URL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CachedBody {
    body: String,
    expires_at: Instant,
}

/// Thread-safe TTL cache. A zero TTL disables it.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CachedBody>>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_disabled(&self) -> bool {
        self.ttl.is_zero()
    }

    /// Returns the cached body for `key` if present and not yet expired.
    pub async fn get(&self, key: &str) -> Option<String> {
        if self.is_disabled() {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.body.clone())
    }

    pub async fn put(&self, key: impl Into<String>, body: impl Into<String>) {
        if self.is_disabled() {
            return;
        }
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.into(),
            CachedBody {
                body: body.into(),
                expires_at: now + self.ttl,
            },
        );
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, expired ones included until the next write.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
