//! TTL-bounded response cache.
//!
//! One cache is kept per model lane. Keys are derived from the normalized
//! prompt so that `"A Cat "` and `"a cat"` share an entry.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Key of a cached generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a prompt: trimmed, lowercased, then base64-encoded.
    ///
    /// ```
    /// use integrations_gemini_media::cache::CacheKey;
    ///
    /// assert_eq!(CacheKey::for_prompt("  A Cat "), CacheKey::for_prompt("a cat"));
    /// ```
    pub fn for_prompt(prompt: &str) -> Self {
        let normalized = prompt.trim().to_lowercase();
        Self(STANDARD.encode(normalized.as_bytes()))
    }

    /// Appends a discriminator such as a locale or a reference digest.
    pub fn with_discriminator(mut self, discriminator: &str) -> Self {
        self.0.push('|');
        self.0.push_str(discriminator);
        self
    }

    /// The encoded key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cached payload with its insertion time.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

impl<V> CacheEntry<V> {
    /// The cached value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// When the entry was stored.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) < ttl
    }
}

/// Cache of generation results with a fixed time-to-live.
///
/// Every `put` sweeps all expired entries while holding the same lock, so no
/// reader ever observes an insertion without its housekeeping.
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry<V>>>,
    changes: watch::Sender<Vec<CacheKey>>,
}

impl<V: Clone> ResponseCache<V> {
    /// Creates an empty cache.
    pub fn new(ttl: Duration) -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            changes,
        }
    }

    /// Returns a clone of the cached value, evicting it if it has expired.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_fresh(now, self.ttl) => {
                tracing::debug!(key = %key, "Cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                tracing::debug!(key = %key, "Cache entry expired");
                self.publish(&entries);
                None
            }
            None => {
                tracing::debug!(key = %key, "Cache miss");
                None
            }
        }
    }

    /// Stores `value`, replacing any previous entry, then drops every expired entry.
    pub fn put(&self, key: CacheKey, value: V) {
        let now = Instant::now();
        let mut entries = self.lock();

        entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
            },
        );

        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.is_fresh(now, ttl));
        let swept = before - entries.len();
        if swept > 0 {
            tracing::debug!(swept, remaining = entries.len(), "Swept expired cache entries");
        }

        self.publish(&entries);
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        self.publish(&entries);
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Subscribes to the sorted set of stored keys, updated on every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<CacheKey>> {
        self.changes.subscribe()
    }

    fn publish(&self, entries: &HashMap<CacheKey, CacheEntry<V>>) {
        let mut keys: Vec<CacheKey> = entries.keys().cloned().collect();
        keys.sort();
        self.changes.send_replace(keys);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("len", &self.entries.lock().map(|e| e.len()).unwrap_or_default())
            .finish()
    }
}
