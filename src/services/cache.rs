use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Errors that can occur with cache operations
///
/// These never leave the cache: every public operation logs them and degrades
/// to a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache lock poisoned")]
    Poisoned,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub const DEFAULT_MAX_ENTRIES: usize = 200;

/// Default TTL values per kind of answer
pub mod ttl {
    use std::time::Duration;

    pub const DEFAULT: Duration = Duration::from_secs(5 * 60);
    pub const NEARBY: Duration = Duration::from_secs(5 * 60);
    pub const AUTOCOMPLETE: Duration = Duration::from_secs(2 * 60);
    pub const GEOCODE: Duration = Duration::from_secs(30 * 60);
    pub const DETAILS: Duration = Duration::from_secs(60 * 60);
}

#[derive(Debug)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
    /// Insertion order; eviction drops the lowest sequence numbers first
    seq: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Default)]
struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    next_seq: u64,
}

impl CacheStore {
    /// Make room for one more entry
    ///
    /// Sweeps expired entries first; if the store is still full, drops the
    /// oldest half by insertion order (not by access recency).
    fn make_room(&mut self, max_entries: usize, now: Instant) {
        if self.entries.len() < max_entries {
            return;
        }

        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let swept = before - self.entries.len();

        if self.entries.len() >= max_entries {
            let mut by_age: Vec<(u64, String)> = self
                .entries
                .iter()
                .map(|(key, entry)| (entry.seq, key.clone()))
                .collect();
            by_age.sort_unstable_by_key(|(seq, _)| *seq);

            let drop_count = by_age.len() / 2;
            for (_, key) in by_age.into_iter().take(drop_count) {
                self.entries.remove(&key);
            }

            tracing::debug!(
                "Cache full: swept {} expired, evicted {} oldest entries",
                swept,
                drop_count
            );
        } else {
            tracing::debug!("Cache full: swept {} expired entries", swept);
        }
    }
}

/// Process-local, best-effort result cache with per-entry expiry
///
/// Created once at startup and shared through `Arc`. Values are stored as
/// JSON so any serializable payload can be cached. Nothing is persisted;
/// a restart starts empty.
pub struct ResultCache {
    store: Mutex<CacheStore>,
    default_ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    /// Create a new cache
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            store: Mutex::new(CacheStore::default()),
            default_ttl,
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get a value; expired entries are removed and reported as a miss
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match self.try_get(key) {
            Ok(Some(value)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Cache hit: {}", key);
                Some(value)
            }
            Ok(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Cache miss: {}", key);
                None
            }
            Err(e) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Cache read failed for {}, treating as miss: {}", key, e);
                None
            }
        }
    }

    /// Set a value with an explicit TTL
    pub fn set<T>(&self, key: &str, value: &T, ttl: Duration)
    where
        T: Serialize,
    {
        if let Err(e) = self.try_set(key, value, ttl) {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }
    }

    /// Set a value with the default TTL
    pub fn set_default<T>(&self, key: &str, value: &T)
    where
        T: Serialize,
    {
        self.set(key, value, self.default_ttl);
    }

    fn try_get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        let mut store = self.store.lock().map_err(|_| CacheError::Poisoned)?;
        let now = Instant::now();

        let value = match store.entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.is_expired(now) => None,
            Some(entry) => Some(entry.value.clone()),
        };

        let Some(value) = value else {
            store.entries.remove(key);
            return Ok(None);
        };
        drop(store);

        Ok(Some(serde_json::from_value(value)?))
    }

    fn try_set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let value = serde_json::to_value(value)?;
        let mut store = self.store.lock().map_err(|_| CacheError::Poisoned)?;
        let now = Instant::now();
        let expires_at = now + ttl;

        // Re-setting a key keeps its original insertion position
        if let Some(entry) = store.entries.get_mut(key) {
            entry.value = value;
            entry.expires_at = expires_at;
            tracing::trace!("Cache update: {}", key);
            return Ok(());
        }

        store.make_room(self.max_entries, now);

        let seq = store.next_seq;
        store.next_seq += 1;
        store.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at,
                seq,
            },
        );

        tracing::trace!("Cache set: {} (ttl {}s)", key, ttl.as_secs());
        Ok(())
    }

    /// Whether a live entry exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.get::<Value>(key).is_some()
    }

    /// Number of stored entries, expired ones included until swept
    pub fn len(&self) -> usize {
        self.store.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        match self.store.lock() {
            Ok(mut store) => store.entries.clear(),
            Err(e) => tracing::warn!("Cache clear failed: {}", e),
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        CacheStats {
            entries: self.len(),
            max_entries: self.max_entries,
            hits,
            misses,
            hit_rate: if lookups > 0 { hits as f64 / lookups as f64 } else { 0.0 },
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, ttl::DEFAULT)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for a nearby search
    ///
    /// Coordinates are rounded to 3 decimals (~100 m) and the radius to the
    /// nearest 100 m so near-duplicate queries share an entry.
    pub fn nearby(lat: f64, lng: f64, radius_m: u32) -> String {
        format!(
            "nearby:{}:{}:{}",
            round_coordinate(lat),
            round_coordinate(lng),
            round_radius(radius_m)
        )
    }

    pub fn details(place_id: &str) -> String {
        format!("details:{}", place_id)
    }

    pub fn geocode(address: &str) -> String {
        format!("geocode:{}", address.to_lowercase())
    }

    pub fn autocomplete(input: &str, types: &str) -> String {
        format!("autocomplete:{}:{}", input.to_lowercase(), types)
    }
}

#[inline]
fn round_coordinate(value: f64) -> f64 {
    // + 0.0 folds -0 into 0 so both sides of the equator/meridian share keys
    (value * 1000.0).round() / 1000.0 + 0.0
}

#[inline]
fn round_radius(radius_m: u32) -> u32 {
    ((radius_m as f64 / 100.0).round() as u32) * 100
}
