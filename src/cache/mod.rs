//! Report Cache
//!
//! Time-bounded memoization of rendered weather reports, keyed by lookup
//! parameters and split into two namespaces so current-conditions and
//! forecast keys never collide. Entries expire lazily at read time; nothing
//! is ever deleted, a fresh write simply replaces whatever was there.
//!
//! The cache is constructed once at startup and handed to every handler by
//! reference, never held as global state.


use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

/// How long a cached report stays valid after it is written.
pub const CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// The two report kinds cached independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Current,
    Forecast,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    text: String,
    stored_at: Instant,
}

/// Per-namespace, time-bounded store of rendered report text.
#[derive(Debug)]
pub struct ReportCache {
    ttl: Duration,
    current: RwLock<HashMap<String, CacheEntry>>,
    forecast: RwLock<HashMap<String, CacheEntry>>,
}

impl ReportCache {
    #[inline]
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    /// A cache with a non-default expiry window. Tests use this to force
    /// expiry without sleeping.
    #[inline]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            current: RwLock::new(HashMap::new()),
            forecast: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a report. An entry older than the expiry window is treated as
    /// absent; it stays in the map until a later `set` replaces it.
    #[inline]
    pub async fn get(&self, namespace: Namespace, key: &str) -> Option<String> {
        let entries = self.entries(namespace).read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.text.clone())
    }

    /// Store a report, unconditionally replacing any prior entry for the key.
    #[inline]
    pub async fn set(&self, namespace: Namespace, key: &str, text: String) {
        debug!(?namespace, key, "caching report");
        let mut entries = self.entries(namespace).write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                text,
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of entries held in a namespace, expired entries included.
    #[inline]
    pub async fn entry_count(&self, namespace: Namespace) -> usize {
        self.entries(namespace).read().await.len()
    }

    fn entries(&self, namespace: Namespace) -> &RwLock<HashMap<String, CacheEntry>> {
        match namespace {
            Namespace::Current => &self.current,
            Namespace::Forecast => &self.forecast,
        }
    }
}

impl Default for ReportCache {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Cache key for a current-conditions lookup by place name.
#[inline]
pub fn city_key(city: &str) -> String {
    city.trim().to_lowercase()
}

/// Cache key for a forecast lookup: the place name plus the day count, so
/// different day counts for the same place are distinct entries.
#[inline]
pub fn forecast_key(city: &str, days: u8) -> String {
    format!("{}:{days}", city_key(city))
}
