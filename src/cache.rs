//! Process-wide series cache with time-to-live.
//!
//! The fetcher consults a [`SeriesCache`] before touching the network. [`TtlCache`]
//! is the production cache; [`NoCache`] disables caching. Time comes from a
//! [`Clock`] so expiry can be tested without sleeping.

use crate::models::{Series, SeriesKey};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Lookup/store of fetched series.
pub trait SeriesCache: Send + Sync {
    /// A live (unexpired) entry for `key`.
    fn get(&self, key: &SeriesKey) -> Option<Series>;
    fn put(&self, key: SeriesKey, series: Series);
}

/// Caches nothing; every fetch goes to the transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl SeriesCache for NoCache {
    fn get(&self, _key: &SeriesKey) -> Option<Series> {
        None
    }

    fn put(&self, _key: SeriesKey, _series: Series) {}
}

struct CacheEntry {
    series: Series,
    fetched_at: DateTime<Utc>,
}

/// Map of key → (series, fetch time). Entries older than the TTL are treated as
/// absent and dropped on lookup; there is no explicit invalidation.
pub struct TtlCache<C = SystemClock> {
    ttl: TimeDelta,
    clock: C,
    entries: Mutex<HashMap<SeriesKey, CacheEntry>>,
}

impl TtlCache<SystemClock> {
    pub fn new(ttl: TimeDelta) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<C: Clock> TtlCache<C> {
    pub fn with_clock(ttl: TimeDelta, clock: C) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored entries, expired ones included until they are looked up.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: Clock> SeriesCache for TtlCache<C> {
    fn get(&self, key: &SeriesKey) -> Option<Series> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(e) if now - e.fetched_at < self.ttl => Some(e.series.clone()),
            Some(_) => {
                log::debug!("cache entry for {key} expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: SeriesKey, series: Series) {
        let fetched_at = self.clock.now();
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, CacheEntry { series, fetched_at });
    }
}

impl<C> std::fmt::Debug for TtlCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataPoint;
    use std::sync::Arc;

    fn series() -> Series {
        Series::new(SeriesKey::new("IN", "X"), vec![DataPoint::new(2020, 1.0)])
    }

    #[test]
    fn entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = TtlCache::with_clock(TimeDelta::hours(24), clock.clone());
        let key = SeriesKey::new("IN", "X");
        cache.put(key.clone(), series());

        clock.advance(TimeDelta::hours(23));
        assert!(cache.get(&key).is_some());

        clock.advance(TimeDelta::hours(1));
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn no_cache_never_hits() {
        let key = SeriesKey::new("IN", "X");
        NoCache.put(key.clone(), series());
        assert!(NoCache.get(&key).is_none());
    }
}
