//! Cache statistics
//!
//! Lightweight atomic counters recorded on every operation. Counters use
//! relaxed ordering — they are monotonic tallies for monitoring, not
//! synchronization points, and a snapshot taken during concurrent activity
//! is a consistent-enough view for that purpose.

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe operation counters, owned by the cache.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    updates: AtomicU64,
    registrations: AtomicU64,
    purged: AtomicU64,
}

impl StatsRecorder {
    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_insertion(&self) {
        self.insertions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_purged(&self, count: u64) {
        self.purged.fetch_add(count, Ordering::Relaxed);
    }

    /// Point-in-time snapshot of all counters.
    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            registrations: self.registrations.load(Ordering::Relaxed),
            purged: self.purged.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of cache statistics.
///
/// Cheaply copyable; taken via
/// [`ClassMetaCache::stats`](crate::ClassMetaCache::stats).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found a cached value.
    pub hits: u64,
    /// Lookups that found nothing, including lookups under an unregistered
    /// namespace context.
    pub misses: u64,
    /// Writes that stored a value under a previously absent name.
    pub insertions: u64,
    /// Writes that overwrote a previously stored value.
    pub updates: u64,
    /// Namespace contexts durably registered (outer-index publications).
    pub registrations: u64,
    /// Dead context slots dropped during snapshot rebuilds.
    pub purged: u64,
}

impl CacheStats {
    /// Total lookups (hits plus misses).
    #[must_use]
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate as a percentage (0.0 to 100.0). Zero when no lookups have
    /// been recorded.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}
