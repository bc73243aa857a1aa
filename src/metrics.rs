//! Storage counters and their snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of a [`Storage`](crate::Storage)'s activity.
///
/// # Example
///
/// ```
/// use shadow_store::Storage;
///
/// let storage: Storage<u32, u32> = Storage::new(10, 2).unwrap();
/// storage.store(1, 1).unwrap();
/// storage.load(&1).unwrap();
///
/// let metrics = storage.metrics();
/// assert_eq!(metrics.cache_hits, 1);
/// println!("Hit rate: {:.2}%", metrics.hit_rate() * 100.0);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageMetrics {
    /// Loads served straight from the shadow cache.
    pub cache_hits: u64,
    /// Loads that had to fall through to the primary store.
    pub cache_misses: u64,
    /// Stores that created a new key.
    pub inserts: u64,
    /// Stores that overwrote an existing key.
    pub updates: u64,
    /// Successful removals.
    pub removals: u64,
    /// Entries pushed out of the shadow cache to make room.
    pub evictions: u64,
    /// Stores refused because the primary store was full.
    pub rejected_writes: u64,
    /// Current number of keys in the primary store.
    pub entry_count: usize,
    /// Current number of keys mirrored in the shadow cache.
    pub cached_count: usize,
    pub capacity: usize,
    pub cache_capacity: usize,
}

impl StorageMetrics {
    /// Fraction of loads answered by the shadow cache, between 0.0 and 1.0.
    ///
    /// Returns 0.0 if nothing has been loaded yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    /// Fraction of the primary store's capacity in use.
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.entry_count as f64 / self.capacity as f64
        }
    }

    pub fn total_loads(&self) -> u64 {
        self.cache_hits + self.cache_misses
    }

    pub fn total_writes(&self) -> u64 {
        self.inserts + self.updates
    }
}

// Lock-free counters bumped outside the critical sections
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) cache_hits: AtomicU64,
    pub(crate) cache_misses: AtomicU64,
    pub(crate) inserts: AtomicU64,
    pub(crate) updates: AtomicU64,
    pub(crate) removals: AtomicU64,
    pub(crate) evictions: AtomicU64,
    pub(crate) rejected_writes: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StorageMetrics {
        StorageMetrics {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            rejected_writes: self.rejected_writes.load(Ordering::Relaxed),
            ..StorageMetrics::default()
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [
            &self.cache_hits,
            &self.cache_misses,
            &self.inserts,
            &self.updates,
            &self.removals,
            &self.evictions,
            &self.rejected_writes,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
