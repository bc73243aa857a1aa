use crate::builder::StorageBuilder;
use crate::error::{Result, StorageError};
use crate::metrics::{Counters, StorageMetrics};
use crate::primary_store::PrimaryStore;
use crate::shadow_cache::ShadowCache;
use crate::stamps::WriteStamps;
use parking_lot::{Mutex, RwLock};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

/// A bounded, thread-safe key-value store fronted by an LRU shadow cache.
///
/// The [`PrimaryStore`] is authoritative and guarded by a readers-writer lock.
/// The smaller [`ShadowCache`] mirrors recently touched entries behind its own
/// mutex, so hot keys are served without touching the primary lock at all.
///
/// # Locking
///
/// The two locks are never held at the same time. Every operation runs its
/// cache step as a short critical section, releases the cache lock, and only
/// then takes the primary lock, followed by another cache step where needed.
/// This rules out deadlocks, at the price of a short window in which another
/// thread may see the cache and the primary store disagree about a key that
/// is concurrently being written or removed.
///
/// The window is closed before the writing call returns. Each primary write
/// bumps a write stamp for its key, and a value is mirrored into the cache
/// only if that stamp is unchanged when the cache lock is taken; a stale copy
/// is dropped from the cache instead. A delete is followed by a second cache
/// removal. Once every operation on a key has returned, the key is either
/// absent from the cache or mirrors the primary store's value.
///
/// # Type Parameters
///
/// * `K` - The type of keys. Must implement `Clone + Debug + Hash + Eq`
/// * `V` - The type of values. Must implement `Clone`
///
/// # Examples
///
/// ```rust
/// use shadow_store::{Storage, StorageError};
///
/// let storage = Storage::new(2, 1).unwrap();
/// storage.store("cat".to_string(), "meow".to_string()).unwrap();
/// storage.store("dog".to_string(), "wof".to_string()).unwrap();
/// assert_eq!(
///     storage.store("bird".to_string(), "ur".to_string()),
///     Err(StorageError::CapacityExceeded { capacity: 2 })
/// );
///
/// assert_eq!(storage.load(&"cat".to_string()), Ok("meow".to_string()));
/// assert_eq!(storage.remove(&"cat".to_string()), Ok("meow".to_string()));
/// assert!(!storage.contains(&"cat".to_string()));
/// ```
pub struct Storage<K, V> {
    primary: RwLock<PrimaryStore<K, V>>,
    cache: Mutex<ShadowCache<K, V>>,
    stamps: WriteStamps,
    counters: Counters,
}

impl<K, V> Storage<K, V>
where
    K: Clone + Debug + Hash + Eq,
    V: Clone,
{
    /// Creates an empty storage.
    ///
    /// Fails with [`StorageError::InvalidConfiguration`] unless
    /// `0 < cache_capacity < capacity`.
    pub fn new(capacity: usize, cache_capacity: usize) -> Result<Self> {
        if cache_capacity == 0 || cache_capacity >= capacity {
            return Err(StorageError::InvalidConfiguration {
                capacity,
                cache_capacity,
            });
        }

        debug!(capacity, cache_capacity, "creating storage");
        Ok(Self {
            primary: RwLock::new(PrimaryStore::new(capacity)),
            cache: Mutex::new(ShadowCache::new(cache_capacity)),
            stamps: WriteStamps::new(),
            counters: Counters::default(),
        })
    }

    /// Returns a [`StorageBuilder`] for a store of `capacity` keys.
    pub fn builder(capacity: usize) -> StorageBuilder {
        StorageBuilder::new(capacity)
    }

    /// Stores `value` under `key`, inserting or overwriting.
    ///
    /// A key that is already cached has its mirrored value refreshed first.
    /// The write then goes through to the primary store, which rejects a new
    /// key with [`StorageError::CapacityExceeded`] when full; in that case the
    /// key is not added to the cache, and a refreshed mirror is dropped again.
    /// On success the key becomes the most recently used cache entry,
    /// possibly evicting the least recent one.
    pub fn store(&self, key: K, value: V) -> Result<()> {
        let refreshed = {
            let mut cache = self.cache.lock();
            let cached = cache.contains(&key);
            if cached {
                cache.touch_or_insert(key.clone(), value.clone());
            }
            cached
        };

        let written = {
            let mut primary = self.primary.write();
            primary
                .put(key.clone(), value.clone())
                .map(|previous| (previous, self.stamps.bump(&key)))
        };
        let stamp = match written {
            Ok((Some(_), stamp)) => {
                Counters::bump(&self.counters.updates);
                stamp
            }
            Ok((None, stamp)) => {
                Counters::bump(&self.counters.inserts);
                stamp
            }
            Err(err) => {
                Counters::bump(&self.counters.rejected_writes);
                debug!(?key, %err, "store rejected");
                if refreshed {
                    // Only reachable when a concurrent remove won the race
                    self.cache.lock().remove(&key);
                }
                return Err(err);
            }
        };

        self.promote(key, value, stamp);
        Ok(())
    }

    /// Returns the value stored under `key`.
    ///
    /// A cache hit never touches the primary store. On a miss the value is
    /// read from the primary store and promoted into the cache, unless the key
    /// was written again in the meantime.
    pub fn load(&self, key: &K) -> Result<V> {
        let cached = self.cache.lock().peek_and_promote(key);
        if let Some(value) = cached {
            Counters::bump(&self.counters.cache_hits);
            return Ok(value);
        }
        Counters::bump(&self.counters.cache_misses);

        let (value, stamp) = {
            let primary = self.primary.read();
            let value = primary.get(key)?.clone();
            (value, self.stamps.current(key))
        };
        self.promote(key.clone(), value.clone(), stamp);
        Ok(value)
    }

    /// Removes `key` from both structures and returns its value.
    ///
    /// Fails with [`StorageError::NotFound`] only if neither the cache nor the
    /// primary store held the key.
    pub fn remove(&self, key: &K) -> Result<V> {
        let cached = self.cache.lock().remove(key);
        let stored = {
            let mut primary = self.primary.write();
            let stored = primary.delete(key);
            if stored.is_ok() {
                self.stamps.bump(key);
            }
            stored
        };
        // Drop any copy promoted while the delete was pending
        self.cache.lock().remove(key);

        let removed = match (cached, stored) {
            (Some(value), _) | (None, Ok(value)) => value,
            (None, Err(err)) => return Err(err),
        };
        Counters::bump(&self.counters.removals);
        Ok(removed)
    }

    /// Returns true if `key` is in the cache or the primary store.
    ///
    /// Never promotes, so probing does not influence eviction order.
    pub fn contains(&self, key: &K) -> bool {
        if self.cache.lock().contains(key) {
            return true;
        }
        self.primary.read().has(key)
    }

    /// Returns true if `key` is currently mirrored by the shadow cache.
    ///
    /// Like [`contains`](Self::contains), this does not promote.
    pub fn is_cached(&self, key: &K) -> bool {
        self.cache.lock().contains(key)
    }

    /// Snapshot of the cached keys, most recently used first.
    pub fn cached_keys(&self) -> Vec<K> {
        self.cache.lock().iter().map(|(key, _)| key.clone()).collect()
    }

    /// Number of keys in the primary store.
    pub fn len(&self) -> usize {
        self.primary.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.read().is_empty()
    }

    /// Number of keys currently mirrored by the shadow cache.
    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.primary.read().capacity()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.lock().capacity()
    }

    /// Removes every entry, cache first, and resets the counters.
    pub fn clear(&self) {
        self.cache.lock().clear();
        {
            let mut primary = self.primary.write();
            primary.clear();
            self.stamps.bump_all();
        }
        self.cache.lock().clear();
        self.counters.reset();
        debug!("storage cleared");
    }

    /// Returns a snapshot of the storage counters and occupancy.
    pub fn metrics(&self) -> StorageMetrics {
        let (cached_count, cache_capacity) = {
            let cache = self.cache.lock();
            (cache.len(), cache.capacity())
        };
        let (entry_count, capacity) = {
            let primary = self.primary.read();
            (primary.len(), primary.capacity())
        };
        StorageMetrics {
            entry_count,
            cached_count,
            capacity,
            cache_capacity,
            ..self.counters.snapshot()
        }
    }

    // Make `key` the most recently used cache entry, provided `value` is still
    // what the primary store held at `stamp`
    fn promote(&self, key: K, value: V, stamp: u64) {
        let evicted = {
            let mut cache = self.cache.lock();
            if self.stamps.current(&key) != stamp {
                trace!(?key, "stale promotion dropped");
                cache.remove(&key);
                return;
            }
            cache.touch_or_insert(key, value)
        };
        if let Some((victim, _)) = evicted {
            Counters::bump(&self.counters.evictions);
            trace!(?victim, "evicted from shadow cache");
        }
    }
}
