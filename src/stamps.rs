use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

// Number of stamp stripes, must be a power of 2
const STRIPES: usize = 64;

/// Striped write counters for the primary store.
///
/// Every successful write or delete of a key bumps the stripe the key hashes
/// to, while the primary store's write lock is held. A value read under the
/// primary lock together with its stamp may be mirrored into the cache only if
/// the stamp is unchanged once the cache lock is taken; otherwise a newer
/// write may already have reached the cache, and the stale copy is dropped.
#[derive(Debug)]
pub(crate) struct WriteStamps {
    stripes: Box<[AtomicU64]>,
}

impl WriteStamps {
    pub(crate) fn new() -> Self {
        Self {
            stripes: (0..STRIPES).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    // Internal method to determine which stripe a key belongs to
    fn stripe_index<K: Hash>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) & (STRIPES - 1)
    }

    /// Records a write of `key` and returns the new stamp.
    pub(crate) fn bump<K: Hash>(&self, key: &K) -> u64 {
        self.stripes[self.stripe_index(key)].fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn bump_all(&self) {
        for stripe in self.stripes.iter() {
            stripe.fetch_add(1, Ordering::AcqRel);
        }
    }

    pub(crate) fn current<K: Hash>(&self, key: &K) -> u64 {
        self.stripes[self.stripe_index(key)].load(Ordering::Acquire)
    }
}
