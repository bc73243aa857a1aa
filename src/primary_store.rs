use crate::error::{Result, StorageError};
use std::collections::HashMap;
use std::hash::Hash;
use std::mem;

/// The authoritative, bounded key-value mapping.
///
/// `PrimaryStore` is a plain dictionary with a hard upper bound on the number
/// of distinct keys. It never evicts: once full, writes of new keys are
/// rejected with [`StorageError::CapacityExceeded`] while overwrites of
/// existing keys keep succeeding.
///
/// The store itself is not synchronized; [`Storage`](crate::Storage) guards it
/// with a readers-writer lock.
///
/// # Examples
///
/// ```rust
/// use shadow_store::{PrimaryStore, StorageError};
///
/// let mut store = PrimaryStore::new(1);
/// store.put("a", 1).unwrap();
/// assert_eq!(store.put("b", 2), Err(StorageError::CapacityExceeded { capacity: 1 }));
/// assert_eq!(store.put("a", 3), Ok(Some(1)));
/// ```
#[derive(Debug)]
pub struct PrimaryStore<K, V> {
    cap: usize,
    entries: HashMap<K, V>,
}

impl<K, V> PrimaryStore<K, V>
where
    K: Hash + Eq,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            cap: capacity,
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts or overwrites `key`.
    ///
    /// Returns the previous value when the key already existed. Overwrites
    /// never count against capacity.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>> {
        if let Some(slot) = self.entries.get_mut(&key) {
            return Ok(Some(mem::replace(slot, value)));
        }
        if self.entries.len() >= self.cap {
            return Err(StorageError::CapacityExceeded { capacity: self.cap });
        }
        self.entries.insert(key, value);
        Ok(None)
    }

    pub fn get(&self, key: &K) -> Result<&V> {
        self.entries.get(key).ok_or(StorageError::NotFound)
    }

    /// Removes `key` and returns the value it held.
    pub fn delete(&mut self, key: &K) -> Result<V> {
        self.entries.remove(key).ok_or(StorageError::NotFound)
    }

    pub fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
