use crate::error::Result;
use crate::storage::Storage;
use std::fmt::Debug;
use std::hash::Hash;

// Share of the primary capacity given to the shadow cache by default
const DEFAULT_CACHE_DIVISOR: usize = 10;

/// Builder for configuring a [`Storage`].
///
/// # Example
///
/// ```
/// use shadow_store::StorageBuilder;
///
/// let storage = StorageBuilder::new(1_000)
///     .cache_capacity(64)
///     .build::<String, String>()
///     .unwrap();
/// assert_eq!(storage.cache_capacity(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct StorageBuilder {
    capacity: usize,
    cache_capacity: Option<usize>,
}

impl StorageBuilder {
    /// Create a new builder for a store holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cache_capacity: None,
        }
    }

    /// Set the number of hot entries mirrored by the shadow cache.
    ///
    /// Must be positive and strictly smaller than the storage capacity.
    ///
    /// Default: a tenth of the storage capacity, at least 1
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Build the storage, validating the configured capacities.
    pub fn build<K, V>(self) -> Result<Storage<K, V>>
    where
        K: Clone + Debug + Hash + Eq,
        V: Clone,
    {
        let cache_capacity = self
            .cache_capacity
            .unwrap_or_else(|| (self.capacity / DEFAULT_CACHE_DIVISOR).max(1));
        Storage::new(self.capacity, cache_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn test_builder_default_cache_capacity() {
        let storage = StorageBuilder::new(100).build::<u32, u32>().unwrap();
        assert_eq!(storage.capacity(), 100);
        assert_eq!(storage.cache_capacity(), 10);

        let storage = StorageBuilder::new(5).build::<u32, u32>().unwrap();
        assert_eq!(storage.cache_capacity(), 1);
    }

    #[test]
    fn test_builder_full_config() {
        let storage = StorageBuilder::new(10)
            .cache_capacity(3)
            .build::<u32, u32>()
            .unwrap();
        assert!(storage.is_empty());
        assert_eq!(storage.cache_capacity(), 3);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        assert_eq!(
            StorageBuilder::new(1).build::<u32, u32>().err(),
            Some(StorageError::InvalidConfiguration {
                capacity: 1,
                cache_capacity: 1
            })
        );
        assert!(StorageBuilder::new(10)
            .cache_capacity(10)
            .build::<u32, u32>()
            .is_err());
    }
}
