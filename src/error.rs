//! Error types for the shadow store.

use thiserror::Error;

/// Result type alias using [`StorageError`].
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors surfaced by [`Storage`](crate::Storage) and its building blocks.
///
/// None of these are retried internally; the caller decides what to do next.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The requested capacities cannot form a valid store. Both must be
    /// positive and the cache must be strictly smaller than the store.
    #[error(
        "invalid configuration: cache capacity {cache_capacity} must be positive \
         and smaller than storage capacity {capacity}"
    )]
    InvalidConfiguration {
        capacity: usize,
        cache_capacity: usize,
    },

    /// A brand-new key was written while the primary store was full.
    #[error("storage is full: capacity of {capacity} entries reached")]
    CapacityExceeded { capacity: usize },

    /// The key is not present in the cache nor in the primary store.
    #[error("key not found")]
    NotFound,
}
