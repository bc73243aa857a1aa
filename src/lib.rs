//! A bounded, thread-safe key-value store fronted by an LRU shadow cache.
//!
//! This crate is built from three pieces:
//!
//! 1. [`PrimaryStore`] - the authoritative mapping, bounded by a fixed capacity
//! 2. [`ShadowCache`] - a smaller, recency-ordered mirror of the hottest entries
//! 3. [`Storage`] - the thread-safe façade that keeps both coherent
//!
//! # Features
//!
//! - Thread-safe: the store sits behind a readers-writer lock, the cache behind a mutex
//! - Deadlock-free: the two locks are never held together
//! - O(1) promotion and eviction in the shadow cache
//! - Strict capacity enforcement, no silent eviction from the primary store
//! - Operation counters via [`Storage::metrics`]
//! - C ABI for `String` keys and values
//!
//! # Examples
//!
//! ```rust
//! use shadow_store::{Storage, StorageError};
//!
//! // Room for 10 entries, the 3 most recently used are mirrored in the cache
//! let storage: Storage<u64, String> = Storage::new(10, 3).unwrap();
//! storage.store(42, "answer".to_string()).unwrap();
//! assert_eq!(storage.load(&42), Ok("answer".to_string()));
//! assert!(storage.is_cached(&42));
//!
//! assert_eq!(storage.load(&7), Err(StorageError::NotFound));
//! assert!(Storage::<u64, String>::new(3, 3).is_err());
//! ```

pub mod builder;
pub mod error;
mod ffi;
pub mod metrics;
pub mod primary_store;
pub mod shadow_cache;
mod stamps;
pub mod storage;

pub use builder::StorageBuilder;
pub use error::{Result, StorageError};
pub use metrics::StorageMetrics;
pub use primary_store::PrimaryStore;
pub use shadow_cache::ShadowCache;
pub use storage::Storage;
