use proptest::prelude::*;
use shadow_store::{Storage, StorageError};
use std::collections::HashMap;

const CAPACITY: usize = 8;
const CACHE_CAPACITY: usize = 3;

#[derive(Clone, Debug)]
enum Op {
    Store(u8, u32),
    Load(u8),
    Remove(u8),
    Contains(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..16, any::<u32>()).prop_map(|(k, v)| Op::Store(k, v)),
        (0u8..16).prop_map(Op::Load),
        (0u8..16).prop_map(Op::Remove),
        (0u8..16).prop_map(Op::Contains),
    ]
}

// Single-threaded reference: a plain map plus a most-recent-first key list
#[derive(Default)]
struct Model {
    primary: HashMap<u8, u32>,
    recency: Vec<u8>,
}

impl Model {
    fn promote(&mut self, key: u8) {
        self.recency.retain(|k| *k != key);
        self.recency.insert(0, key);
        self.recency.truncate(CACHE_CAPACITY);
    }

    fn store(&mut self, key: u8, value: u32) -> Result<(), StorageError> {
        if !self.primary.contains_key(&key) && self.primary.len() >= CAPACITY {
            return Err(StorageError::CapacityExceeded { capacity: CAPACITY });
        }
        self.primary.insert(key, value);
        self.promote(key);
        Ok(())
    }

    fn load(&mut self, key: u8) -> Result<u32, StorageError> {
        let value = *self.primary.get(&key).ok_or(StorageError::NotFound)?;
        self.promote(key);
        Ok(value)
    }

    fn remove(&mut self, key: u8) -> Result<u32, StorageError> {
        self.recency.retain(|k| *k != key);
        self.primary.remove(&key).ok_or(StorageError::NotFound)
    }
}

proptest! {
    #[test]
    fn test_matches_reference_model(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let storage = Storage::new(CAPACITY, CACHE_CAPACITY).unwrap();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Store(k, v) => prop_assert_eq!(storage.store(k, v), model.store(k, v)),
                Op::Load(k) => prop_assert_eq!(storage.load(&k), model.load(k)),
                Op::Remove(k) => prop_assert_eq!(storage.remove(&k), model.remove(k)),
                Op::Contains(k) => {
                    prop_assert_eq!(storage.contains(&k), model.primary.contains_key(&k))
                }
            }

            prop_assert!(storage.len() <= CAPACITY);
            prop_assert!(storage.cache_len() <= CACHE_CAPACITY);
            prop_assert_eq!(storage.len(), model.primary.len());
            prop_assert_eq!(storage.cached_keys(), model.recency.clone());
        }
    }

    #[test]
    fn test_cached_entries_mirror_primary(
        ops in prop::collection::vec(op_strategy(), 1..100)
    ) {
        let storage = Storage::new(CAPACITY, CACHE_CAPACITY).unwrap();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Store(k, v) => { let _ = storage.store(k, v); let _ = model.store(k, v); }
                Op::Load(k) => { let _ = storage.load(&k); let _ = model.load(k); }
                Op::Remove(k) => { let _ = storage.remove(&k); let _ = model.remove(k); }
                Op::Contains(k) => { storage.contains(&k); }
            }
        }

        // Loading a cached key is a hit, so the order is unaffected
        for key in storage.cached_keys() {
            prop_assert!(storage.contains(&key));
            prop_assert_eq!(storage.load(&key), Ok(model.primary[&key]));
        }
    }

    #[test]
    fn test_round_trip(key in any::<u16>(), value in any::<u64>()) {
        let storage = Storage::new(4, 2).unwrap();

        storage.store(key, value).unwrap();
        prop_assert_eq!(storage.load(&key), Ok(value));
        prop_assert_eq!(storage.remove(&key), Ok(value));
        prop_assert!(!storage.contains(&key));
    }

    #[test]
    fn test_construction_validity(capacity in 0usize..64, cache_capacity in 0usize..64) {
        let result = Storage::<u8, u8>::new(capacity, cache_capacity);
        let valid = cache_capacity > 0 && cache_capacity < capacity;
        prop_assert_eq!(result.is_ok(), valid);
        if !valid {
            prop_assert_eq!(
                result.err(),
                Some(StorageError::InvalidConfiguration { capacity, cache_capacity })
            );
        }
    }
}
