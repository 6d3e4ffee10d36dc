//! Persisted set of favorited place identifiers.

use std::collections::BTreeSet;

use crate::storage::Storage;

/// Storage key holding the JSON array of favorite place IDs.
pub const FAVORITES_KEY: &str = "cafeFavorites";

/// How the favorites set was initialised at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesLoad {
    /// Nothing stored yet.
    Empty,
    Loaded(usize),
    /// Stored data could not be read or parsed; started from an empty set.
    Corrupt(String),
}

/// Favorites backed by durable storage.
///
/// Every toggle rewrites the whole set before returning. Storage failures are
/// logged and never surface to callers; the in-memory set stays authoritative
/// and the next successful write persists it in full.
pub struct FavoritesStore<S> {
    storage: S,
    ids: BTreeSet<String>,
    load: FavoritesLoad,
    last_write_failed: bool,
}

impl<S: Storage> FavoritesStore<S> {
    /// Loads the set from `storage`, treating missing or corrupt data as empty.
    pub fn open(storage: S) -> Self {
        let (ids, load) = match storage.get(FAVORITES_KEY) {
            Ok(None) => (BTreeSet::new(), FavoritesLoad::Empty),
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => {
                    let ids: BTreeSet<String> = list.into_iter().collect();
                    let n = ids.len();
                    (ids, FavoritesLoad::Loaded(n))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "favorites data is corrupt; starting empty");
                    (BTreeSet::new(), FavoritesLoad::Corrupt(e.to_string()))
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "favorites could not be read; starting empty");
                (BTreeSet::new(), FavoritesLoad::Corrupt(e.to_string()))
            }
        };
        Self {
            storage,
            ids,
            load,
            last_write_failed: false,
        }
    }

    #[must_use]
    pub fn load_status(&self) -> &FavoritesLoad {
        &self.load
    }

    #[must_use]
    pub fn contains(&self, place_id: &str) -> bool {
        self.ids.contains(place_id)
    }

    /// Flips membership of `place_id`, persists the full set and returns the
    /// new membership state.
    pub fn toggle(&mut self, place_id: &str) -> bool {
        let now_favorite = if self.ids.remove(place_id) {
            false
        } else {
            self.ids.insert(place_id.to_string());
            true
        };
        self.persist();
        now_favorite
    }

    #[must_use]
    pub fn all(&self) -> &BTreeSet<String> {
        &self.ids
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// `true` when the most recent write did not reach storage.
    #[must_use]
    pub fn last_write_failed(&self) -> bool {
        self.last_write_failed
    }

    fn persist(&mut self) {
        let list: Vec<&String> = self.ids.iter().collect();
        let result = serde_json::to_string(&list)
            .map_err(|source| crate::StorageError::Serialize {
                key: FAVORITES_KEY.to_string(),
                source,
            })
            .and_then(|json| self.storage.set(FAVORITES_KEY, &json));
        match result {
            Ok(()) => self.last_write_failed = false,
            Err(e) => {
                tracing::error!(error = %e, "failed to persist favorites");
                self.last_write_failed = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStorage;

    fn stored(storage: &MemoryStorage) -> Vec<String> {
        let raw = storage.get(FAVORITES_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn missing_key_starts_empty() {
        let store = FavoritesStore::open(MemoryStorage::new());
        assert!(store.is_empty());
        assert_eq!(store.load_status(), &FavoritesLoad::Empty);
    }

    #[test]
    fn loads_existing_array() {
        let storage = MemoryStorage::with_entries([(FAVORITES_KEY, r#"["p1","p2","p1"]"#)]);
        let store = FavoritesStore::open(storage);
        assert_eq!(store.load_status(), &FavoritesLoad::Loaded(2));
        assert!(store.contains("p1"));
        assert!(store.contains("p2"));
    }

    #[test]
    fn corrupt_data_starts_empty() {
        for raw in ["not json", r#"{"p1":true}"#, "[1,2]"] {
            let storage = MemoryStorage::with_entries([(FAVORITES_KEY, raw)]);
            let store = FavoritesStore::open(storage);
            assert!(store.is_empty(), "{raw} should load as empty");
            assert!(matches!(store.load_status(), FavoritesLoad::Corrupt(_)));
        }
    }

    #[test]
    fn toggle_off_then_on_persists_each_step() {
        let storage = MemoryStorage::with_entries([(FAVORITES_KEY, r#"["p1"]"#)]);
        let mut store = FavoritesStore::open(storage.clone());

        assert!(!store.toggle("p1"));
        assert!(!store.contains("p1"));
        assert!(stored(&storage).is_empty());

        assert!(store.toggle("p1"));
        assert!(store.contains("p1"));
        assert_eq!(stored(&storage), vec!["p1".to_string()]);
    }

    #[test]
    fn double_toggle_restores_membership() {
        let mut store = FavoritesStore::open(MemoryStorage::new());
        let before = store.contains("x");
        store.toggle("x");
        store.toggle("x");
        assert_eq!(store.contains("x"), before);
    }

    #[test]
    fn reopened_store_sees_toggles() {
        let storage = MemoryStorage::new();
        let mut store = FavoritesStore::open(storage.clone());
        store.toggle("a");
        store.toggle("b");
        drop(store);

        let reopened = FavoritesStore::open(storage);
        assert_eq!(reopened.len(), 2);
    }

    struct ReadOnly;

    impl Storage for ReadOnly {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let mut store = FavoritesStore::open(ReadOnly);
        assert!(store.toggle("p1"));
        assert!(store.contains("p1"));
        assert!(store.last_write_failed());
    }
}
