//! Favorite cities persisted as a JSON list in local storage.

use std::sync::Arc;

use shamiran_core::StorageError;

use crate::storage::KeyValueStore;

/// Storage key holding the JSON-serialized favorites list.
pub const FAVORITES_KEY: &str = "shamiran_favorites";

/// Ordered set of city names.
///
/// Reads go to storage every time, so the list always reflects the last
/// persisted state. Names compare exactly (case-sensitive).
#[derive(Clone)]
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
}

impl FavoritesStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Current favorites. Missing, unreadable or malformed data reads as an
    /// empty list.
    pub fn list(&self) -> Vec<String> {
        let raw = match self.storage.get_item(FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Favorites unreadable, treating as empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(favorites) => favorites,
            Err(e) => {
                tracing::debug!("Malformed favorites data, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    pub fn is_favorite(&self, city: &str) -> bool {
        self.list().iter().any(|f| f == city)
    }

    /// Insert `city` unless already present. Returns whether it was inserted.
    ///
    /// # Errors
    /// Returns an error if the updated list could not be persisted.
    pub fn add(&self, city: &str) -> Result<bool, StorageError> {
        let mut favorites = self.list();
        if favorites.iter().any(|f| f == city) {
            return Ok(false);
        }

        favorites.push(city.to_string());
        self.save(&favorites)?;
        tracing::info!("Added favorite: {}", city);
        Ok(true)
    }

    /// Remove every exact match of `city`. Returns whether anything was removed.
    ///
    /// # Errors
    /// Returns an error if the updated list could not be persisted.
    pub fn remove(&self, city: &str) -> Result<bool, StorageError> {
        let mut favorites = self.list();
        let before = favorites.len();
        favorites.retain(|f| f != city);
        let removed = favorites.len() != before;

        self.save(&favorites)?;
        if removed {
            tracing::info!("Removed favorite: {}", city);
        }
        Ok(removed)
    }

    fn save(&self, favorites: &[String]) -> Result<(), StorageError> {
        let json = serde_json::to_string(favorites)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        self.storage.set_item(FAVORITES_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> (FavoritesStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (FavoritesStore::new(storage.clone()), storage)
    }

    #[test]
    fn test_empty_by_default() {
        let (favorites, _) = store();
        assert!(favorites.list().is_empty());
        assert!(!favorites.is_favorite("Dhaka"));
    }

    #[test]
    fn test_add_remove_scenario() {
        let (favorites, _) = store();

        assert!(favorites.add("Dhaka").unwrap());
        assert_eq!(favorites.list(), vec!["Dhaka"]);

        assert!(!favorites.add("Dhaka").unwrap());
        assert_eq!(favorites.list(), vec!["Dhaka"]);

        assert!(favorites.remove("Dhaka").unwrap());
        assert!(favorites.list().is_empty());
    }

    #[test]
    fn test_persists_as_json_list() {
        let (favorites, storage) = store();
        favorites.add("Dhaka").unwrap();
        favorites.add("Sylhet").unwrap();

        assert_eq!(
            storage.get_item(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["Dhaka","Sylhet"]"#)
        );
    }

    #[test]
    fn test_membership_is_exact() {
        let (favorites, _) = store();
        favorites.add("Dhaka").unwrap();
        assert!(favorites.is_favorite("Dhaka"));
        assert!(!favorites.is_favorite("dhaka"));
        assert!(!favorites.is_favorite("Dhaka "));
    }

    #[test]
    fn test_remove_drops_every_occurrence() {
        let (favorites, storage) = store();
        storage
            .set_item(FAVORITES_KEY, r#"["Dhaka","Rajshahi","Dhaka"]"#)
            .unwrap();

        assert!(favorites.remove("Dhaka").unwrap());
        assert_eq!(favorites.list(), vec!["Rajshahi"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (favorites, _) = store();
        favorites.add("Barisal").unwrap();
        assert!(!favorites.remove("Comilla").unwrap());
        assert_eq!(favorites.list(), vec!["Barisal"]);
    }

    #[test]
    fn test_malformed_data_reads_as_empty() {
        let (favorites, storage) = store();
        for raw in ["", "not json", "{\"a\":1}", "[1,2,3]", "\"Dhaka\"", "[\"ok\", null]"] {
            storage.set_item(FAVORITES_KEY, raw).unwrap();
            assert!(favorites.list().is_empty(), "{raw:?} should read as empty");
        }
    }

    #[test]
    fn test_add_recovers_from_malformed_data() {
        let (favorites, storage) = store();
        storage.set_item(FAVORITES_KEY, "garbage").unwrap();

        favorites.add("Khulna").unwrap();
        assert_eq!(favorites.list(), vec!["Khulna"]);
    }

    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk gone".into()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed("disk gone".into()))
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteFailed("disk gone".into()))
        }
    }

    #[test]
    fn test_unreadable_storage_fails_soft_on_read() {
        let favorites = FavoritesStore::new(Arc::new(BrokenStorage));
        assert!(favorites.list().is_empty());
        assert!(favorites.add("Dhaka").is_err());
    }
}
