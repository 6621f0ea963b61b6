//! Anonymous user id resolution and the key-value storage it persists into.
use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use uuid::Uuid;

/// Storage key of the persisted anonymous user id.
pub const USER_ID_KEY: &str = "logSnagUserId";

/// Error type for key-value storage operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    /// The backing file is not a JSON object of strings.
    #[error("malformed storage file: {0}")]
    Json(#[from] serde_json::Error),
    /// The platform has no per-user data directory.
    #[error("could not determine the platform data directory")]
    NoDataDir,
}

/// A persistent string key-value store.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// An in-process store. Values live as long as the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// A store backed by a JSON object file, surviving process restarts.
///
/// File access is blocking `std::fs` I/O. The client only touches the store while
/// building a request that asks for a generated user id; at most one small read and,
/// on first generation, one write and rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: Option<PathBuf>,
}

impl FileStore {
    /// Use the file at `path`. It is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Use `<data dir>/logsnag/defaults.json` under the platform's per-user data directory.
    ///
    /// If the platform has no data directory every access fails with
    /// [`StorageError::NoDataDir`].
    pub fn platform_default() -> Self {
        Self {
            path: dirs::data_dir().map(|dir| dir.join("logsnag").join("defaults.json")),
        }
    }

    /// Path of the backing file, if one could be determined.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path.as_deref().ok_or(StorageError::NoDataDir)?;
        Ok(Self::load(path)?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path.as_deref().ok_or(StorageError::NoDataDir)?;
        let mut values = Self::load(path)?;
        values.insert(key.to_owned(), value.to_owned());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(&values)?)?;
        fs::rename(&tmp_path, path)?;

        tracing::debug!(path = %path.display(), key, "stored value");
        Ok(())
    }
}

/// Looks up or generates the anonymous user id.
///
/// The read and the write on first generation are not atomic: two concurrent
/// first calls may each generate an id, and only the last write survives.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn KeyValueStore>,
}

impl IdentityResolver {
    /// Create a resolver persisting into `store`.
    pub fn new(store: impl KeyValueStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Resolve the anonymous user id.
    ///
    /// Returns `None` without touching storage unless `requested`. Otherwise returns
    /// the persisted id, generating and persisting a new UUID first if none exists.
    pub fn resolve_user_id(&self, requested: bool) -> Result<Option<String>, StorageError> {
        if !requested {
            return Ok(None);
        }

        if let Some(existing) = self.store.get(USER_ID_KEY)? {
            return Ok(Some(existing));
        }

        let generated = Uuid::new_v4()
            .hyphenated()
            .encode_upper(&mut Uuid::encode_buffer())
            .to_owned();
        self.store.set(USER_ID_KEY, &generated)?;
        tracing::debug!(user_id = %generated, "generated anonymous user id");
        Ok(Some(generated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_not_requested_skips_storage() {
        let store = Arc::new(MemoryStore::new());
        let resolver = IdentityResolver::new(store.clone());

        assert_eq!(resolver.resolve_user_id(false).unwrap(), None);
        assert_eq!(store.get(USER_ID_KEY).unwrap(), None);
    }

    #[test]
    fn test_generates_once() {
        let store = Arc::new(MemoryStore::new());
        let resolver = IdentityResolver::new(store.clone());

        let first = resolver.resolve_user_id(true).unwrap().unwrap();
        let second = resolver.resolve_user_id(true).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get(USER_ID_KEY).unwrap().as_deref(), Some(first.as_str()));

        let parsed = Uuid::parse_str(&first).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(first, first.to_uppercase());
    }

    #[test]
    fn test_returns_existing_id_unchanged() {
        let store = Arc::new(MemoryStore::new());
        store.set(USER_ID_KEY, "existing-id").unwrap();
        let resolver = IdentityResolver::new(store);

        assert_eq!(
            resolver.resolve_user_id(true).unwrap().as_deref(),
            Some("existing-id")
        );
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("defaults.json");

        let generated = IdentityResolver::new(FileStore::new(&path))
            .resolve_user_id(true)
            .unwrap();
        let reopened = IdentityResolver::new(FileStore::new(&path))
            .resolve_user_id(true)
            .unwrap();
        assert_eq!(generated, reopened);
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("defaults.json"));

        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("defaults.json");
        fs::write(&path, "not json").unwrap();

        let err = FileStore::new(&path).get(USER_ID_KEY).unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }

    #[test]
    fn test_missing_data_dir() {
        let store = FileStore { path: None };
        assert!(matches!(store.get("k"), Err(StorageError::NoDataDir)));
        assert!(matches!(store.set("k", "v"), Err(StorageError::NoDataDir)));
    }
}
