//! A synchronous key-value store, in the fashion of a browser `localStorage`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::traits::{BackendError, StorageBackend};

/// An in-process map of strings, optionally mirrored to a backing file.
///
/// Every call is synchronous and completes before returning. When a backing file is set, every write rewrites it entirely.
#[derive(Debug)]
pub struct LocalStorage {
    backing_file: Option<PathBuf>,
    data: Mutex<BTreeMap<String, String>>,
}

impl LocalStorage {
    /// A store that is never persisted
    pub fn in_memory() -> Self {
        Self {
            backing_file: None,
            data: Mutex::new(BTreeMap::new()),
        }
    }

    /// An empty store that will be persisted to `path`
    pub fn new(path: &Path) -> Self {
        Self {
            backing_file: Some(PathBuf::from(path)),
            data: Mutex::new(BTreeMap::new()),
        }
    }

    /// Initialize a store from the content of its backing file.
    ///
    /// A missing file means an empty store. An unreadable or invalid file is an error.
    pub fn from_file(path: &Path) -> Result<Self, BackendError> {
        let data = match std::fs::File::open(path) {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(std::io::BufReader::new(file))?,
        };

        Ok(Self {
            backing_file: Some(PathBuf::from(path)),
            data: Mutex::new(data),
        })
    }

    pub fn backing_file(&self) -> Option<&Path> {
        self.backing_file.as_deref()
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, BackendError> {
        let data = self.data.lock().map_err(|_| "local storage lock is poisoned")?;
        Ok(data.get(key).cloned())
    }

    /// Set a value. In case the backing file cannot be written, the in-memory value is left as it was before
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut data = self.data.lock().map_err(|_| "local storage lock is poisoned")?;
        let previous = data.insert(key.to_string(), value.to_string());
        if let Err(err) = self.save_to_file(&data) {
            match previous {
                Some(prev) => data.insert(key.to_string(), prev),
                None => data.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<(), BackendError> {
        let mut data = self.data.lock().map_err(|_| "local storage lock is poisoned")?;
        let previous = match data.remove(key) {
            None => return Ok(()),
            Some(prev) => prev,
        };
        if let Err(err) = self.save_to_file(&data) {
            data.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(())
    }

    pub fn keys(&self) -> Result<Vec<String>, BackendError> {
        let data = self.data.lock().map_err(|_| "local storage lock is poisoned")?;
        Ok(data.keys().cloned().collect())
    }

    /// Store the current content to the backing file, if any.
    ///
    /// This writes a sibling temporary file first, then renames it, so that a reader never sees a half-written file
    fn save_to_file(&self, data: &BTreeMap<String, String>) -> Result<(), BackendError> {
        let path = match &self.backing_file {
            None => return Ok(()),
            Some(path) => path,
        };

        if let Some(parent) = path.parent() {
            if parent.as_os_str().is_empty() == false {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = path.with_extension("json.tmp");
        let file = std::fs::File::create(&tmp_path)
            .map_err(|err| format!("Unable to save file {:?}: {}", tmp_path, err))?;
        serde_json::to_writer(std::io::BufWriter::new(file), data)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.get_item(key)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.set_item(key, value)
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.remove_item(key)
    }

    async fn keys(&self) -> Result<Vec<String>, BackendError> {
        LocalStorage::keys(self)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.json");

        let storage = LocalStorage::new(&path);
        storage.set_item("tasks", "[{\"id\":\"1\"}]").unwrap();
        storage.set_item("notes", "[]").unwrap();
        storage.remove_item("notes").unwrap();

        let retrieved = LocalStorage::from_file(&path).unwrap();
        assert_eq!(retrieved.get_item("tasks").unwrap(), Some("[{\"id\":\"1\"}]".to_string()));
        assert_eq!(retrieved.get_item("notes").unwrap(), None);
        assert_eq!(retrieved.keys().unwrap(), vec!["tasks".to_string()]);
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::from_file(&dir.path().join("nothing.json")).unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        std::fs::write(&path, "{not valid").unwrap();
        assert!(LocalStorage::from_file(&path).is_err());
    }

    #[test]
    fn failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        // The backing file is a directory: every write will fail
        let path = dir.path().join("occupied");
        std::fs::create_dir(&path).unwrap();
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        let storage = LocalStorage::new(&path);
        assert!(storage.set_item("tasks", "[]").is_err());
        assert_eq!(storage.get_item("tasks").unwrap(), None);
    }
}
