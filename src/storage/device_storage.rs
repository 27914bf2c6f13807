//! An async persistent key-value store, that keeps one file per key

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::traits::{BackendError, StorageBackend};

const VALUE_EXTENSION: &str = "value";
const TMP_EXTENSION: &str = "tmp";
/// Starts the file name of keys that are stored encoded
const ENCODED_PREFIX: char = '~';

/// A store that persists every key as `<folder>/<key>.value`.
///
/// Any string can be used as a key. Keys that are not usable as-is as file names (see [`sanitize_filename`])
/// are stored as `<folder>/~<base64 of the key>.value`. The folder is created on the first write.
#[derive(Debug, Clone)]
pub struct DeviceStorage {
    folder: PathBuf,
}

impl DeviceStorage {
    pub fn new(folder: &Path) -> Self {
        Self { folder: PathBuf::from(folder) }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.folder.join(format!("{}.{}", file_stem_for(key), VALUE_EXTENSION))
    }
}

fn file_stem_for(key: &str) -> String {
    let usable_as_is = key.is_empty() == false
        && key.starts_with('.') == false
        && key.starts_with(ENCODED_PREFIX) == false
        && sanitize_filename::sanitize(key) == key;

    if usable_as_is {
        key.to_string()
    } else {
        format!("{}{}", ENCODED_PREFIX, URL_SAFE_NO_PAD.encode(key))
    }
}

fn key_for(stem: &str) -> Result<String, BackendError> {
    match stem.strip_prefix(ENCODED_PREFIX) {
        None => Ok(stem.to_string()),
        Some(encoded) => Ok(String::from_utf8(URL_SAFE_NO_PAD.decode(encoded)?)?),
    }
}

#[async_trait]
impl StorageBackend for DeviceStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!("Unable to read {:?}: {}", path, err).into()),
        }
    }

    /// Writes a temporary file, then renames it over the previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let path = self.path_for(key);
        tokio::fs::create_dir_all(&self.folder).await?;

        let tmp_path = path.with_extension(TMP_EXTENSION);
        tokio::fs::write(&tmp_path, value.as_bytes()).await
            .map_err(|err| format!("Unable to write {:?}: {}", tmp_path, err))?;
        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(format!("Unable to remove {:?}: {}", path, err).into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, BackendError> {
        let mut entries = match tokio::fs::read_dir(&self.folder).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()).map(key_for) {
                Some(Ok(key)) => keys.push(key),
                _ => log::warn!("Ignoring unexpected file {:?}", path),
            }
        }
        keys.sort();
        Ok(keys)
    }
}
