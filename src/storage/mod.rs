//! A single string-keyed persistent store, whatever the platform.
//!
//! Two backends exist:
//! * [`LocalStorage`](local_storage::LocalStorage), a synchronous map mirrored to a single file, that mimics a browser `localStorage`
//! * [`DeviceStorage`](device_storage::DeviceStorage), an async store that keeps one file per key, like a mobile persistent store
//!
//! The backend is picked once, when the [`KeyValueStore`] is built. After that, callers never need to know which one is in use.

pub mod device_storage;
pub mod local_storage;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{Config, APP_KEYS, PLATFORM_ENV_VAR};
use crate::traits::StorageBackend;
use device_storage::DeviceStorage;
use local_storage::LocalStorage;

/// Name of the file the web flavour persists into
pub const LOCAL_STORAGE_FILE: &str = "local_storage.json";

/// Appended to the name of a local storage file that cannot be parsed, when it is moved out of the way
pub const CORRUPT_SUFFIX: &str = ".corrupt";

/// How many characters of a value are shown in log lines
const LOG_PREVIEW_LEN: usize = 100;


/// The kind of environment the application runs in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// A browser-like environment, that provides a synchronous `localStorage`
    Web,
    /// A mobile device, that provides an async persistent store
    Mobile,
}

impl Platform {
    /// Detect the current platform.
    ///
    /// The `ORGANIZER_PLATFORM` environment variable wins if it is set to a valid value.
    /// Otherwise, WebAssembly builds are considered `Web` and everything else `Mobile`.
    /// Prefer [`crate::config::PLATFORM`], that only runs this once.
    pub fn detect() -> Self {
        if let Ok(value) = std::env::var(PLATFORM_ENV_VAR) {
            match value.parse::<Platform>() {
                Ok(platform) => return platform,
                Err(err) => log::warn!("Ignoring {}: {}", PLATFORM_ENV_VAR, err),
            }
        }

        if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else {
            Platform::Mobile
        }
    }

    pub fn is_web(&self) -> bool {
        *self == Platform::Web
    }

    /// The name of the store this platform provides
    pub fn storage_type(&self) -> &'static str {
        match self {
            Platform::Web => "localStorage",
            Platform::Mobile => "AsyncStorage",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Platform::Web => write!(f, "web"),
            Platform::Mobile => write!(f, "mobile"),
        }
    }
}

impl FromStr for Platform {
    type Err = Box<dyn Error>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "web" => Ok(Platform::Web),
            "mobile" | "android" | "ios" => Ok(Platform::Mobile),
            other => Err(format!("Unknown platform {:?}", other).into()),
        }
    }
}

/// What the store says about itself
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlatformInfo {
    pub platform: Platform,
    pub is_web: bool,
    pub storage_type: &'static str,
}


/// An async string-to-string store that never fails.
///
/// Every operation catches the errors of the underlying backend, logs them, and returns a safe default
/// (`false`, `None` or an empty list). A failure on one key never affects another key.
///
/// Cloning is cheap, and clones share the same backend.
#[derive(Clone)]
pub struct KeyValueStore {
    backend: Arc<dyn StorageBackend>,
    platform: Platform,
    app_keys: Arc<Vec<String>>,
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("platform", &self.platform)
            .field("app_keys", &self.app_keys)
            .finish()
    }
}

impl KeyValueStore {
    /// Wrap an arbitrary backend
    pub fn new(backend: Arc<dyn StorageBackend>, platform: Platform, app_keys: Vec<String>) -> Self {
        Self { backend, platform, app_keys: Arc::new(app_keys) }
    }

    /// Build the store that matches `config.platform`
    pub fn from_config(config: &Config) -> Self {
        let backend: Arc<dyn StorageBackend> = match config.platform {
            Platform::Web => {
                let path = config.storage_dir.join(LOCAL_STORAGE_FILE);
                match LocalStorage::from_file(&path) {
                    Ok(storage) => Arc::new(storage),
                    Err(err) => {
                        log::warn!("Invalid local storage file {:?}: {}", path, err);
                        set_aside(&path)
                    }
                }
            },
            Platform::Mobile => Arc::new(DeviceStorage::new(&config.storage_dir)),
        };
        log::info!("Using {} for {} (in {:?})", config.platform.storage_type(), config.platform, config.storage_dir);
        Self::new(backend, config.platform, config.app_keys.clone())
    }

    /// A store that lives in memory only. Handy for tests
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(LocalStorage::in_memory()),
            Platform::Web,
            APP_KEYS.iter().map(|k| k.to_string()).collect(),
        )
    }

    pub fn platform_info(&self) -> PlatformInfo {
        PlatformInfo {
            platform: self.platform,
            is_web: self.platform.is_web(),
            storage_type: self.platform.storage_type(),
        }
    }

    /// The keys that belong to this application
    pub fn app_keys(&self) -> &[String] {
        &self.app_keys
    }

    /// Store `value` under `key`. Returns whether this succeeded
    pub async fn set_item(&self, key: &str, value: &str) -> bool {
        match self.backend.set(key, value).await {
            Ok(()) => {
                log::debug!("[{}] Saved {:?}: {}", self.platform, key, preview(value));
                true
            },
            Err(err) => {
                log::error!("[{}] Unable to save {:?}: {}", self.platform, key, err);
                false
            },
        }
    }

    /// Serialize `value` to JSON and store it under `key`. Returns whether this succeeded
    pub async fn set_item_json<T>(&self, key: &str, value: &T) -> bool
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_string(value) {
            Ok(serialized) => self.set_item(key, &serialized).await,
            Err(err) => {
                log::error!("Unable to serialize the value for {:?}: {}", key, err);
                false
            },
        }
    }

    /// Get the value stored under `key`. Returns `None` if there is none, or in case of an error
    pub async fn get_item(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(value) => {
                log::debug!("[{}] Retrieved {:?}: {}", self.platform, key,
                    value.as_deref().map(preview).unwrap_or_else(|| "null".to_string()));
                value
            },
            Err(err) => {
                log::error!("[{}] Unable to retrieve {:?}: {}", self.platform, key, err);
                None
            },
        }
    }

    /// Remove `key`. Returns whether this succeeded
    pub async fn remove_item(&self, key: &str) -> bool {
        match self.backend.remove(key).await {
            Ok(()) => {
                log::debug!("[{}] Removed {:?}", self.platform, key);
                true
            },
            Err(err) => {
                log::error!("[{}] Unable to remove {:?}: {}", self.platform, key, err);
                false
            },
        }
    }

    /// Remove every key that belongs to this application.
    ///
    /// Other keys the backend may hold are left untouched.
    /// This tries to remove every key even if some of them fail, and returns `true` only if all of them were removed.
    pub async fn clear(&self) -> bool {
        let mut success = true;
        for key in self.app_keys.iter() {
            if let Err(err) = self.backend.remove(key).await {
                log::error!("[{}] Unable to clear {:?}: {}", self.platform, key, err);
                success = false;
            }
        }
        if success {
            log::info!("[{}] Storage cleared", self.platform);
        }
        success
    }

    /// List every key the backend holds (including the ones that do not belong to this application)
    pub async fn get_all_keys(&self) -> Vec<String> {
        match self.backend.keys().await {
            Ok(keys) => {
                log::debug!("[{}] Keys: {:?}", self.platform, keys);
                keys
            },
            Err(err) => {
                log::error!("[{}] Unable to list keys: {}", self.platform, err);
                Vec::new()
            },
        }
    }

    /// Get several values at once, in the order of `keys`.
    ///
    /// This returns an empty list in case of an error
    pub async fn multi_get(&self, keys: &[String]) -> Vec<(String, Option<String>)> {
        match self.backend.multi_get(keys).await {
            Ok(pairs) => pairs,
            Err(err) => {
                log::error!("[{}] Unable to get multiple items: {}", self.platform, err);
                Vec::new()
            },
        }
    }
}

/// Move an unusable storage file out of the way, so that it is not overwritten by the first write.
/// In case it cannot be moved, the storage is kept in memory only
fn set_aside(path: &Path) -> Arc<dyn StorageBackend> {
    let mut aside = path.as_os_str().to_owned();
    aside.push(CORRUPT_SUFFIX);
    match std::fs::rename(path, &aside) {
        Ok(()) => {
            log::warn!("Moved it to {:?}. Starting with an empty storage", aside);
            Arc::new(LocalStorage::new(path))
        },
        Err(err) => {
            log::error!("Unable to move {:?} out of the way ({}). Changes will only be kept in memory", path, err);
            Arc::new(LocalStorage::in_memory())
        },
    }
}

fn preview(value: &str) -> String {
    value.chars().take(LOG_PREVIEW_LEN).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::mock_behaviour::{MockBehaviour, MockedBackend};

    fn mocked_store(behaviour: MockBehaviour) -> (KeyValueStore, Arc<MockedBackend>) {
        let backend = Arc::new(MockedBackend::new(Arc::new(LocalStorage::in_memory()), behaviour));
        let store = KeyValueStore::new(backend.clone(), Platform::Mobile, APP_KEYS.iter().map(|k| k.to_string()).collect());
        (store, backend)
    }

    #[test]
    fn parse_platform() {
        assert_eq!("web".parse::<Platform>().unwrap(), Platform::Web);
        assert_eq!(" Android ".parse::<Platform>().unwrap(), Platform::Mobile);
        assert!("toaster".parse::<Platform>().is_err());
        assert_eq!(Platform::Web.storage_type(), "localStorage");
        assert_eq!(Platform::Mobile.storage_type(), "AsyncStorage");
    }

    #[tokio::test]
    async fn basic_operations() {
        let store = KeyValueStore::in_memory();
        assert_eq!(store.get_item("tasks").await, None);
        assert!(store.set_item("tasks", "[1]").await);
        assert_eq!(store.get_item("tasks").await, Some("[1]".to_string()));
        assert!(store.set_item("tasks", "[2]").await);
        assert_eq!(store.get_item("tasks").await, Some("[2]".to_string()));
        assert!(store.remove_item("tasks").await);
        assert_eq!(store.get_item("tasks").await, None);
        // Removing twice is fine
        assert!(store.remove_item("tasks").await);
    }

    #[tokio::test]
    async fn multi_get_preserves_order() {
        let store = KeyValueStore::in_memory();
        store.set_item("b", "2").await;
        store.set_item("a", "1").await;

        let keys = vec!["b".to_string(), "missing".to_string(), "a".to_string()];
        let pairs = store.multi_get(&keys).await;
        assert_eq!(pairs, vec![
            ("b".to_string(), Some("2".to_string())),
            ("missing".to_string(), None),
            ("a".to_string(), Some("1".to_string())),
        ]);
    }

    #[tokio::test]
    async fn clear_only_removes_app_keys() {
        let store = KeyValueStore::in_memory();
        store.set_item("tasks", "[]").await;
        store.set_item("notes", "[]").await;
        store.set_item("someone_else", "precious").await;

        assert!(store.clear().await);
        assert_eq!(store.get_all_keys().await, vec!["someone_else".to_string()]);

        assert!(store.clear().await);
        assert_eq!(store.get_all_keys().await, vec!["someone_else".to_string()]);
    }

    #[tokio::test]
    async fn failures_degrade_to_defaults() {
        let (store, _backend) = mocked_store(MockBehaviour::fail_now(1));
        assert_eq!(store.set_item("tasks", "[]").await, false);
        assert_eq!(store.get_item("tasks").await, None);
        assert_eq!(store.remove_item("tasks").await, false);
        assert_eq!(store.get_all_keys().await, Vec::<String>::new());

        // Every behaviour failed once, now everything works again
        assert!(store.set_item("tasks", "[]").await);
        assert_eq!(store.get_item("tasks").await, Some("[]".to_string()));
    }

    #[tokio::test]
    async fn a_failure_does_not_affect_other_keys() {
        let (store, backend) = mocked_store(MockBehaviour::new());
        assert!(store.set_item("notes", "[\"kept\"]").await);

        backend.set_behaviour(MockBehaviour { set_item_behaviour: (0, 1), ..MockBehaviour::default() });
        assert_eq!(store.set_item("tasks", "[]").await, false);

        assert_eq!(store.get_item("notes").await, Some("[\"kept\"]".to_string()));
        assert_eq!(store.get_item("tasks").await, None);
    }

    #[tokio::test]
    async fn failing_multi_get_returns_nothing() {
        let (store, _backend) = mocked_store(MockBehaviour { get_item_behaviour: (1, 1), ..MockBehaviour::default() });
        store.set_item("a", "1").await;
        let keys = vec!["a".to_string(), "b".to_string()];
        assert!(store.multi_get(&keys).await.is_empty());
    }

    #[tokio::test]
    async fn an_invalid_local_storage_file_is_set_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCAL_STORAGE_FILE);
        std::fs::write(&path, r#"{"tasks": "[]", "someone_else": "precious""#).unwrap();

        let store = KeyValueStore::from_config(&Config::new(Platform::Web, dir.path().to_path_buf()));
        assert_eq!(store.get_item("someone_else").await, None);
        assert!(store.set_item("tasks", "[]").await);

        let aside = dir.path().join(format!("{}{}", LOCAL_STORAGE_FILE, CORRUPT_SUFFIX));
        assert_eq!(std::fs::read_to_string(&aside).unwrap(), r#"{"tasks": "[]", "someone_else": "precious""#);

        let reopened = KeyValueStore::from_config(&Config::new(Platform::Web, dir.path().to_path_buf()));
        assert_eq!(reopened.get_all_keys().await, vec!["tasks".to_string()]);
    }

    #[tokio::test]
    async fn both_backends_accept_the_same_keys() {
        let dir = tempfile::tempdir().unwrap();
        let keys = ["tasks", "user:settings", "a/b", ".hidden", "~tilde", "", "../escape", "with space", "ação"];

        for platform in &[Platform::Web, Platform::Mobile] {
            let folder = dir.path().join(platform.to_string());
            let store = KeyValueStore::from_config(&Config::new(*platform, folder.clone()));
            for (i, key) in keys.iter().enumerate() {
                assert!(store.set_item(key, &i.to_string()).await, "{} could not store {:?}", platform, key);
            }

            let reopened = KeyValueStore::from_config(&Config::new(*platform, folder));
            for (i, key) in keys.iter().enumerate() {
                assert_eq!(reopened.get_item(key).await, Some(i.to_string()), "{} lost {:?}", platform, key);
            }
            let mut expected: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
            expected.sort();
            assert_eq!(reopened.get_all_keys().await, expected);

            assert!(reopened.remove_item("a/b").await);
            assert_eq!(reopened.get_item("a/b").await, None);
        }
    }
}
