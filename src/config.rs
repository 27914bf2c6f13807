//! Support for library configuration options

use std::error::Error;
use std::path::PathBuf;

use once_cell::sync::Lazy;

use crate::storage::Platform;

/// Every storage key this application owns. `clear` never touches anything else.
pub const APP_KEYS: [&str; 5] = ["contacts", "notes", "tasks", "reminders", "events"];

/// Environment variable that forces the platform (`web` or `mobile`)
pub const PLATFORM_ENV_VAR: &str = "ORGANIZER_PLATFORM";
/// Environment variable that overrides where data is persisted
pub const STORAGE_DIR_ENV_VAR: &str = "ORGANIZER_STORAGE_DIR";

/// The platform this process runs on. This is detected once, the first time it is needed.
pub static PLATFORM: Lazy<Platform> = Lazy::new(Platform::detect);

/// Runtime options of the storage layer
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Which backend flavour to use
    pub platform: Platform,
    /// The folder data is persisted into.
    /// The web flavour keeps a single file in it, the mobile flavour one file per key
    pub storage_dir: PathBuf,
    /// The keys that belong to this application
    pub app_keys: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: *PLATFORM,
            storage_dir: default_storage_dir(),
            app_keys: APP_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Config {
    /// Build a config for a given platform and storage folder, with the default key set
    pub fn new(platform: Platform, storage_dir: PathBuf) -> Self {
        Self {
            platform,
            storage_dir,
            ..Self::default()
        }
    }

    /// Build the default config, then apply overrides from the environment
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var(PLATFORM_ENV_VAR) {
            config.platform = value.parse()?;
        }
        if let Ok(value) = std::env::var(STORAGE_DIR_ENV_VAR) {
            if value.trim().is_empty() {
                return Err(format!("{} is set but empty", STORAGE_DIR_ENV_VAR).into());
            }
            config.storage_dir = PathBuf::from(value);
        }

        log::debug!("Using config {:?}", config);
        Ok(config)
    }
}

fn default_storage_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local").join("share").join("pocket-organizer"),
        None => PathBuf::from("pocket-organizer-data"),
    }
}
