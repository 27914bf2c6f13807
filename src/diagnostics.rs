//! Maintenance helpers, to inspect or reset what the application has persisted
//!
//! These are not meant to be used in the regular create/update/delete flow.

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::storage::KeyValueStore;

/// The key the self-test writes to (and removes afterwards)
pub const SELF_TEST_KEY: &str = "test_key";
const SELF_TEST_PAYLOAD: &str = "Hello Storage";

/// What was found under an application key
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum KeyStatus {
    /// Nothing, `"null"` or `"[]"`
    Empty,
    /// A JSON array of that many objects
    Items(usize),
    /// Something that is not a JSON array, or an array with entries that cannot be records
    Invalid,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StorageReport {
    /// Platform the store runs on
    pub platform: String,
    /// One entry per application key, in the order of the key set
    pub keys: Vec<(String, KeyStatus)>,
}

impl StorageReport {
    /// How many records are stored in total
    pub fn total_items(&self) -> usize {
        self.keys.iter()
            .map(|(_, status)| match status {
                KeyStatus::Items(n) => *n,
                _ => 0,
            })
            .sum()
    }
}

/// Checks the storage works: writes a value, reads it back, checks it, and removes it
pub async fn self_test(storage: &KeyValueStore) -> bool {
    let info = storage.platform_info();
    log::info!("Testing the storage ({} on {})", info.storage_type, info.platform);

    let payload = json!({ "test": SELF_TEST_PAYLOAD, "timestamp": Utc::now().timestamp_millis() });
    if storage.set_item_json(SELF_TEST_KEY, &payload).await == false {
        log::error!("Self-test: unable to write");
        return false;
    }

    let retrieved = match storage.get_item(SELF_TEST_KEY).await {
        None => {
            log::error!("Self-test: unable to read back what was written");
            return false;
        },
        Some(value) => value,
    };

    let correct = match serde_json::from_str::<Value>(&retrieved) {
        Ok(value) => value == payload,
        Err(err) => {
            log::error!("Self-test: invalid data read back: {}", err);
            false
        },
    };

    if storage.remove_item(SELF_TEST_KEY).await == false {
        log::warn!("Self-test: unable to remove {:?}", SELF_TEST_KEY);
    }

    if correct {
        log::info!("Self-test of {} passed", info.storage_type);
    } else {
        log::error!("Self-test: the data read back is not what was written");
    }
    correct
}

/// Lists the application keys that currently exist in the storage
pub async fn list_app_keys(storage: &KeyValueStore) -> Vec<String> {
    let all_keys = storage.get_all_keys().await;
    let app_keys: Vec<String> = all_keys.into_iter()
        .filter(|key| storage.app_keys().contains(key))
        .collect();
    log::debug!("Application keys in the storage: {:?}", app_keys);
    app_keys
}

/// Reports what is stored under every application key
pub async fn check_collections(storage: &KeyValueStore) -> StorageReport {
    let stored = storage.multi_get(storage.app_keys()).await;

    let keys = storage.app_keys().iter()
        .map(|key| {
            let value = stored.iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| v.as_deref());
            (key.clone(), key_status(value))
        })
        .collect();

    let report = StorageReport {
        platform: storage.platform_info().platform.to_string(),
        keys,
    };
    for (key, status) in &report.keys {
        match status {
            KeyStatus::Empty => log::info!("{}: no data", key),
            KeyStatus::Items(n) => log::info!("{}: {} item(s)", key, n),
            KeyStatus::Invalid => log::warn!("{}: invalid data", key),
        }
    }
    log::info!("{} item(s) in total", report.total_items());
    report
}

/// Removes every application key
pub async fn clear_all(storage: &KeyValueStore) -> bool {
    log::info!("Clearing the storage...");
    storage.clear().await
}

fn key_status(value: Option<&str>) -> KeyStatus {
    match value {
        None | Some("null") | Some("[]") => KeyStatus::Empty,
        Some(value) => match serde_json::from_str::<Value>(value) {
            Ok(Value::Array(items)) if items.iter().all(Value::is_object) => KeyStatus::Items(items.len()),
            _ => KeyStatus::Invalid,
        },
    }
}
