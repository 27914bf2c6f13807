use std::error::Error;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::record::RecordId;

/// The error type returned by raw storage backends
pub type BackendError = Box<dyn Error + Send + Sync>;

/// A raw string-to-string persistent store.
///
/// Implementors may fail on every call. They are never used directly by the rest of the crate:
/// the [`KeyValueStore`](crate::storage::KeyValueStore) wraps them and turns every failure into a safe default.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Returns the value stored under `key`, or `None` if there is none
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError>;
    /// Stores `value` under `key`, overwriting any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;
    /// Removes `key`. Removing a key that does not exist is not an error
    async fn remove(&self, key: &str) -> Result<(), BackendError>;
    /// Returns every key this backend currently holds
    async fn keys(&self) -> Result<Vec<String>, BackendError>;

    /// Fetches several keys at once, in the same order as `keys`.
    ///
    /// The default implementation fetches them one by one, and fails as soon as one of them fails
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>, BackendError> {
        let mut result = Vec::with_capacity(keys.len());
        for key in keys {
            let value = self.get(key).await?;
            result.push((key.clone(), value));
        }
        Ok(result)
    }
}

/// Something that can be stored in a [`CollectionStore`](crate::collection::CollectionStore)
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync {
    /// The storage key under which the whole collection of this kind is persisted
    const STORAGE_KEY: &'static str;

    fn id(&self) -> &RecordId;
    fn set_id(&mut self, id: RecordId);
}
