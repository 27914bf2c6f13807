//! A list of records, kept in memory and mirrored to one storage key
//!
//! Every mutation rewrites the whole list: there is no partial update.
//! Mutations take `&mut self`, so two of them can never interleave on the same instance.
//! Share an instance behind an async mutex (see [`Organizer`](crate::organizer::Organizer)) if several tasks need to mutate it.

use std::collections::HashSet;

use serde_json::Value;

use crate::record::RecordId;
use crate::storage::KeyValueStore;
use crate::traits::Record;

/// Persisted values that all mean "no data"
const EMPTY_MARKERS: [&str; 2] = ["null", "[]"];

/// Where a [`CollectionStore`] is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// `load` has never been called
    Uninitialized,
    /// A `load` is in progress
    Loading,
    /// The in-memory list has been set from the storage (or set to empty, in case nothing usable was stored)
    Ready,
}

/// The result of a mutation
#[derive(Debug)]
pub struct Mutation<'a, R> {
    items: &'a [R],
    persisted: bool,
    matched: usize,
}

impl<'a, R> Mutation<'a, R> {
    /// The collection, as it is after this mutation
    pub fn items(&self) -> &'a [R] {
        self.items
    }

    /// Whether the new collection has been written to the storage.
    /// In case it has not, the in-memory collection still includes the change
    pub fn persisted(&self) -> bool {
        self.persisted
    }

    /// How many records this mutation affected.
    /// `0` after an `update` or a `delete` means that no record had this id
    pub fn matched(&self) -> usize {
        self.matched
    }
}


/// A collection of records of a given kind, synchronized with one key of a [`KeyValueStore`]
#[derive(Debug)]
pub struct CollectionStore<R: Record> {
    storage: KeyValueStore,
    key: String,
    items: Vec<R>,
    /// Persisted entries that could not be read as an `R`. They are written back unchanged, after `items`
    unreadable: Vec<Value>,
    state: LoadState,
}

impl<R: Record> CollectionStore<R> {
    /// Create a store that persists to `R::STORAGE_KEY`.
    /// Nothing is read until [`Self::load`] is called
    pub fn new(storage: KeyValueStore) -> Self {
        Self::with_key(storage, R::STORAGE_KEY)
    }

    /// Create a store that persists to a custom key
    pub fn with_key(storage: KeyValueStore, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
            items: Vec::new(),
            unreadable: Vec::new(),
            state: LoadState::Uninitialized,
        }
    }

    pub fn key(&self) -> &str           { &self.key }
    pub fn state(&self) -> LoadState    { self.state }
    pub fn len(&self) -> usize          { self.items.len() }
    pub fn is_empty(&self) -> bool      { self.items.is_empty() }

    /// Returns the in-memory collection. This performs no I/O
    pub fn get_all(&self) -> &[R] {
        &self.items
    }

    /// Persisted entries that could not be read as records. They are kept in the storage, but are not part of [`Self::get_all`]
    pub fn unreadable(&self) -> &[Value] {
        &self.unreadable
    }

    /// Returns the record with the given id, if any
    pub fn get<I: Into<RecordId>>(&self, id: I) -> Option<&R> {
        let id = id.into();
        self.items.iter().find(|item| item.id() == &id)
    }

    /// (Re)load the collection from the storage.
    ///
    /// A missing value, `"null"`, `"[]"` or anything that is not a JSON array all result in an empty collection.
    /// Entries of the array are read one by one: one that cannot be read is set aside (see [`Self::unreadable`]) and does not affect the others.
    pub async fn load(&mut self) -> &[R] {
        self.state = LoadState::Loading;
        let stored = self.storage.get_item(&self.key).await;
        let (items, unreadable) = parse_collection(&self.key, stored.as_deref());
        self.items = items;
        self.unreadable = unreadable;
        self.fix_ids();
        self.state = LoadState::Ready;
        log::debug!("Loaded {} item(s) from {:?}", self.items.len(), self.key);
        &self.items
    }

    /// Append a record.
    ///
    /// The record keeps its id if it has a non-empty one that is not used yet in this collection. Otherwise, a new id is generated.
    pub async fn add(&mut self, mut record: R) -> Mutation<'_, R> {
        self.ensure_loaded().await;

        if record.id().is_empty() {
            record.set_id(self.unused_id());
        } else if self.get(record.id()).is_some() {
            let new_id = self.unused_id();
            log::warn!("Id {} is already used in {:?}, using {} instead", record.id(), self.key, new_id);
            record.set_id(new_id);
        }

        log::debug!("Adding {} to {:?}", record.id(), self.key);
        self.items.push(record);
        self.mutation(1).await
    }

    /// Replace the record that has the same id than `record`, keeping its position.
    ///
    /// Nothing is replaced if no record has this id (this is not an error, but see [`Mutation::matched`]).
    /// The collection is persisted in both cases.
    pub async fn update(&mut self, record: R) -> Mutation<'_, R> {
        self.ensure_loaded().await;

        let mut matched = 0;
        for item in self.items.iter_mut() {
            if item.id() == record.id() {
                *item = record.clone();
                matched += 1;
            }
        }
        if matched == 0 {
            log::debug!("No item {} to update in {:?}", record.id(), self.key);
        }
        self.mutation(matched).await
    }

    /// Remove the record(s) with the given id.
    ///
    /// Ids are compared as strings, so that `delete(42)` removes the record whose id is `"42"`.
    pub async fn delete<I: Into<RecordId>>(&mut self, id: I) -> Mutation<'_, R> {
        let id = id.into();
        self.ensure_loaded().await;

        let len_before = self.items.len();
        self.items.retain(|item| item.id().as_str() != id.as_str());
        let matched = len_before - self.items.len();
        if matched == 0 {
            log::debug!("No item {} to delete in {:?}", id, self.key);
        }
        self.mutation(matched).await
    }

    /// Replace the whole collection (including the unreadable entries), and persist it.
    ///
    /// Records without an id, or whose id is already used earlier in `items`, are given a new id.
    pub async fn replace_all(&mut self, items: Vec<R>) -> Mutation<'_, R> {
        let count = items.len();
        self.items = items;
        self.unreadable.clear();
        self.fix_ids();
        self.state = LoadState::Ready;
        self.mutation(count).await
    }

    /// Write the current in-memory collection to the storage. Returns whether this succeeded
    pub async fn save(&self) -> bool {
        let persisted = match self.to_json() {
            Ok(entries) => self.storage.set_item_json(&self.key, &entries).await,
            Err(err) => {
                log::error!("Unable to serialize {:?}: {}", self.key, err);
                false
            },
        };
        if persisted == false {
            log::warn!("Changes to {:?} are only kept in memory", self.key);
        }
        persisted
    }

    fn to_json(&self) -> Result<Vec<Value>, serde_json::Error> {
        let mut entries = self.items.iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        entries.extend(self.unreadable.iter().cloned());
        Ok(entries)
    }

    async fn mutation(&self, matched: usize) -> Mutation<'_, R> {
        let persisted = self.save().await;
        Mutation { items: &self.items, persisted, matched }
    }

    /// Mutating a collection that has never been loaded would overwrite what is persisted. Load it first
    async fn ensure_loaded(&mut self) {
        if self.state == LoadState::Uninitialized {
            log::debug!("{:?} has not been loaded yet, loading it now", self.key);
            self.load().await;
        }
    }

    fn unused_id(&self) -> RecordId {
        loop {
            let id = RecordId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Makes sure every record has a non-empty and unique id
    fn fix_ids(&mut self) {
        let mut seen = HashSet::new();
        for index in 0..self.items.len() {
            let current = self.items[index].id().clone();
            if current.is_empty() == false && seen.contains(&current) == false {
                seen.insert(current);
                continue;
            }

            let mut new_id = RecordId::generate();
            while seen.contains(&new_id) || self.get(&new_id).is_some() {
                new_id = RecordId::generate();
            }
            log::warn!("Record #{} of {:?} has a missing or duplicated id {:?}, using {} instead", index, self.key, current.as_str(), new_id);
            seen.insert(new_id.clone());
            self.items[index].set_id(new_id);
        }
    }
}

/// Parse a persisted value into a list of records, and the entries that are not readable as records
fn parse_collection<R: Record>(key: &str, stored: Option<&str>) -> (Vec<R>, Vec<Value>) {
    let stored = match stored {
        None => return (Vec::new(), Vec::new()),
        Some(s) if EMPTY_MARKERS.contains(&s) => return (Vec::new(), Vec::new()),
        Some(s) => s,
    };

    let entries = match serde_json::from_str::<Vec<Value>>(stored) {
        Ok(entries) => entries,
        Err(err) => {
            log::warn!("Invalid data stored under {:?} ({}). Using an empty collection", key, err);
            return (Vec::new(), Vec::new());
        },
    };

    let mut items = Vec::with_capacity(entries.len());
    let mut unreadable = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<R>(entry.clone()) {
            Ok(item) => items.push(item),
            Err(err) => {
                log::warn!("Entry #{} of {:?} is not a valid record ({}). It is kept, but ignored", index, key, err);
                unreadable.push(entry);
            },
        }
    }
    (items, unreadable)
}
