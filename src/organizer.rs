//! The five collections of the application, built once and shared by handle

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::collection::CollectionStore;
use crate::config::Config;
use crate::dashboard::Summary;
use crate::storage::KeyValueStore;
use crate::{Contact, Event, Note, Reminder, Task};

/// A collection that can be used from several tasks.
///
/// Lock it for the whole duration of a mutation (including its persistence), so that two mutations never overwrite each other.
pub type SharedCollection<R> = Arc<Mutex<CollectionStore<R>>>;

/// Owns one [`CollectionStore`] per kind of record, all of them backed by the same [`KeyValueStore`].
///
/// Build it once at startup, then hand clones of the collections (or of the whole `Organizer`) to whatever needs them.
#[derive(Clone, Debug)]
pub struct Organizer {
    storage: KeyValueStore,

    events: SharedCollection<Event>,
    contacts: SharedCollection<Contact>,
    tasks: SharedCollection<Task>,
    reminders: SharedCollection<Reminder>,
    notes: SharedCollection<Note>,
}

impl Organizer {
    pub fn new(storage: KeyValueStore) -> Self {
        Self {
            events: shared(&storage),
            contacts: shared(&storage),
            tasks: shared(&storage),
            reminders: shared(&storage),
            notes: shared(&storage),
            storage,
        }
    }

    /// Pick the storage backend that suits `config`, and create the collections on top of it
    pub fn from_config(config: &Config) -> Self {
        Self::new(KeyValueStore::from_config(config))
    }

    pub fn storage(&self) -> &KeyValueStore                  { &self.storage   }
    pub fn events(&self) -> &SharedCollection<Event>         { &self.events    }
    pub fn contacts(&self) -> &SharedCollection<Contact>     { &self.contacts  }
    pub fn tasks(&self) -> &SharedCollection<Task>           { &self.tasks     }
    pub fn reminders(&self) -> &SharedCollection<Reminder>   { &self.reminders }
    pub fn notes(&self) -> &SharedCollection<Note>           { &self.notes     }

    /// (Re)load every collection from the storage
    pub async fn load_all(&self) {
        self.events.lock().await.load().await;
        self.contacts.lock().await.load().await;
        self.tasks.lock().await.load().await;
        self.reminders.lock().await.load().await;
        self.notes.lock().await.load().await;
        log::info!("All collections loaded");
    }

    /// Compute the dashboard statistics from the in-memory collections
    pub async fn summary(&self, today: NaiveDate) -> Summary {
        let events = self.events.lock().await;
        let contacts = self.contacts.lock().await;
        let tasks = self.tasks.lock().await;
        let reminders = self.reminders.lock().await;
        let notes = self.notes.lock().await;

        Summary::compute(
            events.get_all(),
            contacts.get_all(),
            tasks.get_all(),
            reminders.get_all(),
            notes.get_all(),
            today,
        )
    }
}

fn shared<R: crate::traits::Record>(storage: &KeyValueStore) -> SharedCollection<R> {
    Arc::new(Mutex::new(CollectionStore::new(storage.clone())))
}
