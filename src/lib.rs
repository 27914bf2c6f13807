//! This crate provides local persistence for a personal organizer.
//!
//! Events, contacts, tasks, reminders and notes are each kept in a [`CollectionStore`](collection::CollectionStore),
//! that mirrors an in-memory list to one key of a [`KeyValueStore`](storage::KeyValueStore).
//!
//! The `KeyValueStore` hides which backend is used: a browser-like synchronous store, or an async device store.
//! The backend is picked once, from the [`Config`](config::Config). \
//! An [`Organizer`] builds the five collections on top of a single store, and can compute the dashboard [`Summary`](dashboard::Summary).
//!
//! None of the public operations return errors: storage failures are logged (using the `log::*` macros) and turned into safe defaults.

#[macro_use]
pub mod record;
pub use record::RecordId;
pub mod traits;

pub mod config;
pub mod storage;
pub mod collection;

mod event;
pub use event::Event;
mod contact;
pub use contact::Contact;
mod task;
pub use task::Task;
mod reminder;
pub use reminder::Reminder;
pub mod note;
pub use note::Note;

pub mod organizer;
pub use organizer::Organizer;

pub mod dashboard;
pub mod diagnostics;
pub mod mock_behaviour;
pub mod utils;
