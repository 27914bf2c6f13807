//! Records must survive a restart, whatever the backend

use std::path::Path;

use chrono::NaiveDate;

use pocket_organizer::collection::CollectionStore;
use pocket_organizer::config::Config;
use pocket_organizer::storage::{KeyValueStore, Platform};
use pocket_organizer::traits::Record;
use pocket_organizer::{Contact, Event, Note, Organizer, RecordId, Reminder, Task};

fn config(platform: Platform, dir: &Path) -> Config {
    Config::new(platform, dir.to_path_buf())
}

fn some_contacts() -> Vec<Contact> {
    vec![
        Contact::new("Ana".into(), "5511999990000".into(), "ana@example.com".into(), "Rua A, 1".into(), "pessoal".into()),
        Contact::new("Bruno".into(), "5511999990001".into(), "bruno@example.com".into(), "Rua B, 2".into(), "trabalho".into()),
        Contact::new("Carla".into(), "5511999990002".into(), "carla@example.com".into(), "Rua C, 3".into(), "familia".into()),
    ]
}

async fn adds_survive_a_restart(platform: Platform) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();

    let added = {
        let storage = KeyValueStore::from_config(&config(platform, dir.path()));
        let mut contacts = CollectionStore::<Contact>::new(storage);
        contacts.load().await;
        for contact in some_contacts() {
            assert!(contacts.add(contact).await.persisted());
        }
        contacts.get_all().to_vec()
    };

    let storage = KeyValueStore::from_config(&config(platform, dir.path()));
    let mut contacts = CollectionStore::<Contact>::new(storage);
    let reloaded = contacts.load().await;
    assert_eq!(reloaded, &added[..]);
    let names: Vec<&str> = reloaded.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Ana", "Bruno", "Carla"]);
}

#[tokio::test]
async fn adds_survive_a_restart_on_web() {
    adds_survive_a_restart(Platform::Web).await;
}

#[tokio::test]
async fn adds_survive_a_restart_on_mobile() {
    adds_survive_a_restart(Platform::Mobile).await;
}

#[tokio::test]
async fn save_then_load_is_identity() {
    let _ = env_logger::builder().is_test(true).try_init();

    for platform in &[Platform::Web, Platform::Mobile] {
        let dir = tempfile::tempdir().unwrap();
        let storage = KeyValueStore::from_config(&config(*platform, dir.path()));

        let mut pinned = Note::new("Pinned".into(), "Shown first".into(), "pessoal".into());
        pinned.toggle_pinned();
        pinned.set_id(RecordId::from("n1"));
        let mut plain = Note::new("Plain".into(), "Shown after".into(), "casa".into());
        plain.set_id(RecordId::from("n2"));
        let original = vec![pinned, plain];

        let mut notes = CollectionStore::<Note>::new(storage.clone());
        assert!(notes.replace_all(original.clone()).await.persisted());

        let mut fresh = CollectionStore::<Note>::new(KeyValueStore::from_config(&config(*platform, dir.path())));
        assert_eq!(fresh.load().await, &original[..]);
    }
}

#[tokio::test]
async fn the_meeting_scenario() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let storage = KeyValueStore::from_config(&config(Platform::Mobile, dir.path()));

    let mut events = CollectionStore::<Event>::new(storage.clone());
    events.load().await;

    let meeting = Event::new("Meeting".into(), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), "10:30".into(), "alta".into());
    let id = {
        let mutation = events.add(meeting).await;
        assert_eq!(mutation.items().len(), 1);
        mutation.items()[0].id().clone()
    };
    assert!(id.is_empty() == false);

    let mut v2 = events.get(&id).unwrap().clone();
    v2.set_name("Meeting v2".into());
    {
        let mutation = events.update(v2).await;
        assert_eq!(mutation.items().len(), 1);
        assert_eq!(mutation.items()[0].name(), "Meeting v2");
    }

    assert!(events.delete(&id).await.items().is_empty());

    let mut fresh = CollectionStore::<Event>::new(KeyValueStore::from_config(&config(Platform::Mobile, dir.path())));
    assert!(fresh.load().await.is_empty());
}

#[tokio::test]
async fn clear_is_idempotent() {
    let _ = env_logger::builder().is_test(true).try_init();

    for platform in &[Platform::Web, Platform::Mobile] {
        let dir = tempfile::tempdir().unwrap();
        let organizer = Organizer::from_config(&config(*platform, dir.path()));
        organizer.load_all().await;

        organizer.tasks().lock().await.add(Task::new("Pay bills".into(), "Before Friday".into(), "casa".into(), "alta".into(), 0.5)).await;
        organizer.reminders().lock().await.add(Reminder::new("Pills".into(), "After lunch".into(), "medicamento".into(), "diario".into(), "13:00".into())).await;
        organizer.storage().set_item("not_ours", "keep me").await;

        assert!(organizer.storage().clear().await);
        let after_once = organizer.storage().get_all_keys().await;
        assert!(organizer.storage().clear().await);
        let after_twice = organizer.storage().get_all_keys().await;

        assert_eq!(after_once, vec!["not_ours".to_string()]);
        assert_eq!(after_once, after_twice);

        let mut tasks = CollectionStore::<Task>::new(organizer.storage().clone());
        assert!(tasks.load().await.is_empty());
    }
}

#[tokio::test]
async fn reads_data_written_by_the_previous_app() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let storage = KeyValueStore::from_config(&config(Platform::Web, dir.path()));

    let legacy = r#"[
        {"id":"1717000000000","name":"Show","description":"Jazz night","location":"Centro","time":"21:00","priority":"media","date":"2024-06-01","weather":"24°C","isImportant":true,"reminderMinutes":30},
        {"id":1717000000001,"name":"Lunch","description":"With Ana","location":"Home","time":"12:00","priority":"baixa","date":"2024-06-02","isImportant":false}
    ]"#;
    assert!(storage.set_item(Event::STORAGE_KEY, legacy).await);

    let mut events = CollectionStore::<Event>::new(storage);
    let loaded = events.load().await;
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].weather(), Some("24°C"));
    assert_eq!(loaded[0].reminder_minutes(), Some(30));
    assert_eq!(loaded[1].id().as_str(), "1717000000001");

    assert_eq!(events.delete("1717000000001").await.matched(), 1);
}
