use std::sync::{Arc, Mutex};

use flowzi_core::{
    decode_documents, CoreError, DocumentRef, DocumentStore, FixedClock, FlagStore, GoalService,
    MoneyFormatter, NewGoal, SettingsService,
};
use flowzi_domain::{collections, Goal, IncomeFrequency, UserSettings};
use flowzi_storage::{JsonFlagStore, MemoryDocumentStore, MemoryFlagStore};
use serde_json::{json, Value};
use tempfile::tempdir;

fn fields(value: Value) -> flowzi_core::Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[test]
fn json_flags_survive_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("milestones.json");

    let store = JsonFlagStore::open(&path).expect("open");
    assert!(store.is_empty());
    store.set("milestone_g1_25", "true").expect("set flag");
    drop(store);

    let reopened = JsonFlagStore::open(&path).expect("reopen");
    assert_eq!(
        reopened.get("milestone_g1_25").expect("get").as_deref(),
        Some("true")
    );
    assert_eq!(reopened.get("milestone_g1_50").expect("get"), None);
    assert_eq!(reopened.len(), 1);
}

#[test]
fn corrupt_flag_file_is_reported() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("milestones.json");
    std::fs::write(&path, "not json").expect("write");
    assert!(matches!(
        JsonFlagStore::open(&path),
        Err(CoreError::FlagStore(_))
    ));
}

#[test]
fn memory_flags_list_keys() {
    let flags = MemoryFlagStore::new();
    flags.set("b", "true").unwrap();
    flags.set("a", "true").unwrap();
    assert_eq!(flags.keys(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn batch_delete_is_all_or_nothing() {
    let store = MemoryDocumentStore::new();
    let first = store
        .add_document(collections::TRANSACTIONS, fields(json!({"category": "Food"})))
        .unwrap();
    let second = store
        .add_document(collections::GOALS, fields(json!({"name": "Trip"})))
        .unwrap();
    let refs = vec![
        DocumentRef::new(collections::TRANSACTIONS, first),
        DocumentRef::new(collections::GOALS, second),
    ];

    store.set_offline(true);
    assert!(store.batch_delete(&refs).is_err());
    store.set_offline(false);
    assert_eq!(store.count(collections::TRANSACTIONS), 1);
    assert_eq!(store.count(collections::GOALS), 1);

    store.batch_delete(&refs).unwrap();
    assert_eq!(store.count(collections::TRANSACTIONS), 0);
    assert_eq!(store.count(collections::GOALS), 0);
}

#[test]
fn offline_store_reports_to_listeners() {
    let store = MemoryDocumentStore::new();
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    store
        .subscribe(
            collections::BILLS,
            Box::new(|_| {}),
            Box::new(move |err| sink.lock().unwrap().push(err.to_string())),
        )
        .unwrap();

    store.set_offline(true);
    assert_eq!(errors.lock().unwrap().len(), 1);
    assert!(store
        .subscribe(collections::BILLS, Box::new(|_| {}), Box::new(|_| {}))
        .is_err());
}

#[test]
fn clear_all_data_empties_collections_and_resets_settings() {
    let store = MemoryDocumentStore::new();
    let table = flowzi_domain::CurrencyTable::default();
    SettingsService::save_income(&store, "u1", &table, "GBP", 760.0, IncomeFrequency::Monthly)
        .unwrap();
    store
        .write_merge(collections::USERS, "u1", fields(json!({"theme": "dark", "currency": "GBP"})))
        .unwrap();
    for name in ["A", "B"] {
        GoalService::create(
            &store,
            &NewGoal::new(name, 100.0, 2),
            &MoneyFormatter::default(),
            &FixedClock::on(chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
        )
        .unwrap();
    }
    store
        .add_document(collections::BILLS, fields(json!({"name": "Rent", "amount": 1, "days": 2})))
        .unwrap();

    let removed = SettingsService::clear_all_data(&store, "u1").unwrap();
    assert_eq!(removed, 3);
    assert_eq!(store.count(collections::GOALS), 0);
    assert_eq!(store.count(collections::BILLS), 0);

    let users = store.list(collections::USERS).unwrap();
    let settings = SettingsService::find(&users, "u1").unwrap();
    assert_eq!(settings.monthly_income, 0.0);
    assert_eq!(settings.currency, "USD");
    assert_eq!(settings.theme, flowzi_domain::Theme::Dark);
    assert_eq!(users[0]["symbolPosition"], "before");
}

#[test]
fn goal_update_keeps_created_at() {
    let store = MemoryDocumentStore::new();
    let clock = FixedClock::on(chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    let formatter = MoneyFormatter::default();
    let goal = GoalService::create(&store, &NewGoal::new("Bike", 300.0, 3), &formatter, &clock)
        .unwrap();

    GoalService::update(&store, &goal.id, &NewGoal::new("E-Bike", 900.0, 6), &formatter).unwrap();

    let goals: Vec<Goal> = decode_documents(collections::GOALS, store.list(collections::GOALS).unwrap());
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].name, "E-Bike");
    assert_eq!(goals[0].category, "E-Bike");
    assert_eq!(goals[0].target_amount, 900.0);
    assert_eq!(goals[0].created_at, goal.created_at);
}

#[test]
fn settings_defaults_are_written_once() {
    let store = MemoryDocumentStore::new();
    assert!(SettingsService::ensure_defaults(&store, "u9").unwrap());
    let users = store.list(collections::USERS).unwrap();
    assert_eq!(SettingsService::find(&users, "u9"), Some(UserSettings::default()));

    store
        .write_merge(collections::USERS, "u9", fields(json!({"currency": "EUR"})))
        .unwrap();
    assert!(!SettingsService::ensure_defaults(&store, "u9").unwrap());
    let users = store.list(collections::USERS).unwrap();
    assert_eq!(SettingsService::find(&users, "u9").unwrap().currency, "EUR");
}
