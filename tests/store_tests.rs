/// History store behavior: remote reads through the mock backend, local
/// persistence in temporary directories.
mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{MockBackend, route, unreachable_client};
use mailtriage::aggregate;
use mailtriage::model::{ClassificationRecord, ClassifyResult};
use mailtriage::store::{HistoryStore, LocalStore, MAX_HISTORY_ITEMS, RemoteStore, StoreKind};

fn record(topic: &str) -> ClassificationRecord {
    ClassificationRecord {
        classification: Some("Produtivo".to_string()),
        key_topic: Some(topic.to_string()),
        ..Default::default()
    }
}

// ===========================================================================
// RemoteStore
// ===========================================================================

const HISTORY_JSON: &str = r#"[
    {"id": 2, "classification": "Produtivo", "key_topic": "Pagamento",
     "created_at": "2024-03-06T10:00:00", "email_snippet": "Preciso do boleto..."},
    {"id": 1, "classification": "Improdutivo", "key_topic": "Felicitação",
     "created_at": "2024-03-05T09:00:00"}
]"#;

#[test]
fn remote_load_keeps_backend_order() {
    let backend = MockBackend::start(vec![route("GET", "/history", 200, HISTORY_JSON)]);
    let store = RemoteStore::new(backend.client());

    let records = store.load();
    assert_eq!(store.kind(), StoreKind::Remote);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].key_topic.as_deref(), Some("Pagamento"));
    assert_eq!(records[0].email_snippet.as_deref(), Some("Preciso do boleto..."));
    assert_eq!(records[1].classification_label(), "Improdutivo");
}

#[test]
fn remote_load_failure_reads_as_empty() {
    let backend = MockBackend::start(vec![route(
        "GET",
        "/history",
        500,
        r#"{"error": "db down"}"#,
    )]);
    assert!(RemoteStore::new(backend.client()).load().is_empty());

    let backend = MockBackend::start(vec![route("GET", "/history", 200, r#"{"not": "a list"}"#)]);
    assert!(RemoteStore::new(backend.client()).load().is_empty());

    assert!(RemoteStore::new(unreachable_client()).load().is_empty());
}

#[test]
fn remote_append_sends_nothing() {
    let backend = MockBackend::start(Vec::new());
    let store = RemoteStore::new(backend.client());

    store.append(record("Pagamento")).unwrap();
    assert!(backend.requests().is_empty());
}

#[test]
fn remote_dashboard_passes_series_through() {
    let body = r#"{
        "all_data": [
            {"classification": "Produtivo", "key_topic": "Pagamento", "sentiment": "Negativo",
             "created_at": "2024-03-05T10:00:00"}
        ],
        "sentiments_over_time": {"2024-03-05": {"Negativo": 7}},
        "classifications_over_time": {"2024-03-05": {"Produtivo": 7}}
    }"#;
    let backend = MockBackend::start(vec![route("GET", "/dashboard/data", 200, body)]);
    let payload = RemoteStore::new(backend.client()).dashboard().unwrap();
    let views = aggregate::build_views(&payload);

    assert_eq!(views.total_records, 1);
    assert_eq!(views.sentiments_over_time["2024-03-05"]["Negativo"], 7);
    assert_eq!(views.classifications_over_time["2024-03-05"]["Produtivo"], 7);
}

#[test]
fn remote_dashboard_failure_is_an_error() {
    let backend = MockBackend::start(vec![route("GET", "/dashboard/data", 503, "{}")]);
    let err = RemoteStore::new(backend.client()).dashboard().unwrap_err();
    assert_eq!(err.to_string(), "Não foi possível carregar os dados do dashboard.");
}

// ===========================================================================
// LocalStore
// ===========================================================================

#[test]
fn local_store_keeps_twenty_most_recent() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("history.json"));

    for i in 0..25 {
        store.append(record(&format!("Tópico {i}"))).unwrap();
    }

    let records = store.load();
    assert_eq!(records.len(), MAX_HISTORY_ITEMS);
    let topics: Vec<_> = records.iter().map(|r| r.topic_label().to_string()).collect();
    let expected: Vec<_> = (5..25).rev().map(|i| format!("Tópico {i}")).collect();
    assert_eq!(topics, expected);
}

#[test]
fn local_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("history.json");

    LocalStore::new(&path).append(record("Suporte")).unwrap();
    let reopened = LocalStore::new(&path);
    assert_eq!(reopened.load()[0].key_topic.as_deref(), Some("Suporte"));
}

#[test]
fn local_store_replaces_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, "{ definitely not a list").unwrap();

    let store = LocalStore::new(&path);
    assert!(store.load().is_empty());
    store.append(record("Suporte")).unwrap();
    assert_eq!(store.load().len(), 1);
}

#[test]
fn local_dashboard_derives_series_by_day() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("history.json"));
    let start = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 0).unwrap();

    for (offset, sentiment) in [(0, "Positivo"), (1, "Negativo"), (60 * 24, "Positivo")] {
        let result = ClassifyResult {
            classification: Some("Produtivo".to_string()),
            sentiment: Some(sentiment.to_string()),
            key_topic: Some("Pagamento".to_string()),
            ..Default::default()
        };
        let created_at = start + Duration::minutes(offset);
        store
            .append(ClassificationRecord::from_submission(&result, Some("Olá"), created_at))
            .unwrap();
    }

    let views = aggregate::build_views(&store.dashboard().unwrap());
    assert_eq!(views.total_records, 3);
    assert_eq!(views.sentiments_over_time["2024-03-05"]["Positivo"], 1);
    // 00:00 on the 6th in UTC.
    assert_eq!(views.sentiments_over_time["2024-03-06"]["Negativo"], 1);
    assert_eq!(views.sentiments_over_time["2024-03-06"]["Positivo"], 1);
    assert_eq!(views.topic_counts[0].count, 3);
}
