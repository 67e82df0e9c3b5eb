#[path = "../src/db.rs"]
mod db;
#[path = "../src/store.rs"]
mod store;

use serde_json::json;
use std::cell::Cell;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use store::Store;

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

#[test]
fn missing_key_returns_default() {
    let workspace = temp_dir("classtrack-store-miss");
    let store = Store::open(&workspace).expect("open store");
    let v: Vec<i64> = store.read_or("nothing-here", vec![7]);
    assert_eq!(v, vec![7]);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn write_is_visible_to_next_read() {
    let workspace = temp_dir("classtrack-store-write");
    let store = Store::open(&workspace).expect("open store");
    store.write("k", &json!({ "a": [1, 2, 3] }));
    let v: serde_json::Value = store.read_or("k", json!(null));
    assert_eq!(v, json!({ "a": [1, 2, 3] }));

    store.write("k", &json!("second"));
    let v: String = store.read_or("k", String::new());
    assert_eq!(v, "second");
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn lazy_default_runs_only_on_miss() {
    let workspace = temp_dir("classtrack-store-lazy");
    let store = Store::open(&workspace).expect("open store");
    store.write("k", &5u32);

    let calls = Cell::new(0);
    let v: u32 = store.read("k", || {
        calls.set(calls.get() + 1);
        0
    });
    assert_eq!(v, 5);
    assert_eq!(calls.get(), 0);

    let v: u32 = store.read("other", || {
        calls.set(calls.get() + 1);
        42
    });
    assert_eq!(v, 42);
    assert_eq!(calls.get(), 1);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn unparseable_value_returns_default() {
    let workspace = temp_dir("classtrack-store-corrupt");
    let store = Store::open(&workspace).expect("open store");
    let conn = db::open_db(&workspace).expect("open db");
    db::kv_put(&conn, "k", "{not json", "someone-else").expect("raw put");

    let v: Vec<String> = store.read_or("k", vec!["fallback".to_string()]);
    assert_eq!(v, vec!["fallback".to_string()]);

    // Wrong type is treated the same way.
    store.write("n", &json!({ "x": 1 }));
    let v: u64 = store.read_or("n", 9);
    assert_eq!(v, 9);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn subscription_reports_foreign_writes_only() {
    let workspace = temp_dir("classtrack-store-watch");
    let mine = Store::open(&workspace).expect("open store");
    let theirs = Store::open(&workspace).expect("open second store");
    assert_ne!(mine.origin(), theirs.origin());

    let mut sub = mine.subscribe("roster");
    assert_eq!(sub.key(), "roster");
    assert_eq!(mine.poll::<serde_json::Value>(&mut sub), None);

    mine.write("roster", &json!([1]));
    assert_eq!(mine.poll::<serde_json::Value>(&mut sub), None);

    theirs.write("roster", &json!([1, 2]));
    assert_eq!(mine.poll::<serde_json::Value>(&mut sub), Some(json!([1, 2])));
    // Delivered once.
    assert_eq!(mine.poll::<serde_json::Value>(&mut sub), None);

    // Last writer wins between polls.
    theirs.write("roster", &json!([3]));
    theirs.write("roster", &json!([4]));
    assert_eq!(mine.poll::<serde_json::Value>(&mut sub), Some(json!([4])));

    // Writes to other keys are not reported.
    theirs.write("other", &json!(true));
    assert_eq!(mine.poll::<serde_json::Value>(&mut sub), None);
    let _ = std::fs::remove_dir_all(workspace);
}
