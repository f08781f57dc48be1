//! Basic Operation Tests
//!
//! Single-caller behaviour of the facade:
//! - increments of absent, integer and numeric-string keys
//! - pure update functions
//! - unwatched batches

use crate::*;
use std::time::Duration;

#[test]
fn test_incr_absent_key_starts_at_one() {
    let db = create_tally();
    assert_eq!(db.incr("watch_count").unwrap(), 1);
    assert_eq!(db.get("watch_count").unwrap(), Some(Value::Int(1)));
}

#[test]
fn test_incr_numeric_string() {
    let db = create_tally();
    db.set("score", "100").unwrap();

    assert_eq!(db.incr("score").unwrap(), 101);
    assert_eq!(db.get("score").unwrap(), Some(Value::Int(101)));
}

#[test]
fn test_incr_by_negative_delta() {
    let db = create_tally();
    db.set("score", 90).unwrap();

    assert_eq!(db.incr_by("score", 10).unwrap(), 100);
    assert_eq!(db.incr_by("score", -25).unwrap(), 75);
}

#[test]
fn test_incr_after_delete_restarts_from_zero() {
    let db = create_tally();
    db.set("k", 41).unwrap();
    db.delete("k").unwrap();

    assert_eq!(db.get("k").unwrap(), None);
    assert_eq!(db.incr("k").unwrap(), 1);
}

#[test]
fn test_get_int_of_absent_key() {
    let db = create_tally();
    assert_eq!(db.get_int("name").unwrap(), 0);
}

#[test]
fn test_incr_non_numeric_is_wrong_type() {
    let db = create_tally();
    db.set("name", "Golang").unwrap();

    let err = db.incr("name").unwrap_err();
    assert!(matches!(err, Error::WrongType { .. }));
    assert_eq!(db.get("name").unwrap(), Some(Value::from("Golang")));
}

#[test]
fn test_update_with_pure_function() {
    let db = create_tally();
    db.set("lang", "Go").unwrap();

    let committed = db
        .update("lang", |current| {
            let text = current.and_then(Value::as_str).unwrap_or_default();
            Ok(Some(Value::String(format!("{}lang", text))))
        })
        .unwrap();

    assert_eq!(committed.value, Some(Value::from("Golang")));
    assert_eq!(committed.attempts, 1);
    assert_eq!(db.get("lang").unwrap(), Some(Value::from("Golang")));
}

#[test]
fn test_update_returning_none_deletes() {
    let db = create_tally();
    db.set("k", 1).unwrap();

    db.update("k", |_| Ok(None)).unwrap();
    assert_eq!(db.get("k").unwrap(), None);
}

#[test]
fn test_update_error_leaves_value_untouched() {
    let db = create_tally();
    db.set("k", 1).unwrap();

    let err = db
        .update("k", |_| Err(Error::InvalidArgument("refused".into())))
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert_eq!(db.get("k").unwrap(), Some(Value::Int(1)));
}

#[test]
fn test_exec_transactional_pipeline() {
    let db = create_tally();
    let mut batch = Batch::new();
    batch.incr_by("tx_pipeline_counter", 1).set("tx_pipeline_label", "hot");

    let results = db.exec(batch).unwrap();

    assert_eq!(
        results,
        vec![Some(Value::Int(1)), Some(Value::from("hot"))]
    );
    assert_eq!(db.stats().batches, 1);
}

#[test]
fn test_builder_settings_apply() {
    let db = Tally::builder().max_attempts(3).build().unwrap();
    assert_eq!(db.config().max_attempts, 3);

    let err = Tally::builder().max_attempts(0).build().unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_builder_sub_millisecond_durations_round_up() {
    let db = Tally::builder()
        .deadline(Duration::from_micros(500))
        .commit_delay(Duration::from_micros(300))
        .build()
        .unwrap();

    assert_eq!(db.config().deadline(), Some(Duration::from_millis(1)));
    assert_eq!(db.store().config().commit_delay(), Some(Duration::from_millis(1)));
    assert!(format!("{:?}", db).starts_with("Tally"));
}

#[test]
fn test_with_injected_store() {
    let store = create_store();
    store.set("shared", 5).unwrap();

    let db = Tally::with_store(Arc::clone(&store));
    db.incr("shared").unwrap();

    assert_eq!(store.get(&Key::new("shared")).unwrap(), Some(Value::Int(6)));
}
