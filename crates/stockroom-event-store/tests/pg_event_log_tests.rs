//! Integration tests for `PgEventLog`.
//!
//! These need a running PostgreSQL reachable through `DATABASE_URL`; run
//! them with `cargo test -- --ignored`.

use chrono::Utc;
use sqlx::PgPool;
use stockroom_core::error::DomainError;
use stockroom_core::event_log::{EventLog, StoredEvent};
use stockroom_event_store::pg_event_log::PgEventLog;
use uuid::Uuid;

/// Helper to build a `StoredEvent` with sensible defaults.
fn make_stored_event(aggregate_id: Uuid, sequence_number: i64) -> StoredEvent {
    StoredEvent {
        event_id: Uuid::new_v4(),
        aggregate_id,
        aggregate_type: "inventory_item".to_owned(),
        event_type: "TestEvent".to_string(),
        payload: serde_json::json!({"key": "value"}),
        sequence_number,
        correlation_id: Uuid::new_v4(),
        causation_id: Uuid::new_v4(),
        occurred_at: Utc::now(),
    }
}

// --- read_stream ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_read_stream_returns_empty_vec_for_nonexistent_aggregate(pool: PgPool) {
    let log = PgEventLog::new(pool);

    let events = log.read_stream(Uuid::new_v4()).await.unwrap();

    assert!(events.is_empty());
}

// --- append_to_stream + read_stream round-trip ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_append_and_read_single_event(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let aggregate_id = Uuid::new_v4();
    let event = make_stored_event(aggregate_id, 1);
    let expected = event.clone();

    log.append_to_stream(aggregate_id, 0, &[event]).await.unwrap();

    let loaded = log.read_stream(aggregate_id).await.unwrap();
    assert_eq!(loaded.len(), 1);

    let e = &loaded[0];
    assert_eq!(e.event_id, expected.event_id);
    assert_eq!(e.aggregate_id, aggregate_id);
    assert_eq!(e.aggregate_type, expected.aggregate_type);
    assert_eq!(e.event_type, expected.event_type);
    assert_eq!(e.payload, expected.payload);
    assert_eq!(e.sequence_number, 1);
    assert_eq!(e.correlation_id, expected.correlation_id);
    assert_eq!(e.causation_id, expected.causation_id);
    // PostgreSQL TIMESTAMPTZ has microsecond precision.
    assert_eq!(
        e.occurred_at.timestamp_micros(),
        expected.occurred_at.timestamp_micros()
    );
}

// --- concurrency ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_expected_version_is_rejected(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let aggregate_id = Uuid::new_v4();

    log.append_to_stream(
        aggregate_id,
        0,
        &[
            make_stored_event(aggregate_id, 1),
            make_stored_event(aggregate_id, 2),
        ],
    )
    .await
    .unwrap();

    // Sequence numbers don't collide, but the version check must still reject.
    let result = log
        .append_to_stream(aggregate_id, 0, &[make_stored_event(aggregate_id, 3)])
        .await;

    match result {
        Err(DomainError::ConcurrencyConflict {
            aggregate_id: conflict_agg_id,
            expected,
            actual,
        }) => {
            assert_eq!(conflict_agg_id, aggregate_id);
            assert_eq!(expected, 0);
            assert_eq!(actual, 2);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }
    assert_eq!(log.read_stream(aggregate_id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_colliding_sequence_number_reports_stream_version(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let aggregate_id = Uuid::new_v4();
    log.append_to_stream(
        aggregate_id,
        0,
        &[
            make_stored_event(aggregate_id, 1),
            make_stored_event(aggregate_id, 2),
        ],
    )
    .await
    .unwrap();

    // Right expected version, but the batch reuses sequence number 1.
    let result = log
        .append_to_stream(aggregate_id, 2, &[make_stored_event(aggregate_id, 1)])
        .await;

    match result {
        Err(DomainError::ConcurrencyConflict {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 2);
            assert_eq!(actual, 2);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }
    assert_eq!(log.read_stream(aggregate_id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_appends_exactly_one_wins(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let aggregate_id = Uuid::new_v4();
    let first = [make_stored_event(aggregate_id, 1)];
    let second = [
        make_stored_event(aggregate_id, 1),
        make_stored_event(aggregate_id, 2),
    ];

    let (a, b) = tokio::join!(
        log.append_to_stream(aggregate_id, 0, &first),
        log.append_to_stream(aggregate_id, 0, &second),
    );

    assert_eq!(u8::from(a.is_ok()) + u8::from(b.is_ok()), 1);
    let a_won = a.is_ok();
    let loser = if a_won { b.unwrap_err() } else { a.unwrap_err() };
    assert!(loser.is_concurrency_conflict());
    let expected_len = if a_won { 1 } else { 2 };
    assert_eq!(log.read_stream(aggregate_id).await.unwrap().len(), expected_len);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_sequential_appends_with_correct_expected_version(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let aggregate_id = Uuid::new_v4();

    log.append_to_stream(
        aggregate_id,
        0,
        &[
            make_stored_event(aggregate_id, 1),
            make_stored_event(aggregate_id, 2),
        ],
    )
    .await
    .unwrap();
    log.append_to_stream(
        aggregate_id,
        2,
        &[
            make_stored_event(aggregate_id, 3),
            make_stored_event(aggregate_id, 4),
        ],
    )
    .await
    .unwrap();

    let loaded = log.read_stream(aggregate_id).await.unwrap();
    assert_eq!(loaded.len(), 4);
    for (i, event) in loaded.iter().enumerate() {
        assert_eq!(event.sequence_number, i64::try_from(i + 1).unwrap());
    }
}

// --- read_all ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_read_all_returns_events_in_commit_order(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let agg_a = Uuid::new_v4();
    let agg_b = Uuid::new_v4();
    let a1 = make_stored_event(agg_a, 1);
    let b1 = make_stored_event(agg_b, 1);
    let a2 = make_stored_event(agg_a, 2);

    log.append_to_stream(agg_a, 0, &[a1.clone()]).await.unwrap();
    log.append_to_stream(agg_b, 0, &[b1.clone()]).await.unwrap();
    log.append_to_stream(agg_a, 1, &[a2.clone()]).await.unwrap();

    let ids: Vec<Uuid> = log
        .read_all()
        .await
        .unwrap()
        .iter()
        .map(|e| e.event_id)
        .collect();
    assert_eq!(ids, vec![a1.event_id, b1.event_id, a2.event_id]);
}

// --- edge cases ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_append_empty_events_is_noop(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let aggregate_id = Uuid::new_v4();

    log.append_to_stream(aggregate_id, 0, &[]).await.unwrap();

    assert!(log.read_stream(aggregate_id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_complex_json_payload_round_trip(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let aggregate_id = Uuid::new_v4();
    let complex_payload = serde_json::json!({
        "nested": {"key": "value", "number": 42},
        "array": [1, "two", null, true, false],
        "empty_object": {},
    });
    let mut event = make_stored_event(aggregate_id, 1);
    event.payload = complex_payload.clone();

    log.append_to_stream(aggregate_id, 0, &[event]).await.unwrap();

    let loaded = log.read_stream(aggregate_id).await.unwrap();
    assert_eq!(loaded[0].payload, complex_payload);
}
