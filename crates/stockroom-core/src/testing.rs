//! Counter aggregate and in-memory log shared by the core unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::AggregateRoot;
use crate::clock::Clock;
use crate::error::DomainError;
use crate::event::{DomainEvent, EventMetadata};
use crate::event_log::{EventLog, StoredEvent};

pub(crate) const OPENED: &str = "counter.opened";
pub(crate) const TALLIED: &str = "counter.tallied";
pub(crate) const CLOSED: &str = "counter.closed";

pub(crate) struct TestClock(DateTime<Utc>);

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn fixed_clock() -> TestClock {
    TestClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum CounterEventKind {
    Opened,
    Tallied { amount: i64 },
    Closed,
}

#[derive(Debug, Clone)]
pub(crate) struct CounterEvent {
    pub(crate) metadata: EventMetadata,
    pub(crate) kind: CounterEventKind,
}

impl DomainEvent for CounterEvent {
    fn event_type(&self) -> &'static str {
        match self.kind {
            CounterEventKind::Opened => OPENED,
            CounterEventKind::Tallied { .. } => TALLIED,
            CounterEventKind::Closed => CLOSED,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn from_stored(stored: &StoredEvent) -> Result<Self, DomainError> {
        let kind = serde_json::from_value(stored.payload.clone())
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;
        Ok(Self {
            metadata: EventMetadata::from_stored(stored),
            kind,
        })
    }
}

/// Builds a committed event with the given tag and sequence number.
pub(crate) fn counter_event(aggregate_id: Uuid, sequence_number: i64, tag: &str) -> CounterEvent {
    let kind = match tag {
        OPENED => CounterEventKind::Opened,
        TALLIED => CounterEventKind::Tallied { amount: 1 },
        _ => CounterEventKind::Closed,
    };
    CounterEvent {
        metadata: EventMetadata {
            event_id: Uuid::new_v4(),
            event_type: tag.to_owned(),
            aggregate_id,
            sequence_number,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: fixed_clock().now(),
        },
        kind,
    }
}

#[derive(Debug)]
pub(crate) struct Counter {
    id: Uuid,
    version: i64,
    pub(crate) total: i64,
    pub(crate) open: bool,
    uncommitted: Vec<CounterEvent>,
}

impl Counter {
    fn record(&mut self, kind: CounterEventKind, clock: &dyn Clock) {
        #[allow(clippy::cast_possible_wrap)]
        let sequence_number = self.version + self.uncommitted.len() as i64 + 1;
        let mut event = counter_event(self.id, sequence_number, OPENED);
        event.kind = kind;
        event.metadata.event_type = event.event_type().to_owned();
        event.metadata.occurred_at = clock.now();
        self.when(&event.kind);
        self.uncommitted.push(event);
    }

    fn when(&mut self, kind: &CounterEventKind) {
        match kind {
            CounterEventKind::Opened => self.open = true,
            CounterEventKind::Tallied { amount } => self.total += amount,
            CounterEventKind::Closed => self.open = false,
        }
    }

    pub(crate) fn open(&mut self, clock: &dyn Clock) {
        self.record(CounterEventKind::Opened, clock);
    }

    pub(crate) fn tally(&mut self, amount: i64, clock: &dyn Clock) -> Result<(), DomainError> {
        if !self.open {
            return Err(DomainError::Validation("counter is closed".into()));
        }
        self.record(CounterEventKind::Tallied { amount }, clock);
        Ok(())
    }

    pub(crate) fn close(&mut self, clock: &dyn Clock) -> Result<(), DomainError> {
        if !self.open {
            return Err(DomainError::Validation("counter is closed".into()));
        }
        self.record(CounterEventKind::Closed, clock);
        Ok(())
    }
}

impl AggregateRoot for Counter {
    type Event = CounterEvent;

    const AGGREGATE_TYPE: &'static str = "counter";

    fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            total: 0,
            open: false,
            uncommitted: Vec::new(),
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &CounterEvent) {
        self.when(&event.kind);
        self.version = event.metadata.sequence_number;
    }

    fn uncommitted_events(&self) -> &[CounterEvent] {
        &self.uncommitted
    }

    #[allow(clippy::cast_possible_wrap)]
    fn mark_events_committed(&mut self) {
        self.version += self.uncommitted.len() as i64;
        self.uncommitted.clear();
    }
}

/// Minimal compare-and-append log.
#[derive(Debug, Default)]
pub(crate) struct MemoryLog {
    streams: Mutex<HashMap<Uuid, Vec<StoredEvent>>>,
    all: Mutex<Vec<StoredEvent>>,
    append_calls: Mutex<usize>,
    failing: bool,
}

impl MemoryLog {
    pub(crate) fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub(crate) fn stream_len(&self, aggregate_id: Uuid) -> usize {
        self.streams
            .lock()
            .unwrap()
            .get(&aggregate_id)
            .map_or(0, Vec::len)
    }

    pub(crate) fn append_calls(&self) -> usize {
        *self.append_calls.lock().unwrap()
    }

    pub(crate) fn retag_stream(&self, aggregate_id: Uuid, aggregate_type: &str) {
        if let Some(stream) = self.streams.lock().unwrap().get_mut(&aggregate_id) {
            for event in stream {
                event.aggregate_type = aggregate_type.to_owned();
            }
        }
    }
}

#[async_trait]
impl EventLog for MemoryLog {
    async fn read_stream(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        if self.failing {
            return Err(DomainError::Infrastructure("connection refused".into()));
        }
        Ok(self
            .streams
            .lock()
            .unwrap()
            .get(&aggregate_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_to_stream(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        *self.append_calls.lock().unwrap() += 1;
        if self.failing {
            return Err(DomainError::Infrastructure("connection refused".into()));
        }
        let mut streams = self.streams.lock().unwrap();
        let stream = streams.entry(aggregate_id).or_default();
        let actual = stream.len() as i64;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }
        stream.extend_from_slice(events);
        self.all.lock().unwrap().extend_from_slice(events);
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.all.lock().unwrap().clone())
    }
}
