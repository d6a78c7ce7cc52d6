/// Claim Engine — Time and Event Identity
///
/// Every history event gets `now` and a fresh id from a `Clock`.
/// Hosts use `SystemClock`; deterministic runs use `SteppingClock`.

use std::sync::atomic::{AtomicU64, Ordering};

use time::{Duration, OffsetDateTime};

/// Source of timestamps and unique event ids.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
    fn next_event_id(&self) -> String;
}

/// Wall-clock time and ULID event ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn next_event_id(&self) -> String {
        format!("evt_{}", ulid::Ulid::new().to_string().to_lowercase())
    }
}

/// Starts at a fixed instant and advances by `step` on every `now()`.
/// Ids are `evt_000001`, `evt_000002`, ...
#[derive(Debug)]
pub struct SteppingClock {
    start: OffsetDateTime,
    step: Duration,
    ticks: AtomicU64,
    ids: AtomicU64,
}

impl SteppingClock {
    pub fn new(start: OffsetDateTime, step: Duration) -> Self {
        Self {
            start,
            step,
            ticks: AtomicU64::new(0),
            ids: AtomicU64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> OffsetDateTime {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        let tick = i32::try_from(tick).unwrap_or(i32::MAX);
        self.start.saturating_add(self.step.saturating_mul(tick))
    }

    fn next_event_id(&self) -> String {
        let n = self.ids.fetch_add(1, Ordering::SeqCst) + 1;
        format!("evt_{:06}", n)
    }
}
