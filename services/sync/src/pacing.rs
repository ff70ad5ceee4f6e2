//! Cooperative backpressure between calls to the external systems.
//!
//! The sources throttle (or ban) callers that burst, so the delays
//! here are part of the contract with them, not tuning knobs. Each
//! call site holds its own pacer and ticks it immediately before the
//! network call.

use std::time::Duration;

use tokio::time::Instant;

/// Between page fetches of any paginated endpoint.
pub const PAGE_DELAY: Duration = Duration::from_millis(500);

/// Between meetings when walking a Zoom account's report.
pub const MEETING_DELAY: Duration = Duration::from_millis(300);

/// Between per-student Educativa calls.
pub const STUDENT_DELAY: Duration = Duration::from_millis(250);

/// Per-student calls are chunked to bound burst rate.
pub const STUDENT_BATCH: usize = 25;

/// Pause between per-student batches.
pub const BATCH_PAUSE: Duration = Duration::from_secs(2);

/// Fixed-interval pacer. The first tick passes immediately; every
/// later tick sleeps whatever remains of the interval since the
/// previous one.
pub struct FixedInterval {
    interval: Duration,
    last: Option<Instant>,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub async fn tick(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }
}
