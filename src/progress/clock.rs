//! Clocks for the frame loop
//!
//! All simulator timing reads one authoritative clock. `now()` is a
//! monotonic offset from the clock's own origin.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall clock backed by `Instant`
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Speeds up (or slows down) another clock
pub struct ScaledClock {
    inner: Arc<dyn Clock>,
    scale: f64,
}

impl ScaledClock {
    /// 2.0 runs twice as fast. Readings saturate at `Duration::MAX`, and a
    /// non-positive scale pins the clock at zero.
    pub fn new(inner: Arc<dyn Clock>, scale: f64) -> Self {
        Self { inner, scale }
    }
}

impl Clock for ScaledClock {
    fn now(&self) -> Duration {
        let scaled = self.inner.now().as_secs_f64() * self.scale;
        Duration::try_from_secs_f64(scaled).unwrap_or(if scaled > 0.0 {
            Duration::MAX
        } else {
            Duration::ZERO
        })
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by `by`, saturating at `u64::MAX` nanoseconds
    pub fn advance(&self, by: Duration) {
        let by = saturating_nanos(by);
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(by))
            });
    }

    pub fn set(&self, to: Duration) {
        self.nanos.store(saturating_nanos(to), Ordering::SeqCst);
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}
