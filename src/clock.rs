use std::time::Instant;

/// Milliseconds since the clock's origin. Monotonic within one process.
pub type Timestamp = u64;

/// Source of session timestamps
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Monotonic clock anchored at construction time
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }
}

/// Signed difference `to - from` clamped at zero
pub fn elapsed_between(from: Timestamp, to: Timestamp) -> u64 {
    to.saturating_sub(from)
}
