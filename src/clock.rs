//! Clock Module
//!
//! Monotonic time source used for entry timestamps and idle expiry.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic timestamps.
pub trait Clock {
    fn now(&self) -> Instant;
}

// == System Clock ==
/// Reads `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// == Mock Clock ==
/// Manually advanced clock for deterministic expiry tests.
///
/// Clones share the same offset, so a test can keep one handle and give
/// another to the cache.
#[derive(Debug, Clone)]
pub struct MockClock {
    base: Instant,
    offset: Rc<Cell<Duration>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}
