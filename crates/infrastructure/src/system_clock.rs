use chrono::{DateTime, FixedOffset, Utc};
use gatedeck_application::Clock;

/// Wall clock rendered in a fixed display offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Creates a clock for the given display offset.
    #[must_use]
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}
