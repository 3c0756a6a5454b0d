//! A thin clock abstraction so watermark arithmetic can be tested without
//! sleeping or mocking `chrono::Utc::now()` globally.

use chrono::{DateTime, Utc};

/// Source of the current instant. Production code uses [`SystemClock`];
/// tests inject a fixed instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed-instant clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
