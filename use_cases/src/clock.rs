use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

/// Source of "now", injected so refund tiers and pooling windows stay
/// testable against a pinned instant.
#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
