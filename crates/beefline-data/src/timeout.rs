//! Timeout configuration for listing requests.

use std::time::Duration;

/// Timeouts applied to the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection establishment.
    pub connect: Duration,
    /// Whole request including the body.
    pub total: Duration,
}

impl TimeoutConfig {
    pub fn new(connect: Duration, total: Duration) -> Self {
        Self { connect, total }
    }

    /// Derive the connect timeout from the total.
    pub fn from_total(total: Duration) -> Self {
        Self {
            connect: (total / 4).max(Duration::from_millis(1)),
            total,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_total(Duration::from_secs(10))
    }
}
