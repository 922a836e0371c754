//! Timing and verification settings.

use crate::error::{Error, Result};
use std::time::Duration;

/// Default wait after triggering a write transaction.
pub const DEFAULT_WRITE_SETTLE: Duration = Duration::from_millis(1);
/// Default wait after triggering a read transaction, before DATA is sampled.
pub const DEFAULT_READ_SETTLE: Duration = Duration::from_millis(2);
/// Default period of the input polling loop.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// SMBus transaction settings.
///
/// The settle delays are the only completion contract of the bus driver:
/// nothing is polled unless `verify_status` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Blocking wait after a write transaction is triggered.
    pub write_settle: Duration,
    /// Blocking wait after a read transaction is triggered.
    pub read_settle: Duration,
    /// Read the host status register once after the settle delay and fail
    /// the transaction if it reports an error or no completion.
    pub verify_status: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            write_settle: DEFAULT_WRITE_SETTLE,
            read_settle: DEFAULT_READ_SETTLE,
            verify_status: false,
        }
    }
}

impl BusConfig {
    /// Default timing with host status verification enabled.
    pub fn verified() -> Self {
        Self {
            verify_status: true,
            ..Self::default()
        }
    }

    /// No settle delays. Only meaningful against a simulated port.
    pub fn immediate() -> Self {
        Self {
            write_settle: Duration::ZERO,
            read_settle: Duration::ZERO,
            verify_status: false,
        }
    }
}

/// Input polling settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Time between two sampling cycles.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollConfig {
    /// Creates a polling config, rejecting a zero interval.
    pub fn with_interval(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::ArgumentOutOfRange(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(Self { interval })
    }
}
