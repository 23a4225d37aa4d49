//! Time source for the engine
//!
//! The only time-dependent rule is early-payoff proration, which reads the
//! clock once per call.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use lendledger_common::{LendingError, Result};
use parking_lot::RwLock;

/// Wall-clock-like time source
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current time as Unix seconds
    fn unix_seconds(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and scenario replay
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Start at the given Unix second, falling back to the epoch when out of range
    pub fn at_unix(seconds: i64) -> Self {
        let start = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .unwrap_or_default();
        Self::new(start)
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.write() = to;
    }

    /// Move the clock by `by`; fails without moving when the result is out of range
    pub fn advance(&self, by: TimeDelta) -> Result<()> {
        let mut now = self.now.write();
        *now = now
            .checked_add_signed(by)
            .ok_or(LendingError::Overflow)?;
        Ok(())
    }

    pub fn advance_days(&self, days: i64) -> Result<()> {
        let by = TimeDelta::try_days(days).ok_or(LendingError::Overflow)?;
        self.advance(by)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}
