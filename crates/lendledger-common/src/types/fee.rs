//! Platform fee in basis points
//!
//! The fee is charged on the realized interest of a settled loan, never on
//! the principal. 1 basis point = 0.01%; the admin may set at most 1000 (10%).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PreconditionError, Result};
use crate::types::amount::Amount;
use crate::{BPS_SCALE, DEFAULT_FEE_BPS, MAX_FEE_BPS};

/// Bounded basis-point fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct FeeBps(u16);

impl FeeBps {
    /// Highest configurable fee
    pub const MAX: FeeBps = FeeBps(MAX_FEE_BPS);

    /// Fee before any admin update
    pub const DEFAULT: FeeBps = FeeBps(DEFAULT_FEE_BPS);

    pub const ZERO: FeeBps = FeeBps(0);

    /// Validate a raw basis-point value against the cap
    pub fn new(bps: u16) -> Result<Self> {
        if bps > MAX_FEE_BPS {
            return Err(PreconditionError::FeeAboveCap {
                requested: bps,
                cap: MAX_FEE_BPS,
            }
            .into());
        }
        Ok(Self(bps))
    }

    pub const fn bps(self) -> u16 {
        self.0
    }

    /// `floor(interest * bps / 10_000)`
    pub fn apply(self, interest: Amount) -> Result<Amount> {
        interest.mul_div_floor(u128::from(self.0), u128::from(BPS_SCALE))
    }

    /// Fee as a percentage, e.g. 200bp -> 2.00
    pub fn as_percent(self) -> Decimal {
        Decimal::new(i64::from(self.0), 2)
    }
}

impl Default for FeeBps {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u16> for FeeBps {
    type Error = crate::error::LendingError;

    fn try_from(value: u16) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FeeBps> for u16 {
    fn from(fee: FeeBps) -> Self {
        fee.0
    }
}

impl std::fmt::Display for FeeBps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}bp", self.0)
    }
}
