//! Amount - Exact unsigned quantity of credit or native currency
//!
//! All loan arithmetic is integer arithmetic with floor division. Checked
//! operations surface overflow as [`LendingError::Overflow`] rather than
//! wrapping, and subtraction below zero is reported to the caller so it can
//! pick the right domain error.

use serde::{Deserialize, Serialize};

use crate::error::{LendingError, Result};

/// Unsigned amount in the smallest unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u128 {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Sum, failing on overflow
    pub fn checked_add(self, rhs: Amount) -> Result<Amount> {
        self.0
            .checked_add(rhs.0)
            .map(Amount)
            .ok_or(LendingError::Overflow)
    }

    /// Difference, `None` when `rhs` exceeds `self`
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    pub fn saturating_sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }

    /// Product with a scalar, failing on overflow
    pub fn checked_mul(self, factor: u128) -> Result<Amount> {
        self.0
            .checked_mul(factor)
            .map(Amount)
            .ok_or(LendingError::Overflow)
    }

    /// Floor division by a scalar; `None` for a zero divisor
    pub fn floor_div(self, divisor: u128) -> Option<Amount> {
        self.0.checked_div(divisor).map(Amount)
    }

    /// `floor(self * numerator / denominator)`
    pub fn mul_div_floor(self, numerator: u128, denominator: u128) -> Result<Amount> {
        let product = self.0.checked_mul(numerator).ok_or(LendingError::Overflow)?;
        product
            .checked_div(denominator)
            .map(Amount)
            .ok_or(LendingError::Overflow)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}
