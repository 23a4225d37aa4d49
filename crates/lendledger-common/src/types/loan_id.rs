//! LoanId - Monotonic loan identifier

use serde::{Deserialize, Serialize};

/// Loan identifier. The first loan is 1; 0 is never allocated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(u64);

impl LoanId {
    /// First id handed out by a fresh engine
    pub const FIRST: LoanId = LoanId(1);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id allocated after this one
    pub fn next(self) -> Option<LoanId> {
        self.0.checked_add(1).map(LoanId)
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for LoanId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
