//! Address - Opaque participant identifier
//!
//! Lenders, borrowers and the administrator are all identified by an
//! address. The empty address is the zero address: it never belongs to a
//! participant and marks the default loan record returned for unknown ids.

use serde::{Deserialize, Serialize};

/// Participant address
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create an address from any string-like identifier
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The zero address
    pub fn zero() -> Self {
        Self::default()
    }

    /// Check for the zero address
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            write!(f, "<zero>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}
