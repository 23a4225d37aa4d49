//! # Lendledger Common
//!
//! Shared types and errors for the Lendledger peer-to-peer lending ledger.
//!
//! ## Core Types
//!
//! - [`Address`]: Opaque participant identifier (lenders, borrowers, the admin)
//! - [`Amount`]: Exact unsigned amount of credit or native currency
//! - [`LoanId`]: Monotonic loan identifier, starting at 1
//! - [`FeeBps`]: Platform fee in basis points, capped at 10%
//! - [`CreditAccount`]: Per-address credit balance record
//!
//! ## Errors
//!
//! - [`LendingError`]: Top-level error, nesting the authorization,
//!   precondition, transfer and ledger taxonomies

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{AuthError, LedgerError, LendingError, PreconditionError, Result, TransferError};
pub use types::{
    address::Address,
    amount::Amount,
    credit_account::CreditAccount,
    fee::FeeBps,
    loan_id::LoanId,
};

/// Lendledger version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seconds in one day of accrued interest
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Early payoff prorates interest over at most this many days
pub const EARLY_PAYOFF_MAX_DAYS: u64 = 30;

/// Basis-point scale (10_000 = 100%)
pub const BPS_SCALE: u16 = 10_000;

/// Highest platform fee the admin may configure (10%)
pub const MAX_FEE_BPS: u16 = 1_000;

/// Platform fee applied until the admin changes it (2%)
pub const DEFAULT_FEE_BPS: u16 = 200;
