//! Error types for Lendledger
//!
//! Every failure aborts the whole in-flight operation. The variants follow
//! the taxonomy callers branch on: authorization, precondition, native
//! transfer and credit ledger failures.

use thiserror::Error;

use crate::types::{address::Address, amount::Amount, loan_id::LoanId};

/// Result type alias using LendingError
pub type Result<T> = std::result::Result<T, LendingError>;

/// Unified error type for Lendledger operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LendingError {
    // Caller lacks the role the operation requires
    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    // Loan or participant state forbids the operation
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    // Native-currency push payment failed
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    // Credit ledger collaborator failed
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Operation rejected: another protected operation is in progress")]
    Reentrant,

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Authorization errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{caller} is not the administrator")]
    NotAdmin { caller: Address },

    #[error("{caller} is not the borrower of loan {loan_id}")]
    NotBorrower { loan_id: LoanId, caller: Address },
}

/// Precondition errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Lender not registered: {0}")]
    LenderNotRegistered(Address),

    #[error("Borrower not registered: {0}")]
    BorrowerNotRegistered(Address),

    #[error("Insufficient credit: required {required}, available {available}")]
    InsufficientCredit { required: Amount, available: Amount },

    #[error("Loan {0} is not active")]
    LoanNotActive(LoanId),

    #[error("All installments of loan {0} are already paid")]
    InstallmentsComplete(LoanId),

    #[error("Payment mismatch: expected exactly {expected}, received {received}")]
    PaymentMismatch { expected: Amount, received: Amount },

    #[error("Fee {requested}bp exceeds cap of {cap}bp")]
    FeeAboveCap { requested: u16, cap: u16 },

    #[error("Nothing owed on loan {0}: prior payments cover the prorated total")]
    NothingOwed(LoanId),

    #[error("Installment count must be positive")]
    ZeroInstallments,

    #[error("Amount must be positive")]
    ZeroAmount,
}

/// Native-currency transfer errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Destination {to} rejected the transfer")]
    Rejected { to: Address },

    #[error("Insufficient treasury: required {required}, available {available}")]
    InsufficientTreasury { required: Amount, available: Amount },
}

/// Credit ledger errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance for {owner}: required {required}, available {available}")]
    InsufficientBalance {
        owner: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

impl LendingError {
    /// True for failures caused by the caller's role rather than loan state
    pub fn is_authorization(&self) -> bool {
        matches!(self, LendingError::Auth(_))
    }

    /// True for precondition failures
    pub fn is_precondition(&self) -> bool {
        matches!(self, LendingError::Precondition(_))
    }
}
