//! # Lendledger Engine
//!
//! Peer-to-peer loan engine: an operator originates loans on behalf of
//! registered lenders and borrowers, borrowers repay in native currency, and
//! settled loans mint the lender's proceeds back as credit.
//!
//! ## Components
//!
//! - **Registry**: lender and borrower membership sets
//! - **Loan**: loan record, installment schedule, early-payoff proration, settlement split
//! - **Engine**: the loan state machine, treasury and admin controls
//! - **Collaborators**: credit ledger, certificate issuer and native bank interfaces
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       LendingEngine                          │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌────────┐  │
//! │  │  Registry  │  │ LoanStore  │  │  Treasury  │  │ Guard  │  │
//! │  └────────────┘  └────────────┘  └────────────┘  └────────┘  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  CreditLedger   CertificateIssuer   NativeBank   Clock  Sink │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod clock;
pub mod collaborators;
pub mod config;
pub mod engine;
pub mod environment;
pub mod events;
pub mod guard;
pub mod loan;
pub mod registry;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collaborators::{
    Certificate, CertificateIssuer, CreditLedger, InMemoryCertificateIssuer, InMemoryCreditLedger,
    InMemoryNativeBank, NativeBank,
};
pub use config::EngineConfig;
pub use engine::{Collaborators, EngineSnapshot, LendingEngine};
pub use environment::InMemoryEnvironment;
pub use events::{EventLog, EventRecord, EventSink, LoanEvent};
pub use guard::{GuardToken, OperationGuard};
pub use loan::{EarlyPayoffQuote, Loan, LoanTerms, Settlement};
pub use registry::ParticipantRegistry;
pub use store::{InMemoryLoanStore, LoanStore};

pub use lendledger_common::{
    Address, Amount, AuthError, FeeBps, LedgerError, LendingError, LoanId, PreconditionError,
    Result, TransferError,
};
