//! External collaborators consumed by the engine
//!
//! - [`CreditLedger`]: mints, burns and reports credit balances
//! - [`CertificateIssuer`]: issues one non-fungible record per loan
//! - [`NativeBank`]: pushes native currency to an address
//!
//! Each interface comes with an in-memory implementation used by the CLI
//! scenario runner and the tests.

pub mod certificate;
pub mod credit_ledger;
pub mod native_bank;

pub use certificate::{Certificate, CertificateIssuer, InMemoryCertificateIssuer};
pub use credit_ledger::{CreditLedger, InMemoryCreditLedger};
pub use native_bank::{InMemoryNativeBank, NativeBank};
