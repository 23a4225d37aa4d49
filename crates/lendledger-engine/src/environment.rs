//! In-memory wiring of every collaborator
//!
//! Keeps concrete handles so callers can inspect balances, receipts,
//! certificates and events after driving the engine.

use std::sync::Arc;

use crate::clock::ManualClock;
use crate::collaborators::{InMemoryCertificateIssuer, InMemoryCreditLedger, InMemoryNativeBank};
use crate::engine::Collaborators;
use crate::events::EventLog;
use crate::store::InMemoryLoanStore;

/// In-memory collaborators sharing one manual clock
#[derive(Clone)]
pub struct InMemoryEnvironment {
    pub credit_ledger: Arc<InMemoryCreditLedger>,
    pub certificates: Arc<InMemoryCertificateIssuer>,
    pub bank: Arc<InMemoryNativeBank>,
    pub clock: Arc<ManualClock>,
    pub events: Arc<EventLog>,
    pub store: Arc<InMemoryLoanStore>,
}

impl InMemoryEnvironment {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            credit_ledger: Arc::new(InMemoryCreditLedger::new()),
            certificates: Arc::new(InMemoryCertificateIssuer::new()),
            bank: Arc::new(InMemoryNativeBank::new()),
            clock: Arc::new(clock),
            events: Arc::new(EventLog::new()),
            store: Arc::new(InMemoryLoanStore::new()),
        }
    }

    /// Environment whose clock starts at the given Unix second
    pub fn starting_at(unix_seconds: i64) -> Self {
        Self::new(ManualClock::at_unix(unix_seconds))
    }

    /// Trait-object view handed to the engine
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            credit_ledger: self.credit_ledger.clone(),
            certificates: self.certificates.clone(),
            bank: self.bank.clone(),
            clock: self.clock.clone(),
            events: self.events.clone(),
            store: self.store.clone(),
        }
    }
}

impl Default for InMemoryEnvironment {
    fn default() -> Self {
        Self::new(ManualClock::default())
    }
}
