//! Participant Registry
//!
//! Two independent membership sets. An address may be a lender, a borrower,
//! both, or neither. Registration is self-service, idempotent and permanent.

use std::sync::Arc;

use dashmap::DashSet;
use lendledger_common::Address;
use tracing::info;

use crate::events::{EventSink, LoanEvent};

/// Lender and borrower membership sets
pub struct ParticipantRegistry {
    lenders: DashSet<Address>,
    borrowers: DashSet<Address>,
    events: Arc<dyn EventSink>,
}

impl ParticipantRegistry {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            lenders: DashSet::new(),
            borrowers: DashSet::new(),
            events,
        }
    }

    /// Add the caller to the lender set. Always succeeds and always notifies.
    pub fn register_lender(&self, caller: &Address) {
        let newly_added = self.lenders.insert(caller.clone());
        info!(address = %caller, newly_added, "lender registered");
        self.events.emit(LoanEvent::LenderRegistered {
            address: caller.clone(),
        });
    }

    /// Add the caller to the borrower set. Always succeeds and always notifies.
    pub fn register_borrower(&self, caller: &Address) {
        let newly_added = self.borrowers.insert(caller.clone());
        info!(address = %caller, newly_added, "borrower registered");
        self.events.emit(LoanEvent::BorrowerRegistered {
            address: caller.clone(),
        });
    }

    pub fn is_lender(&self, address: &Address) -> bool {
        self.lenders.contains(address)
    }

    pub fn is_borrower(&self, address: &Address) -> bool {
        self.borrowers.contains(address)
    }

    pub fn lender_count(&self) -> usize {
        self.lenders.len()
    }

    pub fn borrower_count(&self) -> usize {
        self.borrowers.len()
    }
}
