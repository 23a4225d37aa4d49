//! Native-currency push payments
//!
//! The engine holds native currency in its treasury and pays out through a
//! [`NativeBank`]. A failed push aborts the enclosing operation.

use dashmap::{DashMap, DashSet};
use lendledger_common::{Address, Amount, TransferError};
use tracing::{debug, warn};

/// Synchronous push payment to an address
pub trait NativeBank: Send + Sync {
    fn send(&self, to: &Address, amount: Amount) -> Result<(), TransferError>;
}

/// Records what each address received; selected addresses refuse funds
#[derive(Default)]
pub struct InMemoryNativeBank {
    received: DashMap<Address, Amount>,
    rejecting: DashSet<Address>,
}

impl InMemoryNativeBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `address` reject (or accept again) incoming transfers
    pub fn set_rejecting(&self, address: &Address, rejecting: bool) {
        if rejecting {
            self.rejecting.insert(address.clone());
        } else {
            self.rejecting.remove(address);
        }
    }

    /// Total native currency pushed to `address`
    pub fn received_by(&self, address: &Address) -> Amount {
        self.received
            .get(address)
            .map(|a| *a)
            .unwrap_or(Amount::ZERO)
    }
}

impl NativeBank for InMemoryNativeBank {
    fn send(&self, to: &Address, amount: Amount) -> Result<(), TransferError> {
        if self.rejecting.contains(to) {
            warn!(%to, %amount, "native transfer rejected by recipient");
            return Err(TransferError::Rejected { to: to.clone() });
        }

        let mut received = self.received.entry(to.clone()).or_insert(Amount::ZERO);
        // Saturate: the in-memory bank only records what was pushed
        *received = received.checked_add(amount).unwrap_or(Amount::new(u128::MAX));
        debug!(%to, %amount, "native transfer sent");
        Ok(())
    }
}
