//! Non-reentrancy guard
//!
//! Every state-changing engine operation acquires the guard before touching
//! state and holds the returned token until it returns. A collaborator that
//! calls back into the engine mid-operation (for example a native-currency
//! recipient reacting to a payout) is rejected with
//! [`LendingError::Reentrant`] instead of observing half-applied state.

use std::sync::atomic::{AtomicBool, Ordering};

use lendledger_common::{LendingError, Result};
use tracing::warn;

/// Lock shared by all protected operations of one engine
#[derive(Debug, Default)]
pub struct OperationGuard {
    entered: AtomicBool,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard; released when the token drops, including on `?` exits
    pub fn enter(&self) -> Result<GuardToken<'_>> {
        self.entered
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| {
                warn!("reentrant operation rejected");
                LendingError::Reentrant
            })?;
        Ok(GuardToken { guard: self })
    }

    pub(crate) fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

/// Proof that the guard is held
#[must_use = "the guard is released as soon as the token is dropped"]
#[derive(Debug)]
pub struct GuardToken<'a> {
    guard: &'a OperationGuard,
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard.entered.store(false, Ordering::Release);
    }
}
