//! CreditAccount - Per-address credit balance
//!
//! Credit is the fungible unit lenders hold on the ledger:
//! - Minted when native currency is deposited or a loan settles
//! - Burned when a lender funds a loan or withdraws
//! - Version field bumped on every change for optimistic concurrency

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::types::{address::Address, amount::Amount};

/// Credit balance held by one address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditAccount {
    /// Owning address
    pub owner: Address,

    /// Spendable credit
    pub balance: Amount,

    /// Version for optimistic concurrency control
    pub version: u64,

    /// Timestamp of last modification (Unix milliseconds)
    pub updated_at: i64,
}

impl CreditAccount {
    /// Create a new empty account
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            balance: Amount::ZERO,
            version: 0,
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create an account with initial balance
    pub fn with_balance(owner: Address, balance: Amount) -> Self {
        let mut account = Self::new(owner);
        account.balance = balance;
        account
    }

    /// Add credit
    pub fn credit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .map_err(|_| LedgerError::Unavailable(format!("balance overflow for {}", self.owner)))?;
        self.touch();
        Ok(())
    }

    /// Remove credit
    pub fn debit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        let remaining = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                owner: self.owner.clone(),
                required: amount,
                available: self.balance,
            })?;

        self.balance = remaining;
        self.touch();
        Ok(())
    }

    /// Update version and timestamp
    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

impl std::fmt::Display for CreditAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CreditAccount(owner={}, balance={}, version={})",
            self.owner, self.balance, self.version
        )
    }
}
