//! Credit Ledger interface and in-memory implementation

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use lendledger_common::{Address, Amount, CreditAccount, LedgerError};
use tracing::debug;

/// Fungible credit bookkeeping owned outside the engine
pub trait CreditLedger: Send + Sync {
    /// Create `amount` credit for `to`
    fn mint(&self, to: &Address, amount: Amount) -> Result<(), LedgerError>;

    /// Destroy `amount` credit held by `from`
    fn burn(&self, from: &Address, amount: Amount) -> Result<(), LedgerError>;

    /// Current balance; zero for unknown addresses
    fn balance_of(&self, owner: &Address) -> Amount;

    /// Sum of all balances
    fn total_supply(&self) -> Amount;
}

/// DashMap-backed credit ledger
pub struct InMemoryCreditLedger {
    accounts: DashMap<Address, CreditAccount>,
    available: AtomicBool,
}

impl InMemoryCreditLedger {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    /// Take the ledger offline; every mint and burn fails until restored
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Snapshot of one account
    pub fn account(&self, owner: &Address) -> Option<CreditAccount> {
        self.accounts.get(owner).map(|a| a.clone())
    }

    fn ensure_available(&self) -> Result<(), LedgerError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LedgerError::Unavailable("credit ledger offline".to_string()))
        }
    }
}

impl Default for InMemoryCreditLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl CreditLedger for InMemoryCreditLedger {
    fn mint(&self, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.ensure_available()?;
        let mut account = self
            .accounts
            .entry(to.clone())
            .or_insert_with(|| CreditAccount::new(to.clone()));
        account.credit(amount)?;
        debug!(owner = %to, %amount, balance = %account.balance, "credit minted");
        Ok(())
    }

    fn burn(&self, from: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.ensure_available()?;
        if amount.is_zero() {
            return Ok(());
        }
        let Some(mut account) = self.accounts.get_mut(from) else {
            return Err(LedgerError::InsufficientBalance {
                owner: from.clone(),
                required: amount,
                available: Amount::ZERO,
            });
        };
        account.debit(amount)?;
        debug!(owner = %from, %amount, balance = %account.balance, "credit burned");
        Ok(())
    }

    fn balance_of(&self, owner: &Address) -> Amount {
        self.accounts
            .get(owner)
            .map(|a| a.balance)
            .unwrap_or(Amount::ZERO)
    }

    fn total_supply(&self) -> Amount {
        self.accounts
            .iter()
            .fold(Amount::ZERO, |sum, a| {
                sum.checked_add(a.balance).unwrap_or(Amount::new(u128::MAX))
            })
    }
}
