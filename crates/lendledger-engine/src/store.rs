//! Loan storage
//!
//! Loans are keyed by id and never deleted. The engine reads a loan, works on
//! a copy, and writes it back only once every collaborator call of the
//! operation has succeeded.

use std::collections::BTreeMap;

use lendledger_common::{Address, LoanId};
use parking_lot::RwLock;

use crate::loan::Loan;

/// Trait for loan storage backends
pub trait LoanStore: Send + Sync {
    /// Get a loan by ID
    fn get(&self, id: LoanId) -> Option<Loan>;

    /// Insert or replace a loan
    fn put(&self, loan: Loan);

    /// Id the next created loan receives
    fn next_id(&self) -> LoanId;

    /// Number of loans ever created
    fn count(&self) -> usize;

    /// Loans funded by a lender, ordered by id
    fn by_lender(&self, lender: &Address) -> Vec<Loan>;

    /// Loans owed by a borrower, ordered by id
    fn by_borrower(&self, borrower: &Address) -> Vec<Loan>;
}

/// In-memory storage ordered by loan id
pub struct InMemoryLoanStore {
    loans: RwLock<BTreeMap<LoanId, Loan>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self {
            loans: RwLock::new(BTreeMap::new()),
        }
    }

    fn filtered(&self, pred: impl Fn(&Loan) -> bool) -> Vec<Loan> {
        self.loans
            .read()
            .values()
            .filter(|l| pred(l))
            .cloned()
            .collect()
    }
}

impl Default for InMemoryLoanStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanStore for InMemoryLoanStore {
    fn get(&self, id: LoanId) -> Option<Loan> {
        self.loans.read().get(&id).cloned()
    }

    fn put(&self, loan: Loan) {
        self.loans.write().insert(loan.id, loan);
    }

    fn next_id(&self) -> LoanId {
        self.loans
            .read()
            .keys()
            .next_back()
            .and_then(|last| last.next())
            .unwrap_or(LoanId::FIRST)
    }

    fn count(&self) -> usize {
        self.loans.read().len()
    }

    fn by_lender(&self, lender: &Address) -> Vec<Loan> {
        self.filtered(|l| &l.lender == lender)
    }

    fn by_borrower(&self, borrower: &Address) -> Vec<Loan> {
        self.filtered(|l| &l.borrower == borrower)
    }
}
