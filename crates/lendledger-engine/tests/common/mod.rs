//! Shared harness for engine integration tests

#![allow(dead_code)]

use std::sync::Arc;

use lendledger_engine::{
    Address, Amount, EngineConfig, InMemoryEnvironment, LendingEngine, LoanId, LoanTerms,
};

pub const START: i64 = 1_700_000_000;

/// Engine wired to in-memory collaborators, with one funded lender and one borrower
pub struct Harness {
    pub env: InMemoryEnvironment,
    pub engine: Arc<LendingEngine>,
    pub admin: Address,
    pub lender: Address,
    pub borrower: Address,
}

impl Harness {
    pub fn new() -> Self {
        let env = InMemoryEnvironment::starting_at(START);
        let engine = Arc::new(LendingEngine::new(
            EngineConfig::new("admin"),
            env.collaborators(),
        ));
        Self::with_engine(env, engine)
    }

    pub fn with_engine(env: InMemoryEnvironment, engine: Arc<LendingEngine>) -> Self {
        let harness = Self {
            env,
            engine,
            admin: Address::new("admin"),
            lender: Address::new("lender"),
            borrower: Address::new("borrower"),
        };
        harness.engine.register_lender(&harness.lender);
        harness.engine.register_borrower(&harness.borrower);
        harness
            .engine
            .deposit(&harness.lender, Amount::new(5_000))
            .expect("seed deposit");
        harness
    }

    /// amount=1000, interest=100, installments=5
    pub fn scenario_terms() -> LoanTerms {
        LoanTerms::new(Amount::new(1000), Amount::new(100), 5)
    }

    pub fn create_scenario_loan(&self) -> LoanId {
        self.engine
            .create_loan(&self.admin, &self.lender, &self.borrower, Self::scenario_terms())
            .expect("scenario loan")
    }

    pub fn pay_installments(&self, loan_id: LoanId, count: u32) {
        let installment = self.engine.get_loan(loan_id).installment_amount;
        for _ in 0..count {
            self.engine
                .pay_installment(&self.borrower, loan_id, installment)
                .expect("installment");
        }
    }

    /// Native currency held by the engine must equal outstanding credit,
    /// collected fees, and repayments on loans that have not settled yet
    pub fn assert_treasury_conserved(&self) {
        use lendledger_engine::CreditLedger;

        let unsettled: u128 = self
            .engine
            .loans_by_lender(&self.lender)
            .iter()
            .filter(|l| l.active)
            .map(|l| l.total_paid.get())
            .sum();
        let expected = self.env.credit_ledger.total_supply().get()
            + self.engine.accrued_fees().get()
            + unsettled;
        assert_eq!(self.engine.treasury_balance().get(), expected);
    }
}
