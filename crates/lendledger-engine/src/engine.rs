//! Lending engine
//!
//! Owns every loan record, the platform fee and the native-currency treasury.
//! Each state-changing operation runs under the engine's [`OperationGuard`]
//! and follows the same shape:
//!
//! 1. Validate authorization and preconditions against a copy of the state
//! 2. Call the collaborators (credit ledger, native bank, certificate issuer)
//! 3. Commit the loan record, treasury and fee counters
//! 4. Emit events
//!
//! A failure in step 1 or 2 returns before step 3, so nothing the engine
//! owns has changed. Collaborator effects that already happened are undone
//! with a compensating call (a burned credit is minted back when the
//! follow-up payout fails).

use std::sync::Arc;

use lendledger_common::{
    Address, Amount, AuthError, FeeBps, LoanId, PreconditionError, Result, TransferError,
};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::clock::Clock;
use crate::collaborators::{CertificateIssuer, CreditLedger, NativeBank};
use crate::config::EngineConfig;
use crate::events::{EventSink, LoanEvent};
use crate::guard::OperationGuard;
use crate::loan::{EarlyPayoffQuote, Loan, LoanTerms, Settlement};
use crate::registry::ParticipantRegistry;
use crate::store::LoanStore;

/// Collaborators the engine is wired to
#[derive(Clone)]
pub struct Collaborators {
    pub credit_ledger: Arc<dyn CreditLedger>,
    pub certificates: Arc<dyn CertificateIssuer>,
    pub bank: Arc<dyn NativeBank>,
    pub clock: Arc<dyn Clock>,
    pub events: Arc<dyn EventSink>,
    pub store: Arc<dyn LoanStore>,
}

/// Engine counters as reported to operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineSnapshot {
    pub platform_fee: FeeBps,
    pub treasury: Amount,
    pub accrued_fees: Amount,
    pub loan_count: usize,
    pub lender_count: usize,
    pub borrower_count: usize,
}

/// Mutable counters owned by the engine
#[derive(Debug, Clone, Copy)]
struct EngineState {
    platform_fee: FeeBps,
    /// Native currency held by the engine
    treasury: Amount,
    /// Platform fees collected across all settlements
    accrued_fees: Amount,
}

/// Peer-to-peer loan engine
pub struct LendingEngine {
    config: EngineConfig,
    registry: ParticipantRegistry,
    credit_ledger: Arc<dyn CreditLedger>,
    certificates: Arc<dyn CertificateIssuer>,
    bank: Arc<dyn NativeBank>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    store: Arc<dyn LoanStore>,
    state: Mutex<EngineState>,
    guard: OperationGuard,
}

impl LendingEngine {
    pub fn new(config: EngineConfig, collaborators: Collaborators) -> Self {
        info!(
            admin = %config.admin,
            platform_fee = %config.platform_fee,
            "lending engine initialised"
        );

        Self {
            registry: ParticipantRegistry::new(collaborators.events.clone()),
            state: Mutex::new(EngineState {
                platform_fee: config.platform_fee,
                treasury: Amount::ZERO,
                accrued_fees: Amount::ZERO,
            }),
            config,
            credit_ledger: collaborators.credit_ledger,
            certificates: collaborators.certificates,
            bank: collaborators.bank,
            clock: collaborators.clock,
            events: collaborators.events,
            store: collaborators.store,
            guard: OperationGuard::new(),
        }
    }

    // ============ REGISTRY ============

    /// Self-register as a lender
    pub fn register_lender(&self, caller: &Address) {
        self.registry.register_lender(caller);
    }

    /// Self-register as a borrower
    pub fn register_borrower(&self, caller: &Address) {
        self.registry.register_borrower(caller);
    }

    // ============ LOAN LIFECYCLE ============

    /// Originate a loan from `lender`'s credit to `borrower` (admin only)
    ///
    /// Burns `amount` credit from the lender, pays `amount` native currency
    /// to the borrower and issues the lender a certificate for the new loan.
    #[instrument(skip(self))]
    pub fn create_loan(
        &self,
        caller: &Address,
        lender: &Address,
        borrower: &Address,
        terms: LoanTerms,
    ) -> Result<LoanId> {
        let _token = self.guard.enter()?;
        self.ensure_admin(caller)?;

        if !self.registry.is_lender(lender) {
            return Err(PreconditionError::LenderNotRegistered(lender.clone()).into());
        }
        if !self.registry.is_borrower(borrower) {
            return Err(PreconditionError::BorrowerNotRegistered(borrower.clone()).into());
        }
        let available = self.credit_ledger.balance_of(lender);
        if available < terms.amount {
            return Err(PreconditionError::InsufficientCredit {
                required: terms.amount,
                available,
            }
            .into());
        }

        let loan_id = self.store.next_id();
        let loan = Loan::originate(
            loan_id,
            lender.clone(),
            borrower.clone(),
            terms,
            self.clock.unix_seconds(),
        )?;
        self.ensure_treasury_covers(terms.amount)?;

        self.credit_ledger.burn(lender, terms.amount)?;
        if let Err(err) = self.pay_out(borrower, terms.amount) {
            self.restore_credit(lender, terms.amount);
            return Err(err);
        }
        self.certificates
            .issue(lender, loan_id, &self.config.certificate_uri(loan_id));

        info!(
            %loan_id,
            %lender,
            %borrower,
            amount = %loan.amount,
            total_to_pay = %loan.total_to_pay,
            installment_amount = %loan.installment_amount,
            installments = loan.installments,
            "loan created"
        );
        self.store.put(loan);
        self.events.emit(LoanEvent::LoanCreated {
            loan_id,
            lender: lender.clone(),
            borrower: borrower.clone(),
            amount: terms.amount,
        });

        Ok(loan_id)
    }

    /// Pay the next scheduled installment; `payment` must equal the installment exactly
    ///
    /// The last installment settles the loan in the same call.
    #[instrument(skip(self))]
    pub fn pay_installment(&self, caller: &Address, loan_id: LoanId, payment: Amount) -> Result<()> {
        let _token = self.guard.enter()?;

        let mut loan = self.load(loan_id);
        loan.ensure_active()?;
        self.ensure_borrower(&loan, caller)?;

        let completed = loan.record_installment(payment)?;
        let settlement = if completed {
            Some(loan.settle(self.platform_fee())?)
        } else {
            None
        };

        self.commit_payment(&loan, payment, settlement.as_ref())?;

        info!(
            %loan_id,
            %payment,
            installments_paid = loan.installments_paid,
            installments = loan.installments,
            "installment paid"
        );
        if settlement.is_some() {
            self.events.emit(LoanEvent::LoanCompleted { loan_id });
        }
        self.events.emit(LoanEvent::PaymentMade {
            loan_id,
            amount: payment,
        });

        Ok(())
    }

    /// Settle the loan now with a single prorated payment
    ///
    /// `payment` must equal [`EarlyPayoffQuote::final_payment`] at the time of
    /// the call; see [`LendingEngine::quote_early_payoff`].
    #[instrument(skip(self))]
    pub fn pay_early(&self, caller: &Address, loan_id: LoanId, payment: Amount) -> Result<()> {
        let _token = self.guard.enter()?;

        let mut loan = self.load(loan_id);
        loan.ensure_active()?;
        self.ensure_borrower(&loan, caller)?;

        let quote = loan.early_payoff_quote(self.clock.unix_seconds())?;
        debug!(
            %loan_id,
            days_used = quote.days_used,
            daily_interest = %quote.daily_interest,
            real_total = %quote.real_total,
            final_payment = %quote.final_payment,
            "early payoff quoted"
        );
        if payment != quote.final_payment {
            return Err(PreconditionError::PaymentMismatch {
                expected: quote.final_payment,
                received: payment,
            }
            .into());
        }

        loan.apply_early_payoff(&quote);
        let settlement = loan.settle(self.platform_fee())?;
        self.commit_payment(&loan, payment, Some(&settlement))?;

        info!(%loan_id, %payment, days_used = quote.days_used, "loan paid off early");
        self.events.emit(LoanEvent::LoanCompleted { loan_id });
        self.events.emit(LoanEvent::EarlyPaymentMade {
            loan_id,
            amount: payment,
            days_used: quote.days_used,
        });

        Ok(())
    }

    /// Price an early payoff at the current clock reading without changing state
    pub fn quote_early_payoff(&self, loan_id: LoanId) -> Result<EarlyPayoffQuote> {
        self.load(loan_id)
            .early_payoff_quote(self.clock.unix_seconds())
    }

    // ============ TREASURY ============

    /// Convert native currency into credit
    #[instrument(skip(self))]
    pub fn deposit(&self, caller: &Address, value: Amount) -> Result<()> {
        let _token = self.guard.enter()?;
        if value.is_zero() {
            return Err(PreconditionError::ZeroAmount.into());
        }

        let treasury = self.state.lock().treasury.checked_add(value)?;
        self.credit_ledger.mint(caller, value)?;
        self.state.lock().treasury = treasury;

        info!(address = %caller, amount = %value, "deposit credited");
        self.events.emit(LoanEvent::Deposited {
            address: caller.clone(),
            amount: value,
        });
        Ok(())
    }

    /// Convert credit back into native currency
    #[instrument(skip(self))]
    pub fn withdraw(&self, caller: &Address, amount: Amount) -> Result<()> {
        let _token = self.guard.enter()?;
        if amount.is_zero() {
            return Err(PreconditionError::ZeroAmount.into());
        }
        let available = self.credit_ledger.balance_of(caller);
        if available < amount {
            return Err(PreconditionError::InsufficientCredit {
                required: amount,
                available,
            }
            .into());
        }
        self.ensure_treasury_covers(amount)?;

        self.credit_ledger.burn(caller, amount)?;
        if let Err(err) = self.pay_out(caller, amount) {
            self.restore_credit(caller, amount);
            return Err(err);
        }

        info!(address = %caller, %amount, "withdrawal paid");
        self.events.emit(LoanEvent::Withdrawn {
            address: caller.clone(),
            amount,
        });
        Ok(())
    }

    /// Accept native currency into the treasury without minting credit
    #[instrument(skip(self))]
    pub fn fund_treasury(&self, from: &Address, value: Amount) -> Result<()> {
        let _token = self.guard.enter()?;
        if value.is_zero() {
            return Err(PreconditionError::ZeroAmount.into());
        }

        {
            let mut state = self.state.lock();
            state.treasury = state.treasury.checked_add(value)?;
        }

        info!(%from, amount = %value, "treasury funded");
        self.events.emit(LoanEvent::TreasuryFunded {
            from: from.clone(),
            amount: value,
        });
        Ok(())
    }

    // ============ ADMIN ============

    /// Update the platform fee (admin only, at most 1000bp)
    #[instrument(skip(self))]
    pub fn set_platform_fee(&self, caller: &Address, bps: u16) -> Result<()> {
        let _token = self.guard.enter()?;
        self.ensure_admin(caller)?;
        let new = FeeBps::new(bps)?;

        let old = std::mem::replace(&mut self.state.lock().platform_fee, new);

        info!(%old, %new, "platform fee updated");
        self.events.emit(LoanEvent::FeeUpdated { old, new });
        Ok(())
    }

    /// Send the whole treasury to the admin, regardless of loan state
    #[instrument(skip(self))]
    pub fn emergency_withdraw(&self, caller: &Address) -> Result<Amount> {
        let _token = self.guard.enter()?;
        self.ensure_admin(caller)?;

        let amount = self.treasury_balance();
        self.pay_out(&self.config.admin, amount)?;

        warn!(to = %self.config.admin, %amount, "emergency withdrawal");
        self.events.emit(LoanEvent::EmergencyWithdrawal {
            to: self.config.admin.clone(),
            amount,
        });
        Ok(amount)
    }

    // ============ QUERIES ============

    /// Loan record; the zero record (inactive, zero lender) for unknown ids
    pub fn get_loan(&self, loan_id: LoanId) -> Loan {
        self.store.get(loan_id).unwrap_or_default()
    }

    pub fn find_loan(&self, loan_id: LoanId) -> Option<Loan> {
        self.store.get(loan_id)
    }

    pub fn loans_by_lender(&self, lender: &Address) -> Vec<Loan> {
        self.store.by_lender(lender)
    }

    pub fn loans_by_borrower(&self, borrower: &Address) -> Vec<Loan> {
        self.store.by_borrower(borrower)
    }

    pub fn loan_count(&self) -> usize {
        self.store.count()
    }

    /// Credit balance held on the ledger
    pub fn balance_of(&self, owner: &Address) -> Amount {
        self.credit_ledger.balance_of(owner)
    }

    pub fn is_lender(&self, address: &Address) -> bool {
        self.registry.is_lender(address)
    }

    pub fn is_borrower(&self, address: &Address) -> bool {
        self.registry.is_borrower(address)
    }

    pub fn platform_fee(&self) -> FeeBps {
        self.state.lock().platform_fee
    }

    /// Native currency currently held by the engine
    pub fn treasury_balance(&self) -> Amount {
        self.state.lock().treasury
    }

    /// Platform fees collected so far
    pub fn accrued_fees(&self) -> Amount {
        self.state.lock().accrued_fees
    }

    /// Point-in-time view of the engine's counters
    pub fn snapshot(&self) -> EngineSnapshot {
        let state = *self.state.lock();
        EngineSnapshot {
            platform_fee: state.platform_fee,
            treasury: state.treasury,
            accrued_fees: state.accrued_fees,
            loan_count: self.store.count(),
            lender_count: self.registry.lender_count(),
            borrower_count: self.registry.borrower_count(),
        }
    }

    pub fn admin(&self) -> &Address {
        &self.config.admin
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ============ INTERNALS ============

    /// Stored loan, or the zero record carrying the requested id
    fn load(&self, loan_id: LoanId) -> Loan {
        self.store.get(loan_id).unwrap_or(Loan {
            id: loan_id,
            ..Loan::default()
        })
    }

    fn ensure_admin(&self, caller: &Address) -> Result<()> {
        if caller != &self.config.admin {
            warn!(%caller, "admin operation rejected");
            return Err(AuthError::NotAdmin {
                caller: caller.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn ensure_borrower(&self, loan: &Loan, caller: &Address) -> Result<()> {
        loan.ensure_borrower(caller).inspect_err(|_| {
            warn!(loan_id = %loan.id, %caller, "payment from non-borrower rejected");
        })
    }

    fn ensure_treasury_covers(&self, amount: Amount) -> Result<()> {
        let available = self.treasury_balance();
        if available < amount {
            return Err(TransferError::InsufficientTreasury {
                required: amount,
                available,
            }
            .into());
        }
        Ok(())
    }

    /// Record a received payment: mint the lender's share on settlement, then
    /// commit treasury, fee counter and loan record together
    fn commit_payment(
        &self,
        loan: &Loan,
        payment: Amount,
        settlement: Option<&Settlement>,
    ) -> Result<()> {
        let (treasury, accrued_fees) = {
            let state = self.state.lock();
            let fees = match settlement {
                Some(s) => state.accrued_fees.checked_add(s.platform_fee)?,
                None => state.accrued_fees,
            };
            (state.treasury.checked_add(payment)?, fees)
        };

        if let Some(s) = settlement {
            debug!(
                loan_id = %s.loan_id,
                interest = %s.interest,
                platform_fee = %s.platform_fee,
                lender_amount = %s.lender_amount,
                "settling loan"
            );
            self.credit_ledger.mint(&loan.lender, s.lender_amount)?;
            info!(
                loan_id = %loan.id,
                lender = %loan.lender,
                lender_amount = %s.lender_amount,
                platform_fee = %s.platform_fee,
                "loan completed"
            );
        }

        {
            let mut state = self.state.lock();
            state.treasury = treasury;
            state.accrued_fees = accrued_fees;
        }
        self.store.put(loan.clone());
        Ok(())
    }

    /// Push native currency out of the treasury; the treasury is restored if the push fails
    fn pay_out(&self, to: &Address, amount: Amount) -> Result<()> {
        {
            let mut state = self.state.lock();
            let available = state.treasury;
            state.treasury = available
                .checked_sub(amount)
                .ok_or(TransferError::InsufficientTreasury {
                    required: amount,
                    available,
                })?;
        }

        if let Err(err) = self.bank.send(to, amount) {
            let mut state = self.state.lock();
            state.treasury = state.treasury.checked_add(amount)?;
            return Err(err.into());
        }
        Ok(())
    }

    /// Compensate a burn whose follow-up payout failed
    fn restore_credit(&self, owner: &Address, amount: Amount) {
        if let Err(err) = self.credit_ledger.mint(owner, amount) {
            error!(%owner, %amount, error = %err, "failed to restore burned credit");
        }
    }
}

impl std::fmt::Debug for LendingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = *self.state.lock();
        f.debug_struct("LendingEngine")
            .field("admin", &self.config.admin)
            .field("platform_fee", &state.platform_fee)
            .field("treasury", &state.treasury)
            .field("accrued_fees", &state.accrued_fees)
            .field("loans", &self.store.count())
            .field("busy", &self.guard.is_entered())
            .finish()
    }
}
