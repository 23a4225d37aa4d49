//! Loan record and repayment arithmetic
//!
//! Two repayment paths lead to settlement:
//!
//! ```text
//! installments:  total_to_pay = amount + interest
//!                installment  = floor(total_to_pay / installments)
//!
//! early payoff:  days_used    = clamp(floor(elapsed / 1 day), 1, 30)
//!                daily        = floor((total_to_pay - amount) / 30)
//!                real_total   = amount + daily * days_used
//!                final        = real_total - total_paid          (must be > 0)
//!
//! settlement:    interest     = total_paid - amount
//!                platform_fee = floor(interest * fee_bps / 10_000)
//!                lender_gets  = total_paid - platform_fee
//! ```
//!
//! An early payoff after some installments subtracts installment payments
//! made at the full schedule rate from a total prorated at the daily rate.
//! The two bases are not reconciled.

use lendledger_common::{
    Address, Amount, AuthError, FeeBps, LendingError, LoanId, PreconditionError, Result,
    EARLY_PAYOFF_MAX_DAYS, SECONDS_PER_DAY,
};
use serde::{Deserialize, Serialize};

/// Terms supplied by the admin at origination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Principal disbursed to the borrower
    pub amount: Amount,
    /// Scheduled interest on top of the principal
    pub interest: Amount,
    /// Number of equal installments
    pub installments: u32,
}

impl LoanTerms {
    pub fn new(amount: Amount, interest: Amount, installments: u32) -> Self {
        Self {
            amount,
            interest,
            installments,
        }
    }
}

/// Loan state
///
/// The default value is the zero record returned for ids that were never
/// allocated: zero lender, zero amounts, inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub lender: Address,
    pub borrower: Address,
    /// Principal
    pub amount: Amount,
    /// Principal plus scheduled interest, fixed for the loan's life
    pub total_to_pay: Amount,
    /// Cumulative repayments; never decreases
    pub total_paid: Amount,
    /// Origination time (Unix seconds)
    pub start_time: i64,
    pub installments: u32,
    pub installment_amount: Amount,
    pub installments_paid: u32,
    /// Cleared exactly once, at settlement
    pub active: bool,
}

impl Loan {
    /// Build a fresh active loan from its terms
    pub fn originate(
        id: LoanId,
        lender: Address,
        borrower: Address,
        terms: LoanTerms,
        start_time: i64,
    ) -> Result<Self> {
        let (total_to_pay, installment_amount) = schedule(&terms)?;

        Ok(Self {
            id,
            lender,
            borrower,
            amount: terms.amount,
            total_to_pay,
            total_paid: Amount::ZERO,
            start_time,
            installments: terms.installments,
            installment_amount,
            installments_paid: 0,
            active: true,
        })
    }

    /// Scheduled interest
    pub fn interest(&self) -> Amount {
        self.total_to_pay.saturating_sub(self.amount)
    }

    /// Amount still owed under the installment schedule
    pub fn remaining(&self) -> Amount {
        self.total_to_pay.saturating_sub(self.total_paid)
    }

    pub fn is_complete(&self) -> bool {
        self.installments_paid >= self.installments
    }

    /// Reject calls on settled or never-allocated loans
    pub fn ensure_active(&self) -> Result<()> {
        if !self.active {
            return Err(PreconditionError::LoanNotActive(self.id).into());
        }
        Ok(())
    }

    pub fn ensure_borrower(&self, caller: &Address) -> Result<()> {
        if &self.borrower != caller {
            return Err(AuthError::NotBorrower {
                loan_id: self.id,
                caller: caller.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Record one installment. Returns `true` when it was the last one.
    pub fn record_installment(&mut self, payment: Amount) -> Result<bool> {
        self.ensure_active()?;
        if self.installments_paid >= self.installments {
            return Err(PreconditionError::InstallmentsComplete(self.id).into());
        }
        if payment != self.installment_amount {
            return Err(PreconditionError::PaymentMismatch {
                expected: self.installment_amount,
                received: payment,
            }
            .into());
        }

        self.total_paid = self.total_paid.checked_add(payment)?;
        self.installments_paid += 1;
        Ok(self.is_complete())
    }

    /// Price an early payoff at `now` (Unix seconds)
    pub fn early_payoff_quote(&self, now: i64) -> Result<EarlyPayoffQuote> {
        self.ensure_active()?;

        let days_used = days_used(self.start_time, now);
        let daily_interest = self
            .interest()
            .floor_div(u128::from(EARLY_PAYOFF_MAX_DAYS))
            .ok_or(LendingError::Overflow)?;
        let real_total = self
            .amount
            .checked_add(daily_interest.checked_mul(u128::from(days_used))?)?;

        let final_payment = real_total
            .checked_sub(self.total_paid)
            .filter(|p| !p.is_zero())
            .ok_or(PreconditionError::NothingOwed(self.id))?;

        Ok(EarlyPayoffQuote {
            loan_id: self.id,
            days_used,
            daily_interest,
            real_total,
            final_payment,
        })
    }

    /// Apply a quote whose payment has been received
    pub fn apply_early_payoff(&mut self, quote: &EarlyPayoffQuote) {
        self.total_paid = quote.real_total;
        self.installments_paid = self.installments;
    }

    /// Split the repaid total between lender and platform and close the loan
    pub fn settle(&mut self, fee: FeeBps) -> Result<Settlement> {
        let settlement = Settlement::compute(self, fee)?;
        self.active = false;
        Ok(settlement)
    }
}

/// `(total_to_pay, installment_amount)` for a set of terms
pub fn schedule(terms: &LoanTerms) -> Result<(Amount, Amount)> {
    if terms.installments == 0 {
        return Err(PreconditionError::ZeroInstallments.into());
    }
    let total_to_pay = terms.amount.checked_add(terms.interest)?;
    let installment_amount = total_to_pay
        .floor_div(u128::from(terms.installments))
        .ok_or(LendingError::Overflow)?;
    Ok((total_to_pay, installment_amount))
}

/// Whole days of accrued interest between `start` and `now`, clamped to `[1, 30]`
pub fn days_used(start: i64, now: i64) -> u64 {
    let elapsed = now.saturating_sub(start).max(0);
    let days = u64::try_from(elapsed / SECONDS_PER_DAY).unwrap_or(0);
    days.clamp(1, EARLY_PAYOFF_MAX_DAYS)
}

/// Exact amount an early payoff requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyPayoffQuote {
    pub loan_id: LoanId,
    pub days_used: u64,
    pub daily_interest: Amount,
    /// Principal plus prorated interest
    pub real_total: Amount,
    /// `real_total` minus everything already paid
    pub final_payment: Amount,
}

/// Distribution of a settled loan's repayments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub loan_id: LoanId,
    /// Realized interest, `total_paid - amount` (zero if repayments fell short)
    pub interest: Amount,
    pub platform_fee: Amount,
    /// Credit minted to the lender
    pub lender_amount: Amount,
}

impl Settlement {
    pub fn compute(loan: &Loan, fee: FeeBps) -> Result<Self> {
        let interest = loan.total_paid.saturating_sub(loan.amount);
        let platform_fee = fee.apply(interest)?;
        let lender_amount = loan
            .total_paid
            .checked_sub(platform_fee)
            .ok_or(LendingError::Overflow)?;

        Ok(Self {
            loan_id: loan.id,
            interest,
            platform_fee,
            lender_amount,
        })
    }
}
