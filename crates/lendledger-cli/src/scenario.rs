//! Scenario replay
//!
//! A scenario is a JSON list of steps driven against an engine wired to
//! in-memory collaborators. Steps that fail are recorded and the run
//! continues; a step may declare that it is expected to fail.

use anyhow::Result;
use chrono::{DateTime, Utc};
use lendledger_common::{Address, Amount, LoanId};
use lendledger_engine::{
    EngineSnapshot, InMemoryEnvironment, LendingEngine, Loan, LoanTerms, ManualClock,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::CliConfig;

/// Scenario file contents
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Clock reading before the first step; the system time when absent
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    #[serde(default)]
    pub expect_failure: bool,
}

/// One engine call or clock movement. Omitted callers default to the admin.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    RegisterLender {
        address: String,
    },
    RegisterBorrower {
        address: String,
    },
    Deposit {
        address: String,
        amount: u64,
    },
    Withdraw {
        address: String,
        amount: u64,
    },
    FundTreasury {
        from: String,
        amount: u64,
    },
    CreateLoan {
        caller: Option<String>,
        lender: String,
        borrower: String,
        amount: u64,
        interest: u64,
        installments: u32,
    },
    /// Pays the scheduled installment when `amount` is omitted
    PayInstallment {
        borrower: String,
        loan_id: u64,
        amount: Option<u64>,
    },
    /// Pays the current quote when `amount` is omitted
    PayEarly {
        borrower: String,
        loan_id: u64,
        amount: Option<u64>,
    },
    QuoteEarlyPayoff {
        loan_id: u64,
    },
    AdvanceDays {
        days: i64,
    },
    SetFee {
        caller: Option<String>,
        bps: u16,
    },
    EmergencyWithdraw {
        caller: Option<String>,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterLender { .. } => "register_lender",
            Self::RegisterBorrower { .. } => "register_borrower",
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::FundTreasury { .. } => "fund_treasury",
            Self::CreateLoan { .. } => "create_loan",
            Self::PayInstallment { .. } => "pay_installment",
            Self::PayEarly { .. } => "pay_early",
            Self::QuoteEarlyPayoff { .. } => "quote_early_payoff",
            Self::AdvanceDays { .. } => "advance_days",
            Self::SetFee { .. } => "set_fee",
            Self::EmergencyWithdraw { .. } => "emergency_withdraw",
        }
    }
}

/// Result of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether success or failure matched the step's expectation
    pub as_expected: bool,
}

/// Final state after a run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: Option<String>,
    pub outcomes: Vec<StepOutcome>,
    pub snapshot: EngineSnapshot,
    pub loans: Vec<Loan>,
}

impl ScenarioReport {
    /// Steps whose outcome contradicted `expect_failure`
    pub fn unexpected(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.as_expected).count()
    }
}

/// Engine plus in-memory collaborators
pub struct ScenarioRunner {
    env: InMemoryEnvironment,
    engine: LendingEngine,
}

impl ScenarioRunner {
    pub fn new(config: &CliConfig, start: DateTime<Utc>) -> Result<Self> {
        let env = InMemoryEnvironment::new(ManualClock::new(start));
        let engine = LendingEngine::new(config.engine_config()?, env.collaborators());

        if config.treasury_seed > 0 {
            let admin = engine.admin().clone();
            engine.fund_treasury(&admin, Amount::from(config.treasury_seed))?;
        }

        Ok(Self { env, engine })
    }

    /// Runner whose clock starts where the scenario says
    pub fn for_scenario(config: &CliConfig, scenario: &Scenario) -> Result<Self> {
        Self::new(config, scenario.start.unwrap_or_else(Utc::now))
    }

    pub fn engine(&self) -> &LendingEngine {
        &self.engine
    }

    pub fn environment(&self) -> &InMemoryEnvironment {
        &self.env
    }

    pub fn run(&self, scenario: &Scenario) -> ScenarioReport {
        let outcomes = scenario
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| self.run_step(index, step))
            .collect();

        let loans = (1..=self.engine.loan_count() as u64)
            .filter_map(|id| self.engine.find_loan(LoanId::new(id)))
            .collect();

        ScenarioReport {
            name: scenario.name.clone(),
            outcomes,
            snapshot: self.engine.snapshot(),
            loans,
        }
    }

    fn run_step(&self, index: usize, step: &Step) -> StepOutcome {
        let action = step.action.name();
        let result = self.apply(&step.action);
        let ok = result.is_ok();
        let as_expected = ok != step.expect_failure;

        match &result {
            Ok(detail) => info!(index, action, detail = detail.as_deref().unwrap_or(""), "step ok"),
            Err(err) if step.expect_failure => info!(index, action, error = %err, "step failed as expected"),
            Err(err) => warn!(index, action, error = %err, "step failed"),
        }
        if ok && step.expect_failure {
            warn!(index, action, "step succeeded but was expected to fail");
        }

        let (detail, error) = match result {
            Ok(detail) => (detail, None),
            Err(err) => (None, Some(err.to_string())),
        };
        StepOutcome {
            index,
            action,
            ok,
            detail,
            error,
            as_expected,
        }
    }

    fn apply(&self, action: &Action) -> lendledger_engine::Result<Option<String>> {
        let engine = &self.engine;
        let caller = |c: &Option<String>| {
            c.as_deref()
                .map(Address::new)
                .unwrap_or_else(|| engine.admin().clone())
        };

        match action {
            Action::RegisterLender { address } => {
                engine.register_lender(&Address::new(address.as_str()));
                Ok(None)
            }
            Action::RegisterBorrower { address } => {
                engine.register_borrower(&Address::new(address.as_str()));
                Ok(None)
            }
            Action::Deposit { address, amount } => engine
                .deposit(&Address::new(address.as_str()), Amount::from(*amount))
                .map(|_| None),
            Action::Withdraw { address, amount } => engine
                .withdraw(&Address::new(address.as_str()), Amount::from(*amount))
                .map(|_| None),
            Action::FundTreasury { from, amount } => engine
                .fund_treasury(&Address::new(from.as_str()), Amount::from(*amount))
                .map(|_| None),
            Action::CreateLoan {
                caller: who,
                lender,
                borrower,
                amount,
                interest,
                installments,
            } => {
                let terms = LoanTerms::new(
                    Amount::from(*amount),
                    Amount::from(*interest),
                    *installments,
                );
                let loan_id = engine.create_loan(
                    &caller(who),
                    &Address::new(lender.as_str()),
                    &Address::new(borrower.as_str()),
                    terms,
                )?;
                Ok(Some(format!("loan {loan_id}")))
            }
            Action::PayInstallment {
                borrower,
                loan_id,
                amount,
            } => {
                let loan_id = LoanId::new(*loan_id);
                let payment = match amount {
                    Some(a) => Amount::from(*a),
                    None => engine.get_loan(loan_id).installment_amount,
                };
                engine.pay_installment(&Address::new(borrower.as_str()), loan_id, payment)?;
                Ok(Some(format!("paid {payment}")))
            }
            Action::PayEarly {
                borrower,
                loan_id,
                amount,
            } => {
                let loan_id = LoanId::new(*loan_id);
                let payment = match amount {
                    Some(a) => Amount::from(*a),
                    None => engine.quote_early_payoff(loan_id)?.final_payment,
                };
                engine.pay_early(&Address::new(borrower.as_str()), loan_id, payment)?;
                Ok(Some(format!("paid {payment}")))
            }
            Action::QuoteEarlyPayoff { loan_id } => {
                let quote = engine.quote_early_payoff(LoanId::new(*loan_id))?;
                Ok(Some(format!(
                    "days {} real total {} due {}",
                    quote.days_used, quote.real_total, quote.final_payment
                )))
            }
            Action::AdvanceDays { days } => {
                self.env.clock.advance_days(*days)?;
                Ok(None)
            }
            Action::SetFee { caller: who, bps } => {
                engine.set_platform_fee(&caller(who), *bps).map(|_| None)
            }
            Action::EmergencyWithdraw { caller: who } => {
                let amount = engine.emergency_withdraw(&caller(who))?;
                Ok(Some(format!("withdrew {amount}")))
            }
        }
    }
}
