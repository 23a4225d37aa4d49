//! Observable ledger events
//!
//! Events are published for external monitoring only; the engine never reads
//! them back. They are emitted after an operation has committed, so a
//! rejected call leaves no trace here.

use std::sync::atomic::{AtomicU64, Ordering};

use lendledger_common::{Address, Amount, FeeBps, LoanId};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

/// Event payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanEvent {
    LenderRegistered {
        address: Address,
    },
    BorrowerRegistered {
        address: Address,
    },
    LoanCreated {
        loan_id: LoanId,
        lender: Address,
        borrower: Address,
        amount: Amount,
    },
    PaymentMade {
        loan_id: LoanId,
        amount: Amount,
    },
    LoanCompleted {
        loan_id: LoanId,
    },
    EarlyPaymentMade {
        loan_id: LoanId,
        amount: Amount,
        days_used: u64,
    },
    FeeUpdated {
        old: FeeBps,
        new: FeeBps,
    },
    Deposited {
        address: Address,
        amount: Amount,
    },
    Withdrawn {
        address: Address,
        amount: Amount,
    },
    TreasuryFunded {
        from: Address,
        amount: Amount,
    },
    EmergencyWithdrawal {
        to: Address,
        amount: Amount,
    },
}

impl LoanEvent {
    /// Loan the event refers to, if any
    pub fn loan_id(&self) -> Option<LoanId> {
        match self {
            LoanEvent::LoanCreated { loan_id, .. }
            | LoanEvent::PaymentMade { loan_id, .. }
            | LoanEvent::LoanCompleted { loan_id }
            | LoanEvent::EarlyPaymentMade { loan_id, .. } => Some(*loan_id),
            _ => None,
        }
    }

    /// Short event name for logs
    pub fn name(&self) -> &'static str {
        match self {
            LoanEvent::LenderRegistered { .. } => "lender_registered",
            LoanEvent::BorrowerRegistered { .. } => "borrower_registered",
            LoanEvent::LoanCreated { .. } => "loan_created",
            LoanEvent::PaymentMade { .. } => "payment_made",
            LoanEvent::LoanCompleted { .. } => "loan_completed",
            LoanEvent::EarlyPaymentMade { .. } => "early_payment_made",
            LoanEvent::FeeUpdated { .. } => "fee_updated",
            LoanEvent::Deposited { .. } => "deposited",
            LoanEvent::Withdrawn { .. } => "withdrawn",
            LoanEvent::TreasuryFunded { .. } => "treasury_funded",
            LoanEvent::EmergencyWithdrawal { .. } => "emergency_withdrawal",
        }
    }
}

/// Event as recorded by a sink
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    /// Unique event ID
    pub id: String,

    /// Position in the log, starting at 0
    pub sequence: u64,

    /// Timestamp (Unix millis)
    pub timestamp: i64,

    #[serde(flatten)]
    pub event: LoanEvent,
}

/// Receiver for committed events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LoanEvent);
}

/// In-memory event log
pub struct EventLog {
    records: RwLock<Vec<EventRecord>>,
    sequence: AtomicU64,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// All records in emission order
    pub fn records(&self) -> Vec<EventRecord> {
        self.records.read().clone()
    }

    /// Event payloads in emission order
    pub fn events(&self) -> Vec<LoanEvent> {
        self.records.read().iter().map(|r| r.event.clone()).collect()
    }

    /// Events referring to one loan
    pub fn for_loan(&self, loan_id: LoanId) -> Vec<LoanEvent> {
        self.records
            .read()
            .iter()
            .filter(|r| r.event.loan_id() == Some(loan_id))
            .map(|r| r.event.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Export as JSON lines
    pub fn to_json_lines(&self) -> serde_json::Result<String> {
        let records = self.records.read();
        let mut out = String::new();
        for record in records.iter() {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: LoanEvent) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        info!(sequence, event = event.name(), ?event, "ledger event");

        self.records.write().push(EventRecord {
            id: uuid::Uuid::now_v7().to_string(),
            sequence,
            timestamp: chrono::Utc::now().timestamp_millis(),
            event,
        });
    }
}
