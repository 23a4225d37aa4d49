//! Engine configuration

use lendledger_common::{Address, FeeBps, LoanId};
use serde::{Deserialize, Serialize};

/// Default prefix for certificate metadata URIs
pub const DEFAULT_CERTIFICATE_BASE_URI: &str = "lendledger://loan/";

/// Lending engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Administrator: originates loans, sets the fee, runs emergency withdrawals
    pub admin: Address,
    /// Platform fee on realized interest
    #[serde(default)]
    pub platform_fee: FeeBps,
    /// Certificate metadata URI is this prefix followed by the loan id
    #[serde(default = "default_certificate_base_uri")]
    pub certificate_base_uri: String,
}

fn default_certificate_base_uri() -> String {
    DEFAULT_CERTIFICATE_BASE_URI.to_string()
}

impl EngineConfig {
    pub fn new(admin: impl Into<Address>) -> Self {
        Self {
            admin: admin.into(),
            platform_fee: FeeBps::DEFAULT,
            certificate_base_uri: default_certificate_base_uri(),
        }
    }

    pub fn with_platform_fee(mut self, fee: FeeBps) -> Self {
        self.platform_fee = fee;
        self
    }

    pub fn with_certificate_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.certificate_base_uri = base_uri.into();
        self
    }

    /// Metadata URI attached to a loan's certificate
    pub fn certificate_uri(&self, loan_id: LoanId) -> String {
        format!("{}{}", self.certificate_base_uri, loan_id)
    }
}
