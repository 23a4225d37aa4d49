//! Runner configuration

use anyhow::Result;
use lendledger_common::{Address, FeeBps, DEFAULT_FEE_BPS};
use lendledger_engine::config::DEFAULT_CERTIFICATE_BASE_URI;
use lendledger_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Scenario runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Engine administrator address
    pub admin: String,
    /// Initial platform fee in basis points
    pub fee_bps: u16,
    /// Prefix for certificate metadata URIs
    pub certificate_base_uri: String,
    /// Native currency placed in the treasury before the first step
    pub treasury_seed: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            admin: "admin".to_string(),
            fee_bps: DEFAULT_FEE_BPS,
            certificate_base_uri: DEFAULT_CERTIFICATE_BASE_URI.to_string(),
            treasury_seed: 0,
        }
    }
}

impl CliConfig {
    /// Load configuration from `.env` and `LENDLEDGER_` variables
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(admin) = lookup("LENDLEDGER_ADMIN") {
            cfg.admin = admin;
        }
        if let Some(val) = lookup("LENDLEDGER_FEE_BPS") {
            match val.parse() {
                Ok(v) => cfg.fee_bps = v,
                Err(_) => warn!(value = %val, "ignoring unparsable LENDLEDGER_FEE_BPS"),
            }
        }
        if let Some(uri) = lookup("LENDLEDGER_CERTIFICATE_BASE_URI") {
            cfg.certificate_base_uri = uri;
        }
        if let Some(val) = lookup("LENDLEDGER_TREASURY_SEED") {
            match val.parse() {
                Ok(v) => cfg.treasury_seed = v,
                Err(_) => warn!(value = %val, "ignoring unparsable LENDLEDGER_TREASURY_SEED"),
            }
        }

        Ok(cfg)
    }

    /// Engine configuration; fails when the fee exceeds the cap
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let fee = FeeBps::new(self.fee_bps)?;
        Ok(EngineConfig::new(Address::new(self.admin.clone()))
            .with_platform_fee(fee)
            .with_certificate_base_uri(self.certificate_base_uri.clone()))
    }
}
