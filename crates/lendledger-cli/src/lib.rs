//! # Lendledger CLI
//!
//! Replays JSON scenarios against the loan engine and reports the event
//! stream and final state.

pub mod config;
pub mod scenario;

pub use config::CliConfig;
pub use scenario::{Action, Scenario, ScenarioReport, ScenarioRunner, Step, StepOutcome};

use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Build the log filter from `RUST_LOG`-style directives
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}
