//! Lendledger scenario runner
//!
//! Usage: `lendledger <scenario.json>`
//!
//! Prints every emitted event as a JSON line, then the step report, final
//! counters and loans as pretty JSON. Exits non-zero when a step's outcome
//! contradicts its expectation.

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lendledger_cli::{CliConfig, Scenario, ScenarioRunner};
use lendledger_common::VERSION;

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(lendledger_cli::log_filter(
            std::env::var("RUST_LOG").ok().as_deref(),
        ))
        .init();

    info!("Starting Lendledger v{}", VERSION);

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: lendledger <scenario.json>");
    };

    let config = CliConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let scenario = Scenario::from_json(&raw).with_context(|| format!("parsing {path}"))?;
    info!(
        name = scenario.name.as_deref().unwrap_or("unnamed"),
        steps = scenario.steps.len(),
        "scenario loaded"
    );

    let runner = ScenarioRunner::for_scenario(&config, &scenario)?;
    let report = runner.run(&scenario);

    print!("{}", runner.environment().events.to_json_lines()?);
    println!("{}", serde_json::to_string_pretty(&report)?);

    let snapshot = report.snapshot;
    info!(
        loans = snapshot.loan_count,
        treasury = %snapshot.treasury,
        accrued_fees = %snapshot.accrued_fees,
        fee_percent = %snapshot.platform_fee.as_percent(),
        "scenario finished"
    );

    let unexpected = report.unexpected();
    if unexpected > 0 {
        warn!(unexpected, "steps did not behave as expected");
        bail!("{unexpected} step(s) did not behave as expected");
    }
    Ok(())
}
