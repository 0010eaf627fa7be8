use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use umbra::prelude::*;

/// Switch to `ContextMode::Dedicated` to drive the loop through its own
/// device queue instead of the shared one.
const CONTEXT_MODE: ContextMode = ContextMode::Shared;

fn main() {
    init_logging();

    if let Err(err) = run() {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = ReproConfig {
        context_mode: CONTEXT_MODE,
        ..Default::default()
    };

    info!(
        "starting repro: {}x{} {}, shift by {} bits, {} runs",
        config.width, config.height, config.pixel_format, config.shift_bits, config.runs
    );

    let mut harness = ReproHarness::new(config).context("harness setup failed")?;
    let report = harness.run().context("repro loop failed")?;

    info!(
        "verified {} pixels across {} runs",
        report.pixels_verified, report.runs
    );

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
