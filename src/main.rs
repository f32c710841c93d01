//! # Signup operator
//!
//! Reconciles user signup requests from an object snapshot into provisioned
//! account records and prints the resulting state.
//!
//! Logs go to stderr so the printed snapshot can be piped. `RUST_LOG`
//! controls verbosity (default `info`).

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use signup_operator::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Instant::now();

    init_tracing();

    let cli = Cli::parse();
    info!(state = %cli.state.display(), passes = cli.passes, "Signup operator starting");

    let report = signup_operator::execute(&cli)
        .await
        .context("Signup operator run failed")?;

    let failed = report.outcomes.iter().filter(|o| !o.succeeded()).count();
    if failed > 0 {
        warn!(failed, total = report.outcomes.len(), "Some signups did not settle");
    }

    println!("{}", report.output);

    info!(
        reconciled = report.outcomes.len(),
        "Signup operator finished in {:?}",
        start_time.elapsed()
    );
    Ok(())
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
