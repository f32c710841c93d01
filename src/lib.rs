#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # Signup operator
//!
//! Command-line harness around the signup reconciler: loads configuration and
//! an object snapshot, reconciles the requested signups and reports the
//! resulting state.

pub mod cli;
pub mod config;
pub mod harness;
pub mod snapshot;

use std::sync::Arc;

use anyhow::{Context, Result};
use signup_core::ObjectKey;
use signup_reconciler::{ReconcilerBuilder, StaticClusterSelector};
use signup_store::{InMemoryObjectStore, TracingObjectStore};
use tracing::info;

use crate::cli::Cli;
use crate::config::OperatorConfig;
use crate::harness::{Harness, Outcome};

/// Result of one operator run.
#[derive(Debug)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
    /// Rendered final snapshot.
    pub output: String,
}

/// Execute one run as described by `cli`.
///
/// # Errors
///
/// Returns an error if configuration, snapshot or identities are invalid,
/// or the final snapshot cannot be rendered. Reconciliation failures are
/// reported in the outcomes instead.
pub async fn execute(cli: &Cli) -> Result<Report> {
    let config = OperatorConfig::load(cli.config.as_deref())?;
    let objects = snapshot::load(&cli.state)?;

    let keys = if cli.identities.is_empty() {
        snapshot::signup_keys(&objects)
    } else {
        cli.identities
            .iter()
            .map(|identity| {
                identity
                    .parse::<ObjectKey>()
                    .with_context(|| format!("Invalid identity '{identity}'"))
            })
            .collect::<Result<Vec<_>>>()?
    };

    info!(
        objects = objects.len(),
        identities = keys.len(),
        clusters = config.member_clusters.len(),
        "Snapshot loaded"
    );

    let memory = InMemoryObjectStore::new();
    memory.seed(objects).await;
    let store = Arc::new(TracingObjectStore::new(memory));

    let reconciler = ReconcilerBuilder::new()
        .with_store(store.clone())
        .with_clusters(Arc::new(StaticClusterSelector::new(
            config.member_clusters.iter().cloned(),
        )))
        .with_config(config.reconciler)
        .build()?;

    let harness = Harness::new(reconciler, store.clone(), cli.passes);
    let outcomes = harness.run(&keys).await;

    let output = snapshot::render(&store.inner().snapshot().await, cli.output)?;
    Ok(Report { outcomes, output })
}
