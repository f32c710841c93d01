//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Signup operator - reconcile user signups into account records
#[derive(Parser, Debug)]
#[command(name = "signup-operator")]
#[command(version)]
#[command(about = "Reconcile user signup requests into provisioned account records")]
#[command(
    long_about = "Loads a snapshot of signup requests, account records, template tiers and config records, runs reconciliation passes for the requested identities, and prints the resulting state."
)]
pub struct Cli {
    /// Operator configuration file (TOML, or JSON by extension)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Object snapshot to load (YAML, or JSON by extension)
    #[arg(short, long)]
    pub state: PathBuf,

    /// Maximum reconciliation passes per identity
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pub passes: u32,

    /// Output format for the final snapshot
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub output: OutputFormat,

    /// Signup identities as namespace/name (default: every signup request)
    pub identities: Vec<String>,
}

/// How the final snapshot is printed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["signup-operator", "--state", "objects.yaml"]).unwrap();
        assert_eq!(cli.passes, 2);
        assert_eq!(cli.output, OutputFormat::Yaml);
        assert!(cli.identities.is_empty());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_identities_and_output() {
        let cli = Cli::try_parse_from([
            "signup-operator",
            "-s",
            "objects.json",
            "-o",
            "json",
            "--passes",
            "3",
            "host/john",
            "host/jane",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.passes, 3);
        assert_eq!(cli.identities, ["host/john", "host/jane"]);
    }

    #[test]
    fn test_zero_passes_rejected() {
        let result = Cli::try_parse_from(["signup-operator", "-s", "x.yaml", "-p", "0"]);
        assert!(result.is_err());
    }
}
