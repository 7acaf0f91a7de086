//! # rlsid CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rlsid_cli::catalog::{run_catalog, CatalogArgs};
use rlsid_cli::identity::{run_decode, run_encode, run_filter, DecodeArgs, EncodeArgs, FilterArgs};
use rlsid_cli::keygen::run_keygen;

/// Parameter-to-RLS identity tooling.
#[derive(Parser, Debug)]
#[command(name = "rlsid", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report catalog operations.
    Catalog(CatalogArgs),

    /// Validate a parameter set and print its encoded identity.
    Encode(EncodeArgs),

    /// Decode an identity against a report schema.
    Decode(DecodeArgs),

    /// Print the rows an identity may see, as JSON.
    Filter(FilterArgs),

    /// Generate an Ed25519 credential signing key.
    Keygen,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Catalog(args) => run_catalog(args),
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
        Commands::Filter(args) => run_filter(args),
        Commands::Keygen => run_keygen(),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parse_catalog_check() {
        let cli = Cli::try_parse_from(["rlsid", "catalog", "check", "catalog.yaml"]).unwrap();
        let Commands::Catalog(args) = cli.command else {
            panic!("expected catalog");
        };
        let rlsid_cli::catalog::CatalogCommand::Check { file } = args.command;
        assert_eq!(file, PathBuf::from("catalog.yaml"));
    }

    #[test]
    fn parse_encode_with_repeated_params() {
        let cli = Cli::try_parse_from([
            "rlsid",
            "encode",
            "--catalog",
            "c.yaml",
            "--report",
            "regional-sales",
            "--param",
            "Region=West",
            "--param",
            "Year=2024",
        ])
        .unwrap();
        let Commands::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.report, "regional-sales");
        assert_eq!(args.params, vec!["Region=West", "Year=2024"]);
        assert!(args.subject.is_none());
    }

    #[test]
    fn parse_filter_defaults_to_preview_rows() {
        let cli = Cli::try_parse_from([
            "rlsid", "filter", "--catalog", "c.yaml", "--report", "r", "--identity", "West|2024",
        ])
        .unwrap();
        let Commands::Filter(args) = cli.command else {
            panic!("expected filter");
        };
        assert_eq!(args.identity, "West|2024");
        assert!(args.rows.is_none());
    }

    #[test]
    fn verbosity_is_global() {
        let cli = Cli::try_parse_from(["rlsid", "keygen", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Keygen));
    }

    #[test]
    fn decode_requires_identity() {
        assert!(Cli::try_parse_from(["rlsid", "decode", "--catalog", "c.yaml", "--report", "r"])
            .is_err());
    }
}
