//! # Catalog Subcommand
//!
//! `rlsid catalog check FILE` loads a catalog exactly as the API service
//! does at startup. Any schema error is fatal.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};
use rlsid_core::ReportDefinition;

#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Load a catalog, validate every schema and print fingerprints.
    Check {
        /// Path to the YAML catalog.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

pub fn run_catalog(args: &CatalogArgs) -> Result<u8> {
    match &args.command {
        CatalogCommand::Check { file } => cmd_check(file),
    }
}

fn cmd_check(path: &Path) -> Result<u8> {
    let catalog = crate::load_catalog(path)?;
    for report in catalog.iter() {
        println!("{}", describe_report(report));
    }
    println!("OK: {} report(s) in {}", catalog.len(), path.display());
    Ok(0)
}

/// One summary line: id, schema version, wire format, parameters, fingerprint.
pub fn describe_report(report: &ReportDefinition) -> String {
    let params: Vec<String> = report
        .schema
        .parameters()
        .iter()
        .map(|decl| format!("{}:{}", decl.name, decl.kind))
        .collect();
    format!(
        "  {}  v{} wire={} [{}] {}",
        report.id,
        report.schema.version(),
        report.schema.wire(),
        params.join(", "),
        report.schema.fingerprint()
    )
}
