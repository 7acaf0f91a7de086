//! # rlsid-cli — Operator Tooling
//!
//! Provides the `rlsid` command-line interface for working with report
//! catalogs offline.
//!
//! ## Subcommands
//!
//! - `rlsid catalog check`: load a catalog, validate every schema, print fingerprints.
//! - `rlsid encode`: validate and encode a parameter set.
//! - `rlsid decode`: decode an identity against a report schema.
//! - `rlsid filter`: apply an identity to a dataset.
//! - `rlsid keygen`: generate a credential signing key.
//!
//! ```bash
//! rlsid catalog check catalog/sales.yaml
//! rlsid encode --catalog catalog/sales.yaml --report regional-sales \
//!     --param Region=West --param Department=Sales --param Year=2024
//! rlsid filter --catalog catalog/sales.yaml --report regional-sales --identity 'West|Sales|2024'
//! ```

pub mod catalog;
pub mod identity;
pub mod keygen;

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rlsid_core::{ReportCatalog, ReportDefinition};

/// Load and validate a catalog file.
pub fn load_catalog(path: &Path) -> Result<ReportCatalog> {
    ReportCatalog::load(path).with_context(|| format!("invalid catalog {}", path.display()))
}

/// Look up a report, listing the known ids on failure.
pub fn find_report<'c>(catalog: &'c ReportCatalog, id: &str) -> Result<&'c ReportDefinition> {
    catalog.get(id).ok_or_else(|| {
        let known: Vec<String> = catalog.iter().map(|r| r.id.to_string()).collect();
        anyhow!("report '{id}' not found (known: {})", known.join(", "))
    })
}
