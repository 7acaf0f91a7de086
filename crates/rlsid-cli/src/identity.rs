//! # Identity Subcommands
//!
//! `encode`, `decode` and `filter` run the same encoder and evaluator the
//! API service uses, against a catalog on disk. `encode` exits 1 on a
//! rejected parameter set; `decode` exits 1 when the identity fails closed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use rlsid_core::wire::decode_identity;
use rlsid_core::{
    DataRow, EncodeError, EncodedIdentity, ParameterSet, ParameterValue, ReportDefinition,
};
use rlsid_encoder::{IdentityEncoder, TracingAuditSink};
use rlsid_policy::PolicyEvaluator;

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Path to the YAML catalog.
    #[arg(long)]
    pub catalog: PathBuf,
    /// Report id.
    #[arg(long)]
    pub report: String,
    /// Parameter as NAME=VALUE. Repeat for each parameter.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,
    /// Subject recorded in the audit log.
    #[arg(long)]
    pub subject: Option<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[arg(long)]
    pub catalog: PathBuf,
    #[arg(long)]
    pub report: String,
    /// Encoded identity, e.g. 'West|Sales|2024'.
    #[arg(long)]
    pub identity: String,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    #[arg(long)]
    pub catalog: PathBuf,
    #[arg(long)]
    pub report: String,
    #[arg(long)]
    pub identity: String,
    /// JSON array of rows. Defaults to the report's preview rows.
    #[arg(long)]
    pub rows: Option<PathBuf>,
}

/// Parse `NAME=VALUE`. The value is always passed as text; integer
/// parameters accept canonical decimal text during validation.
pub fn parse_param(raw: &str) -> Result<(String, ParameterValue)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("parameter must be NAME=VALUE, got '{raw}'");
    };
    if name.is_empty() {
        bail!("parameter name is empty in '{raw}'");
    }
    Ok((name.to_string(), ParameterValue::Text(value.to_string())))
}

/// Parse every `--param` into an ordered set. Duplicates are kept so the
/// encoder reports them.
pub fn parse_params(raw: &[String]) -> Result<ParameterSet> {
    raw.iter().map(|p| parse_param(p)).collect()
}

/// Validate and encode through the auditing encoder.
pub fn encode_params(
    report: &ReportDefinition,
    params: &ParameterSet,
    subject: Option<&str>,
) -> Result<EncodedIdentity, EncodeError> {
    IdentityEncoder::new(Arc::new(TracingAuditSink)).encode(report, params, subject)
}

/// `NAME = VALUE (type)` per parameter, or `None` if decoding fails.
pub fn describe_decoded(report: &ReportDefinition, identity: &EncodedIdentity) -> Option<Vec<String>> {
    let values = decode_identity(identity, &report.schema)?;
    Some(
        report
            .schema
            .parameters()
            .iter()
            .zip(values.iter())
            .map(|(decl, value)| format!("{} = {} ({})", decl.name, value.canonical_text(), decl.kind))
            .collect(),
    )
}

/// Rows of `rows_path` (or the preview rows) visible to `identity`.
pub fn filter_rows(
    report: &ReportDefinition,
    identity: &EncodedIdentity,
    rows_path: Option<&Path>,
) -> Result<Vec<DataRow>> {
    let evaluator = PolicyEvaluator::new(&report.schema);
    if evaluator.compile(identity).is_deny_all() {
        tracing::warn!(report_id = %report.id, "identity does not decode; every row is denied");
    }
    match rows_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read rows {}", path.display()))?;
            let rows: Vec<DataRow> = serde_json::from_str(&raw)
                .with_context(|| format!("rows file {} is not a JSON array of objects", path.display()))?;
            Ok(evaluator.filter_rows(&rows, identity))
        }
        None => Ok(evaluator.filter_rows(&report.rows, identity)),
    }
}

pub fn run_encode(args: &EncodeArgs) -> Result<u8> {
    let catalog = crate::load_catalog(&args.catalog)?;
    let report = crate::find_report(&catalog, &args.report)?;
    let params = parse_params(&args.params)?;
    match encode_params(report, &params, args.subject.as_deref()) {
        Ok(identity) => {
            println!("{identity}");
            Ok(0)
        }
        Err(e) => {
            eprintln!("REJECTED [{}]: {e}", e.kind());
            Ok(1)
        }
    }
}

pub fn run_decode(args: &DecodeArgs) -> Result<u8> {
    let catalog = crate::load_catalog(&args.catalog)?;
    let report = crate::find_report(&catalog, &args.report)?;
    let identity = EncodedIdentity::from_wire(args.identity.as_str());
    match describe_decoded(report, &identity) {
        Some(lines) => {
            for line in lines {
                println!("{line}");
            }
            Ok(0)
        }
        None => {
            eprintln!(
                "FAIL-CLOSED: identity does not decode against '{}' ({} parameter(s), wire {}); every row is denied",
                report.id,
                report.schema.len(),
                report.schema.wire()
            );
            Ok(1)
        }
    }
}

pub fn run_filter(args: &FilterArgs) -> Result<u8> {
    let catalog = crate::load_catalog(&args.catalog)?;
    let report = crate::find_report(&catalog, &args.report)?;
    let identity = EncodedIdentity::from_wire(args.identity.as_str());
    let visible = filter_rows(report, &identity, args.rows.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&visible)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_stay_text() {
        assert_eq!(
            parse_param("Year=2024").unwrap(),
            ("Year".to_string(), ParameterValue::Text("2024".into()))
        );
        assert_eq!(
            parse_param("Code=007").unwrap().1,
            ParameterValue::Text("007".into())
        );
        assert_eq!(
            parse_param("Region=West").unwrap().1,
            ParameterValue::Text("West".into())
        );
    }

    #[test]
    fn value_may_contain_equals() {
        assert_eq!(
            parse_param("Note=a=b").unwrap(),
            ("Note".to_string(), ParameterValue::Text("a=b".into()))
        );
    }

    #[test]
    fn malformed_params_rejected() {
        assert!(parse_param("Region").is_err());
        assert!(parse_param("=West").is_err());
    }

    #[test]
    fn duplicates_are_preserved() {
        let set = parse_params(&["Region=West".into(), "Region=East".into()]).unwrap();
        assert_eq!(set.len(), 2);
    }
}
