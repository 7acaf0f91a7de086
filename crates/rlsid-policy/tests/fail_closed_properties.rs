//! # Encoder-to-Evaluator Properties
//!
//! End-to-end checks across the untrusted and trusted halves:
//! - Scenario: West/Sales/2024
//! - Fail-closed decoding for any wrong field count
//! - AND-composition: flipping any single value hides the row
//! - Determinism of evaluation
//! - Expired, tampered and cross-report credentials see nothing

use std::sync::Arc;

use proptest::prelude::*;
use rlsid_core::{
    CellValue, DataRow, EncodedIdentity, ParameterDecl, ParameterSchema, ParameterSet,
    ReportCatalog, WireVersion,
};
use rlsid_encoder::{CredentialIssuer, IdentityEncoder, MemoryAuditTrail};
use rlsid_policy::{evaluate, AccessDecision, PolicyEvaluator, RenderBoundary, RowPredicate};

const CATALOG: &str = r#"
reports:
  - id: regional-sales
    schema:
      parameters:
        - { name: Region, type: string }
        - { name: Department, type: string }
        - { name: Year, type: integer }
    rows:
      - { Region: West, Department: Sales, Year: 2024, Revenue: 100 }
      - { Region: East, Department: Sales, Year: 2024, Revenue: 200 }
      - { Region: West, Department: Finance, Year: 2024, Revenue: 300 }
      - { Region: West, Department: Sales, Year: 2023, Revenue: 400 }
  - id: headcount
    schema:
      parameters:
        - { name: Region, type: string }
        - { name: Department, type: string }
        - { name: Year, type: integer }
"#;

fn sales_schema() -> ParameterSchema {
    ParameterSchema::new(
        vec![
            ParameterDecl::string("Region"),
            ParameterDecl::string("Department"),
            ParameterDecl::integer("Year"),
        ],
        WireVersion::V1,
    )
    .unwrap()
}

fn row(region: &str, department: &str, year: i64) -> DataRow {
    DataRow::new()
        .with("Region", region)
        .with("Department", department)
        .with("Year", year)
}

fn west_sales() -> ParameterSet {
    ParameterSet::new()
        .with("Region", "West")
        .with("Department", "Sales")
        .with("Year", 2024)
}

fn word() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,12}"
}

// ---------------------------------------------------------------------------
// 1. Scenario
// ---------------------------------------------------------------------------

#[test]
fn scenario_end_to_end() {
    let catalog = ReportCatalog::from_yaml_str(CATALOG).unwrap();
    let report = catalog.get("regional-sales").unwrap();
    let encoder = IdentityEncoder::new(Arc::new(MemoryAuditTrail::default()));

    let identity = encoder.encode(report, &west_sales(), None).unwrap();
    assert_eq!(identity.as_str(), "West|Sales|2024");

    let evaluator = PolicyEvaluator::new(&report.schema);
    assert_eq!(
        evaluator.evaluate(&row("West", "Sales", 2024), &identity),
        AccessDecision::Allow
    );
    assert_eq!(
        evaluator.evaluate(&row("East", "Sales", 2024), &identity),
        AccessDecision::Deny
    );

    let visible = evaluator.filter_rows(&report.rows, &identity);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].get("Revenue"), Some(&CellValue::Integer(100)));

    let truncated = EncodedIdentity::from_wire("West|Sales");
    assert!(evaluator.filter_rows(&report.rows, &truncated).is_empty());
}

// ---------------------------------------------------------------------------
// 2. Credentials through the render boundary
// ---------------------------------------------------------------------------

#[test]
fn credential_lifecycle() {
    let catalog = Arc::new(ReportCatalog::from_yaml_str(CATALOG).unwrap());
    let sales = catalog.get("regional-sales").unwrap();
    let issuer =
        CredentialIssuer::new(rlsid_crypto::SigningKey::from_bytes(&[8u8; 32]), 3600).unwrap();
    let boundary = RenderBoundary::new(issuer.verifying_key(), catalog.clone());
    let encoder = IdentityEncoder::new(Arc::new(MemoryAuditTrail::default()));

    let identity = encoder.encode(sales, &west_sales(), Some("alice")).unwrap();
    let credential = issuer.issue(sales, identity, 1_000).unwrap();

    let fresh = boundary.render_preview("regional-sales", &credential, 1_001);
    assert_eq!(fresh.rows.len(), 1);

    let expired = boundary.render_preview("regional-sales", &credential, 1_000 + 3600);
    assert!(expired.rows.is_empty());

    let other = boundary.render_preview("headcount", &credential, 1_001);
    assert!(other.rows.is_empty());

    let mut tampered = credential.clone();
    tampered.claims.identity = EncodedIdentity::from_wire("East|Sales|2024");
    assert!(boundary
        .render_preview("regional-sales", &tampered, 1_001)
        .rows
        .is_empty());

    let foreign = CredentialIssuer::new(rlsid_crypto::SigningKey::from_bytes(&[9u8; 32]), 3600)
        .unwrap()
        .issue(sales, EncodedIdentity::from_wire("West|Sales|2024"), 1_000)
        .unwrap();
    assert!(boundary
        .render_preview("regional-sales", &foreign, 1_001)
        .rows
        .is_empty());
}

// ---------------------------------------------------------------------------
// 3. Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn wrong_field_count_denies_every_row(
        fields in prop::collection::vec(word(), 0..7),
        region in word(),
        department in word(),
        year in any::<i64>(),
    ) {
        prop_assume!(fields.len() != 3);
        let identity = EncodedIdentity::from_wire(fields.join("|"));
        let schema = sales_schema();
        prop_assert!(RowPredicate::compile(&identity, &schema).is_deny_all());
        prop_assert_eq!(
            evaluate(&row(&region, &department, year), &identity, &schema),
            AccessDecision::Deny
        );
    }

    #[test]
    fn row_visible_iff_every_parameter_matches(
        region in word(),
        department in word(),
        year in any::<i64>(),
        flip in 0usize..3,
        other in word(),
    ) {
        let schema = sales_schema();
        let params = ParameterSet::new()
            .with("Region", region.clone())
            .with("Department", department.clone())
            .with("Year", year);
        let identity = rlsid_core::encode(&params, &schema).unwrap();
        let matching = row(&region, &department, year);
        prop_assert_eq!(evaluate(&matching, &identity, &schema), AccessDecision::Allow);

        let flipped = match flip {
            0 => {
                prop_assume!(other != region);
                row(&other, &department, year)
            }
            1 => {
                prop_assume!(other != department);
                row(&region, &other, year)
            }
            _ => row(&region, &department, year.wrapping_add(1)),
        };
        prop_assert_eq!(evaluate(&flipped, &identity, &schema), AccessDecision::Deny);
    }

    #[test]
    fn evaluation_is_deterministic(region in word(), year in any::<i64>()) {
        let schema = sales_schema();
        let identity = EncodedIdentity::from_wire(format!("{region}|Sales|{year}"));
        let r = row(&region, "Sales", year);
        prop_assert_eq!(
            evaluate(&r, &identity, &schema),
            evaluate(&r, &identity, &schema)
        );
    }
}
