//! # Policy Evaluator
//!
//! The trusted side of the identity contract: decode an [`EncodedIdentity`]
//! against a [`ParameterSchema`] and decide, row by row, whether the row is
//! visible.
//!
//! ## Fail-Closed Decoding
//!
//! An identity is compiled once into a [`RowPredicate`]. If decoding fails
//! for any reason (wrong field count, empty field, bad escape, non-integer
//! in an integer position) the predicate is [`RowPredicate::DenyAll`]. A
//! malformed identity is never read as "no filter".
//!
//! ## Determinism
//!
//! Evaluation is a pure function of (row, identity, schema): no I/O, no
//! clock, no shared state. The combined predicate is the logical AND of one
//! comparison per declared parameter.

use rlsid_core::wire::decode_identity;
use rlsid_core::{CellValue, DataRow, EncodedIdentity, Operator, ParameterSchema, ParameterValue};
use serde::Serialize;

/// Per-row outcome. Never persisted and never shown to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// The row matches every declared parameter.
    Allow,
    /// At least one comparison failed, or the identity did not decode.
    Deny,
}

impl AccessDecision {
    /// True for [`AccessDecision::Allow`].
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// One column comparison of a compiled predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTest {
    /// Dataset column read from each row.
    pub column: String,
    /// Comparison applied as `cell OP value`.
    pub operator: Operator,
    /// Decoded identity value for this position.
    pub value: ParameterValue,
}

impl ColumnTest {
    /// Missing columns, null cells and type mismatches never match.
    pub fn matches(&self, row: &DataRow) -> bool {
        let Some(cell) = row.get(&self.column) else {
            return false;
        };
        match (self.operator, cell, &self.value) {
            (Operator::Eq, CellValue::Text(cell), ParameterValue::Text(value)) => cell == value,
            (Operator::Eq, CellValue::Integer(cell), ParameterValue::Integer(value)) => {
                cell == value
            }
            (Operator::Lt, CellValue::Integer(cell), ParameterValue::Integer(value)) => cell < value,
            (Operator::Le, CellValue::Integer(cell), ParameterValue::Integer(value)) => {
                cell <= value
            }
            (Operator::Gt, CellValue::Integer(cell), ParameterValue::Integer(value)) => cell > value,
            (Operator::Ge, CellValue::Integer(cell), ParameterValue::Integer(value)) => {
                cell >= value
            }
            (Operator::Member, CellValue::List(items), value) => {
                let needle = value.canonical_text();
                items.iter().any(|item| *item == needle)
            }
            _ => false,
        }
    }
}

/// An identity compiled against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowPredicate {
    /// The identity did not decode. Every row is denied.
    DenyAll,
    /// A row is visible iff every test matches.
    Tests(Vec<ColumnTest>),
}

impl RowPredicate {
    /// Decode `identity` and build one test per schema position.
    pub fn compile(identity: &EncodedIdentity, schema: &ParameterSchema) -> Self {
        let Some(values) = decode_identity(identity, schema) else {
            return Self::DenyAll;
        };
        let tests = schema
            .parameters()
            .iter()
            .zip(values.iter())
            .map(|(decl, value)| ColumnTest {
                column: decl.column().to_string(),
                operator: decl.operator,
                value: value.clone(),
            })
            .collect::<Vec<_>>();
        if tests.is_empty() {
            return Self::DenyAll;
        }
        Self::Tests(tests)
    }

    /// True when the identity failed to decode.
    pub fn is_deny_all(&self) -> bool {
        matches!(self, Self::DenyAll)
    }

    /// AND of every column test; always `Deny` for [`RowPredicate::DenyAll`].
    pub fn evaluate(&self, row: &DataRow) -> AccessDecision {
        match self {
            Self::DenyAll => AccessDecision::Deny,
            Self::Tests(tests) if tests.iter().all(|t| t.matches(row)) => AccessDecision::Allow,
            Self::Tests(_) => AccessDecision::Deny,
        }
    }

    /// Visible rows, in input order.
    pub fn filter<'r>(&self, rows: impl IntoIterator<Item = &'r DataRow>) -> Vec<DataRow> {
        if self.is_deny_all() {
            return Vec::new();
        }
        rows.into_iter()
            .filter(|row| self.evaluate(row).is_allow())
            .cloned()
            .collect()
    }
}

/// Evaluates identities against one report schema.
///
/// ```
/// use rlsid_core::{DataRow, EncodedIdentity, ParameterDecl, ParameterSchema, WireVersion};
/// use rlsid_policy::PolicyEvaluator;
///
/// let schema = ParameterSchema::new(
///     vec![ParameterDecl::string("Region"), ParameterDecl::integer("Year")],
///     WireVersion::V1,
/// )
/// .unwrap();
/// let evaluator = PolicyEvaluator::new(&schema);
/// let rows = vec![
///     DataRow::new().with("Region", "West").with("Year", 2024i64),
///     DataRow::new().with("Region", "East").with("Year", 2024i64),
/// ];
///
/// let visible = evaluator.filter_rows(&rows, &EncodedIdentity::from_wire("West|2024"));
/// assert_eq!(visible, vec![rows[0].clone()]);
/// assert!(evaluator.compile(&EncodedIdentity::from_wire("West")).is_deny_all());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PolicyEvaluator<'s> {
    schema: &'s ParameterSchema,
}

impl<'s> PolicyEvaluator<'s> {
    /// Bind an evaluator to the schema of the report being rendered.
    pub fn new(schema: &'s ParameterSchema) -> Self {
        Self { schema }
    }

    /// Decode `identity` once; see [`RowPredicate::compile`].
    pub fn compile(&self, identity: &EncodedIdentity) -> RowPredicate {
        RowPredicate::compile(identity, self.schema)
    }

    /// Decide one row. Prefer [`Self::compile`] when filtering many rows.
    pub fn evaluate(&self, row: &DataRow, identity: &EncodedIdentity) -> AccessDecision {
        self.compile(identity).evaluate(row)
    }

    /// Rows visible to `identity`, in input order. Empty when decoding fails.
    pub fn filter_rows(&self, rows: &[DataRow], identity: &EncodedIdentity) -> Vec<DataRow> {
        self.compile(identity).filter(rows)
    }
}

/// Decide visibility of a single row.
pub fn evaluate(
    row: &DataRow,
    identity: &EncodedIdentity,
    schema: &ParameterSchema,
) -> AccessDecision {
    PolicyEvaluator::new(schema).evaluate(row, identity)
}
