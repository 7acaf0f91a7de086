//! # Data Rows
//!
//! The evaluator's view of a dataset row: column name to cell value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Absent value. Never matches.
    Null,
    /// Integer cell.
    Integer(i64),
    /// Text cell.
    Text(String),
    /// Multi-valued cell, compared with the `member` operator.
    List(Vec<String>),
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for CellValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// One dataset row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRow(BTreeMap<String, CellValue>);

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for DataRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_mixed_cells() {
        let row: DataRow = serde_json::from_str(
            r#"{"Region": "West", "Year": 2024, "Tags": ["a", "b"], "Owner": null}"#,
        )
        .unwrap();
        assert_eq!(row.get("Region"), Some(&CellValue::from("West")));
        assert_eq!(row.get("Year"), Some(&CellValue::Integer(2024)));
        assert_eq!(
            row.get("Tags"),
            Some(&CellValue::List(vec!["a".into(), "b".into()]))
        );
        assert_eq!(row.get("Owner"), Some(&CellValue::Null));
        assert_eq!(row.get("Missing"), None);
    }

    #[test]
    fn builder_and_serialization() {
        let row = DataRow::new().with("Year", 2024).with("Region", "West");
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"Region":"West","Year":2024}"#
        );
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["Region", "Year"]);
    }
}
