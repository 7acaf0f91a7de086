//! # Report Catalog
//!
//! The set of reports a deployment serves, each with its parameter schema
//! and an optional preview dataset. Catalogs are authored in YAML:
//!
//! ```yaml
//! reports:
//!   - id: regional-sales
//!     title: Regional sales
//!     schema:
//!       wire: v1
//!       parameters:
//!         - { name: Region, type: string }
//!         - { name: Department, type: string }
//!         - { name: Year, type: integer }
//!     rows:
//!       - { Region: West, Department: Sales, Year: 2024 }
//! ```
//!
//! Every schema is validated while the catalog is parsed; a catalog with a
//! single bad schema does not load.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, ValidationError};
use crate::row::DataRow;
use crate::schema::ParameterSchema;

impl<'de> Deserialize<'de> for ReportId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A report identifier: 1-64 characters of `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ReportId(String);

impl ReportId {
    /// Create a report identifier, validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidReportId`] if the string is empty,
    /// longer than 64 characters, or contains other characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let valid = !value.is_empty()
            && value.len() <= 64
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !valid {
            return Err(ValidationError::InvalidReportId);
        }
        Ok(Self(value))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ReportId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// One report: its identity contract and preview rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportDefinition {
    pub id: ReportId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub schema: ParameterSchema,
    #[serde(default)]
    pub rows: Vec<DataRow>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    reports: Vec<ReportDefinition>,
}

/// Reports keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ReportCatalog {
    reports: BTreeMap<String, ReportDefinition>,
}

impl ReportCatalog {
    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Parse`] for malformed YAML or an invalid schema,
    /// [`CatalogError::DuplicateReport`] and [`CatalogError::Empty`] for
    /// catalog-level problems.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_yaml::from_str(yaml)?;
        if raw.reports.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut catalog = Self::default();
        for report in raw.reports {
            catalog.insert(report)?;
        }
        Ok(catalog)
    }

    /// Read and parse a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Add a report, rejecting a repeated id.
    pub fn insert(&mut self, report: ReportDefinition) -> Result<(), CatalogError> {
        let key = report.id.as_str().to_string();
        if self.reports.contains_key(&key) {
            return Err(CatalogError::DuplicateReport(key));
        }
        self.reports.insert(key, report);
        Ok(())
    }

    /// Look up a report by id string.
    pub fn get(&self, id: &str) -> Option<&ReportDefinition> {
        self.reports.get(id)
    }

    /// Reports in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ReportDefinition> {
        self.reports.values()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
