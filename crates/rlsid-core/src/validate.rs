//! # Validation — The Untrusted-Input Gate
//!
//! [`validate()`] turns a caller-supplied [`ParameterSet`] into
//! [`ValidatedParameters`]. Checks run in three stages and the first failure
//! wins:
//!
//! 1. **Names.** Undeclared, duplicated and missing names are
//!    [`InvalidParameter`].
//! 2. **Structure.** Empty values, values containing the separator (unless
//!    the parameter is `free_text`) and values with control characters are
//!    [`InvalidParameter`].
//! 3. **Type and constraint.** A value of the wrong type, outside its
//!    allow-list, range or length limit is [`NotAllowed`].
//!
//! Values are never interpolated into a query language. After this gate
//! they only ever reach the fixed positional wire format.

use crate::error::{EncodeError, InvalidParameter, NotAllowed};
use crate::params::{ParameterSet, ValidatedParameters};
use crate::schema::{Constraint, ParameterDecl, ParameterSchema};
use crate::value::{parse_canonical_integer, ParameterValue, ValueKind};
use crate::wire::{self, EncodedIdentity, WireError, SEPARATOR};

/// Validate `params` against `schema`, returning typed values in schema order.
///
/// # Errors
///
/// [`EncodeError::InvalidParameter`] for name and structural failures,
/// [`EncodeError::ParameterNotAllowed`] for type and constraint failures.
pub fn validate(
    params: &ParameterSet,
    schema: &ParameterSchema,
) -> Result<ValidatedParameters, EncodeError> {
    let unknown = params
        .iter()
        .filter(|(name, _)| schema.position(name).is_none())
        .count();
    if unknown > 0 {
        return Err(InvalidParameter::Unknown { count: unknown }.into());
    }

    let mut slots: Vec<Option<&ParameterValue>> = vec![None; schema.len()];
    for (name, value) in params.iter() {
        let Some(position) = schema.position(name) else {
            continue;
        };
        if slots[position].is_some() {
            return Err(InvalidParameter::Duplicate {
                name: name.to_string(),
            }
            .into());
        }
        slots[position] = Some(value);
    }

    let supplied = schema
        .parameters()
        .iter()
        .zip(slots)
        .map(|(decl, slot)| {
            slot.map(|value| (decl, value))
                .ok_or_else(|| InvalidParameter::Missing {
                    name: decl.name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (decl, value) in &supplied {
        check_text(&decl.name, &value.canonical_text(), decl.free_text)?;
    }

    let values = supplied
        .into_iter()
        .map(|(decl, value)| check_value(decl, value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedParameters::new(values))
}

/// Validate and pack `params` into an [`EncodedIdentity`].
///
/// Deterministic: the same set and schema always produce the same string.
///
/// # Errors
///
/// Everything [`validate()`] rejects, plus
/// [`InvalidParameter::IdentityTooLong`] when the packed identity exceeds
/// [`crate::MAX_IDENTITY_LEN`].
pub fn encode(
    params: &ParameterSet,
    schema: &ParameterSchema,
) -> Result<EncodedIdentity, EncodeError> {
    let validated = validate(params, schema)?;
    encode_validated(&validated, schema)
}

/// Pack already-validated values, enforcing the identity length limit.
///
/// # Errors
///
/// [`InvalidParameter::IdentityTooLong`] when the packed identity exceeds
/// [`crate::MAX_IDENTITY_LEN`].
pub fn encode_validated(
    validated: &ValidatedParameters,
    schema: &ParameterSchema,
) -> Result<EncodedIdentity, EncodeError> {
    wire::encode_identity(validated, schema.wire()).map_err(|err| {
        let name_at = |position: usize| {
            schema
                .parameters()
                .get(position)
                .map(|d| d.name.clone())
                .unwrap_or_default()
        };
        let invalid = match err {
            WireError::TooLong { max, actual } => InvalidParameter::IdentityTooLong { max, actual },
            WireError::EmptyField { position } => InvalidParameter::Empty {
                name: name_at(position),
            },
            WireError::SeparatorInField { position } => InvalidParameter::ContainsSeparator {
                name: name_at(position),
            },
        };
        EncodeError::InvalidParameter(invalid)
    })
}

/// Structural check shared by validation and schema allow-list checks.
pub(crate) fn check_text(
    name: &str,
    text: &str,
    allow_separator: bool,
) -> Result<(), InvalidParameter> {
    let owned = || name.to_string();
    if text.is_empty() {
        return Err(InvalidParameter::Empty { name: owned() });
    }
    if !allow_separator && text.contains(SEPARATOR) {
        return Err(InvalidParameter::ContainsSeparator { name: owned() });
    }
    if text.chars().any(char::is_control) {
        return Err(InvalidParameter::ControlCharacter { name: owned() });
    }
    Ok(())
}

fn check_value(decl: &ParameterDecl, value: &ParameterValue) -> Result<ParameterValue, NotAllowed> {
    let type_mismatch = || NotAllowed::TypeMismatch {
        name: decl.name.clone(),
        expected: decl.kind,
    };
    let typed = match (decl.kind, value) {
        (ValueKind::String, ParameterValue::Text(s)) => ParameterValue::Text(s.clone()),
        (ValueKind::Integer, ParameterValue::Integer(n)) => ParameterValue::Integer(*n),
        (ValueKind::Integer, ParameterValue::Text(s)) => parse_canonical_integer(s)
            .map(ParameterValue::Integer)
            .ok_or_else(type_mismatch)?,
        (ValueKind::String, ParameterValue::Integer(_)) => return Err(type_mismatch()),
    };

    match &decl.constraint {
        Constraint::Unconstrained => {}
        Constraint::OneOf { values } => {
            let text = typed.canonical_text();
            if !values.iter().any(|allowed| *allowed == text) {
                return Err(NotAllowed::NotInAllowList {
                    name: decl.name.clone(),
                });
            }
        }
        Constraint::IntRange { min, max } => match typed.as_integer() {
            Some(n) if (*min..=*max).contains(&n) => {}
            _ => {
                return Err(NotAllowed::OutOfRange {
                    name: decl.name.clone(),
                })
            }
        },
        Constraint::Text { max_len } => {
            if typed.canonical_text().chars().count() > *max_len {
                return Err(NotAllowed::TooLong {
                    name: decl.name.clone(),
                    max_len: *max_len,
                });
            }
        }
    }
    Ok(typed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{WireVersion, MAX_IDENTITY_LEN};

    fn sales_schema() -> ParameterSchema {
        ParameterSchema::new(
            vec![
                ParameterDecl::string("Region").with_constraint(Constraint::OneOf {
                    values: vec!["West".into(), "East".into(), "North".into()],
                }),
                ParameterDecl::string("Department"),
                ParameterDecl::integer("Year")
                    .with_constraint(Constraint::IntRange { min: 2000, max: 2100 }),
            ],
            WireVersion::V1,
        )
        .unwrap()
    }

    fn west_sales() -> ParameterSet {
        ParameterSet::new()
            .with("Region", "West")
            .with("Department", "Sales")
            .with("Year", 2024)
    }

    fn invalid(err: EncodeError) -> InvalidParameter {
        match err {
            EncodeError::InvalidParameter(inner) => inner,
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    fn not_allowed(err: EncodeError) -> NotAllowed {
        match err {
            EncodeError::ParameterNotAllowed(inner) => inner,
            other => panic!("expected ParameterNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn scenario_encodes_in_schema_order() {
        let identity = encode(&west_sales(), &sales_schema()).unwrap();
        assert_eq!(identity.as_str(), "West|Sales|2024");
    }

    #[test]
    fn supplied_order_does_not_matter() {
        let shuffled = ParameterSet::new()
            .with("Year", 2024)
            .with("Department", "Sales")
            .with("Region", "West");
        assert_eq!(
            encode(&shuffled, &sales_schema()).unwrap().as_str(),
            "West|Sales|2024"
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let schema = sales_schema();
        assert_eq!(
            encode(&west_sales(), &schema).unwrap(),
            encode(&west_sales(), &schema).unwrap()
        );
    }

    #[test]
    fn unknown_names_are_counted() {
        let params = west_sales().with("Country", "US").with("Secret", "x");
        assert_eq!(
            invalid(validate(&params, &sales_schema()).unwrap_err()),
            InvalidParameter::Unknown { count: 2 }
        );
    }

    #[test]
    fn unknown_names_are_never_echoed() {
        let params = west_sales().with("DROP TABLE", "x");
        let message = validate(&params, &sales_schema()).unwrap_err().to_string();
        assert!(!message.contains("DROP"));
    }

    #[test]
    fn duplicate_name_rejected() {
        let params = west_sales().with("Region", "East");
        assert_eq!(
            invalid(validate(&params, &sales_schema()).unwrap_err()),
            InvalidParameter::Duplicate {
                name: "Region".into()
            }
        );
    }

    #[test]
    fn missing_name_rejected() {
        let params = ParameterSet::new().with("Region", "West").with("Year", 2024);
        assert_eq!(
            invalid(validate(&params, &sales_schema()).unwrap_err()),
            InvalidParameter::Missing {
                name: "Department".into()
            }
        );
    }

    #[test]
    fn separator_rejected_before_constraints() {
        let params = ParameterSet::new()
            .with("Region", "West")
            .with("Department", "Sales|Marketing")
            .with("Year", 2024);
        assert_eq!(
            invalid(encode(&params, &sales_schema()).unwrap_err()),
            InvalidParameter::ContainsSeparator {
                name: "Department".into()
            }
        );
    }

    #[test]
    fn empty_and_control_characters_rejected() {
        let empty = ParameterSet::new()
            .with("Region", "West")
            .with("Department", "")
            .with("Year", 2024);
        assert!(matches!(
            invalid(validate(&empty, &sales_schema()).unwrap_err()),
            InvalidParameter::Empty { .. }
        ));
        let control = ParameterSet::new()
            .with("Region", "West")
            .with("Department", "Sa\u{0}les")
            .with("Year", 2024);
        assert!(matches!(
            invalid(validate(&control, &sales_schema()).unwrap_err()),
            InvalidParameter::ControlCharacter { .. }
        ));
    }

    #[test]
    fn structural_checks_run_before_type_checks() {
        // Region is not in its allow-list and Department contains the separator;
        // the structural failure is reported.
        let params = ParameterSet::new()
            .with("Region", "South")
            .with("Department", "a|b")
            .with("Year", 2024);
        assert!(matches!(
            validate(&params, &sales_schema()).unwrap_err(),
            EncodeError::InvalidParameter(_)
        ));
    }

    #[test]
    fn allow_list_enforced() {
        let params = ParameterSet::new()
            .with("Region", "South")
            .with("Department", "Sales")
            .with("Year", 2024);
        assert_eq!(
            not_allowed(validate(&params, &sales_schema()).unwrap_err()),
            NotAllowed::NotInAllowList {
                name: "Region".into()
            }
        );
    }

    #[test]
    fn allow_list_is_case_sensitive() {
        let params = ParameterSet::new()
            .with("Region", "west")
            .with("Department", "Sales")
            .with("Year", 2024);
        assert!(matches!(
            not_allowed(validate(&params, &sales_schema()).unwrap_err()),
            NotAllowed::NotInAllowList { .. }
        ));
    }

    #[test]
    fn range_enforced() {
        let params = ParameterSet::new()
            .with("Region", "West")
            .with("Department", "Sales")
            .with("Year", 1999);
        assert_eq!(
            not_allowed(validate(&params, &sales_schema()).unwrap_err()),
            NotAllowed::OutOfRange {
                name: "Year".into()
            }
        );
    }

    #[test]
    fn integer_accepts_canonical_text_only() {
        let as_text = ParameterSet::new()
            .with("Region", "West")
            .with("Department", "Sales")
            .with("Year", "2024");
        let validated = validate(&as_text, &sales_schema()).unwrap();
        assert_eq!(validated.get(2), Some(&ParameterValue::Integer(2024)));

        let padded = ParameterSet::new()
            .with("Region", "West")
            .with("Department", "Sales")
            .with("Year", "02024");
        assert!(matches!(
            not_allowed(validate(&padded, &sales_schema()).unwrap_err()),
            NotAllowed::TypeMismatch { .. }
        ));
    }

    #[test]
    fn string_rejects_integer() {
        let params = ParameterSet::new()
            .with("Region", "West")
            .with("Department", 7)
            .with("Year", 2024);
        assert_eq!(
            not_allowed(validate(&params, &sales_schema()).unwrap_err()),
            NotAllowed::TypeMismatch {
                name: "Department".into(),
                expected: ValueKind::String
            }
        );
    }

    #[test]
    fn text_length_counts_characters() {
        let schema = ParameterSchema::new(
            vec![ParameterDecl::string("City").with_constraint(Constraint::Text { max_len: 4 })],
            WireVersion::V1,
        )
        .unwrap();
        assert!(validate(&ParameterSet::new().with("City", "Köln"), &schema).is_ok());
        assert!(matches!(
            not_allowed(validate(&ParameterSet::new().with("City", "Kölner"), &schema).unwrap_err()),
            NotAllowed::TooLong { max_len: 4, .. }
        ));
    }

    #[test]
    fn identity_too_long_rejected() {
        let schema = ParameterSchema::new(
            vec![ParameterDecl::string("A"), ParameterDecl::string("B")],
            WireVersion::V1,
        )
        .unwrap();
        let params = ParameterSet::new()
            .with("A", "a".repeat(200))
            .with("B", "b".repeat(100));
        assert_eq!(
            invalid(encode(&params, &schema).unwrap_err()),
            InvalidParameter::IdentityTooLong {
                max: MAX_IDENTITY_LEN,
                actual: 301
            }
        );
    }

    #[test]
    fn free_text_allows_separator_under_v2() {
        let schema = ParameterSchema::new(
            vec![
                ParameterDecl::string("Notes").free_text(),
                ParameterDecl::string("Department"),
            ],
            WireVersion::V2,
        )
        .unwrap();
        let params = ParameterSet::new()
            .with("Notes", "draft|final")
            .with("Department", "Sales");
        assert_eq!(
            encode(&params, &schema).unwrap().as_str(),
            "draft%7Cfinal|Sales"
        );

        let not_free = ParameterSet::new()
            .with("Notes", "draft")
            .with("Department", "Sa|les");
        assert!(matches!(
            invalid(encode(&not_free, &schema).unwrap_err()),
            InvalidParameter::ContainsSeparator { .. }
        ));
    }

    #[test]
    fn rejected_values_never_appear_in_messages() {
        let params = ParameterSet::new()
            .with("Region", "' OR 1=1 --")
            .with("Department", "Sales")
            .with("Year", 2024);
        let message = validate(&params, &sales_schema()).unwrap_err().to_string();
        assert!(!message.contains("OR 1=1"));
        assert!(message.contains("Region"));
    }
}
