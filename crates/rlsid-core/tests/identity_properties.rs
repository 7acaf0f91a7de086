//! # Identity Encoding Properties
//!
//! Property tests for the encoder half of the identity contract:
//! - Round-trip: decode(encode(p)) equals validate(p)
//! - Injection safety: separator-bearing values never reach the wire
//! - Fail-closed decode on wrong field counts
//! - Determinism

use proptest::prelude::*;
use rlsid_core::wire::{decode_identity, unpack};
use rlsid_core::{
    encode, validate, EncodeError, EncodedIdentity, InvalidParameter, ParameterDecl,
    ParameterSchema, ParameterSet, WireVersion,
};

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

fn free_text_schema() -> ParameterSchema {
    ParameterSchema::new(
        vec![
            ParameterDecl::string("Note").free_text(),
            ParameterDecl::integer("Year"),
        ],
        WireVersion::V2,
    )
    .unwrap()
}

/// Printable text without the separator.
fn field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 %&'\"=;,._-]{1,40}"
}

proptest! {
    #[test]
    fn decode_inverts_encode(region in field(), department in field(), year in any::<i64>()) {
        let schema = sales_schema();
        let params = ParameterSet::new()
            .with("Region", region)
            .with("Department", department)
            .with("Year", year);
        let identity = encode(&params, &schema).unwrap();
        let decoded = decode_identity(&identity, &schema).unwrap();
        prop_assert_eq!(decoded, validate(&params, &schema).unwrap());
    }

    #[test]
    fn v2_free_text_round_trips(note in "[ -~]{1,60}", year in 0i64..10_000) {
        let schema = free_text_schema();
        let params = ParameterSet::new().with("Note", note).with("Year", year);
        let identity = encode(&params, &schema).unwrap();
        prop_assert_eq!(unpack(&identity, 2, WireVersion::V2).map(|f| f.len()), Some(2));
        let decoded = decode_identity(&identity, &schema).unwrap();
        prop_assert_eq!(decoded, validate(&params, &schema).unwrap());
    }

    #[test]
    fn separator_is_rejected_before_packing(
        prefix in "[A-Za-z]{0,10}",
        suffix in "[A-Za-z]{0,10}",
    ) {
        let poisoned = format!("{prefix}|{suffix}");
        let params = ParameterSet::new()
            .with("Region", "West")
            .with("Department", poisoned)
            .with("Year", 2024);
        let err = encode(&params, &sales_schema()).unwrap_err();
        prop_assert_eq!(
            err,
            EncodeError::InvalidParameter(InvalidParameter::ContainsSeparator {
                name: "Department".into()
            })
        );
    }

    #[test]
    fn wrong_field_count_never_decodes(fields in prop::collection::vec(field(), 0..8)) {
        prop_assume!(fields.len() != 3);
        let identity = EncodedIdentity::from_wire(fields.join("|"));
        prop_assert!(decode_identity(&identity, &sales_schema()).is_none());
    }

    #[test]
    fn encoding_is_deterministic(region in field(), year in any::<i64>()) {
        let schema = sales_schema();
        let params = ParameterSet::new()
            .with("Year", year)
            .with("Department", "Sales")
            .with("Region", region);
        prop_assert_eq!(encode(&params, &schema).unwrap(), encode(&params, &schema).unwrap());
    }
}

#[test]
fn scenario_identity() {
    let params: ParameterSet =
        serde_json::from_str(r#"{"Region": "West", "Department": "Sales", "Year": 2024}"#).unwrap();
    let identity = encode(&params, &sales_schema()).unwrap();
    assert_eq!(identity.as_str(), "West|Sales|2024");
    assert!(decode_identity(&EncodedIdentity::from_wire("West|Sales"), &sales_schema()).is_none());
}
