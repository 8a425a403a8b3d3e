//! Property-based tests for pointers and compiled validation
//!
//! These tests verify that the namespace URI form of pointers is invertible
//! and that validators agree with the bounds they were compiled from.

use paramval_schemas::{CompiledValidator, JsonPointer, RegistrySnapshot, SchemaValidator};
use proptest::prelude::*;
use serde_json::json;

/// Strategy for pointer segments, including characters that need escaping
fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_-]{1,12}",
        "[a-z /~%#?]{1,8}",
        (0u32..50).prop_map(|n| n.to_string()),
    ]
}

proptest! {
    #[test]
    fn prop_uri_form_is_invertible(segments in proptest::collection::vec(segment_strategy(), 0..6)) {
        let pointer = JsonPointer::from_segments(segments);
        let uri = pointer.to_uri();
        prop_assert_eq!(JsonPointer::from_uri(&uri), Some(pointer.clone()));
        prop_assert_eq!(JsonPointer::parse(&pointer.to_string()).unwrap(), pointer);
    }

    #[test]
    fn prop_bounded_integers(lower in -1000i64..0, upper in 0i64..1000, value in -2000i64..2000) {
        let validator = CompiledValidator::compile(
            &json!({"type": "integer", "minimum": lower, "maximum": upper}),
            &RegistrySnapshot::default(),
        ).unwrap();

        let inside = value >= lower && value <= upper;
        prop_assert_eq!(validator.is_valid(&json!(value)), inside);

        match validator.validate(&json!(value)) {
            Ok(()) => prop_assert!(inside),
            Err(report) => {
                prop_assert!(!inside);
                prop_assert!(!report.is_empty());
            }
        }
    }
}
