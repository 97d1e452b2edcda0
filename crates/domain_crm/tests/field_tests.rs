//! Schema and coercion properties

use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use domain_crm::entities::{Company, Contact, Deal};
use domain_crm::{CrmError, CustomField, Entity, FieldKind, FieldValue, Schema};
use test_utils::{
    custom_attr_strategy as custom_attr, custom_key_strategy as custom_key, flag_strategy,
    money_strategy, money_string_strategy, remote_id_strategy,
};

fn deal_schema() -> Schema {
    Schema::new("Deal", Deal::standard_fields().iter().cloned()).unwrap()
}

// ============================================================================
// Schema Tests
// ============================================================================

mod schema_tests {
    use super::*;

    #[test]
    fn test_standard_tables_are_valid() {
        assert!(Schema::new("Deal", Deal::standard_fields().iter().cloned()).is_ok());
        assert!(Schema::new("Company", Company::standard_fields().iter().cloned()).is_ok());
        assert!(Schema::new("Contact", Contact::standard_fields().iter().cloned()).is_ok());
    }

    #[test]
    fn test_standard_keys() {
        let schema = deal_schema();
        assert_eq!(schema.resolve("opportunity").unwrap().key(), "OPPORTUNITY");
        assert_eq!(schema.resolve("created_at").unwrap().key(), "DATE_CREATE");
        assert_eq!(schema.id_key(), "ID");
        assert_eq!(schema.custom_fields().count(), 0);
    }

    #[test]
    fn test_custom_field_colliding_with_standard_attribute() {
        let result = deal_schema().with_custom([CustomField::text("title", "UF_CRM_TITLE")]);
        assert!(matches!(result, Err(CrmError::DuplicateAttribute { .. })));
    }

    #[test]
    fn test_custom_field_colliding_with_standard_key() {
        let result = deal_schema().with_custom([CustomField::text("deal_title", "TITLE")]);
        assert!(matches!(result, Err(CrmError::DuplicateKey { .. })));
    }

    #[test]
    fn test_unknown_attribute_names_entity() {
        let err = deal_schema().resolve("colour").unwrap_err();
        assert_eq!(err.to_string(), "Unknown attribute 'colour' on Deal");
    }

    proptest! {
        #[test]
        fn custom_fields_resolve_to_declared_key(attr in custom_attr(), key in custom_key()) {
            let schema = deal_schema()
                .with_custom([CustomField::text(attr.clone(), key.clone())])
                .unwrap();

            let first = schema.resolve(&attr).unwrap().key().to_string();
            let second = schema.resolve(&attr).unwrap().key().to_string();
            prop_assert_eq!(&first, &key);
            prop_assert_eq!(first, second);
            prop_assert!(schema.resolve(&attr).unwrap().is_custom());
            prop_assert!(schema.remote_keys().contains(&key));
        }

        #[test]
        fn duplicate_custom_attribute_is_rejected(attr in custom_attr(), a in custom_key(), b in custom_key()) {
            prop_assume!(a != b);
            let result = deal_schema().with_custom([
                CustomField::text(attr.clone(), a),
                CustomField::select(attr, b),
            ]);
            let is_duplicate = matches!(result, Err(CrmError::DuplicateAttribute { .. }));
            prop_assert!(is_duplicate);
        }

        #[test]
        fn duplicate_custom_key_is_rejected(a in custom_attr(), b in custom_attr(), key in custom_key()) {
            prop_assume!(a != b);
            let result = deal_schema().with_custom([
                CustomField::text(a, key.clone()),
                CustomField::text(b, key),
            ]);
            let is_duplicate = matches!(result, Err(CrmError::DuplicateKey { .. }));
            prop_assert!(is_duplicate);
        }
    }
}

// ============================================================================
// Coercion Tests
// ============================================================================

mod coercion_tests {
    use super::*;

    #[test]
    fn test_empty_strings_read_as_null_for_numeric_kinds() {
        for kind in [FieldKind::Id, FieldKind::Integer, FieldKind::Money, FieldKind::DateTime] {
            assert_eq!(kind.coerce("K", &json!("")).unwrap(), FieldValue::Null);
        }
        assert_eq!(FieldKind::Text.coerce("K", &json!("")).unwrap(), FieldValue::Text(String::new()));
    }

    #[test]
    fn test_boolean_flags() {
        assert_eq!(FieldKind::Boolean.coerce("CLOSED", &json!("Y")).unwrap(), FieldValue::Boolean(true));
        assert_eq!(FieldKind::Boolean.coerce("CLOSED", &json!("N")).unwrap(), FieldValue::Boolean(false));
        assert_eq!(
            FieldKind::Boolean.to_remote("CLOSED", &FieldValue::Boolean(true)).unwrap(),
            json!("Y")
        );
    }

    #[test]
    fn test_mismatched_write_is_coercion_error() {
        let err = FieldKind::Money
            .to_remote("OPPORTUNITY", &FieldValue::Boolean(true))
            .unwrap_err();
        match err {
            CrmError::Coercion { key, expected, found } => {
                assert_eq!(key, "OPPORTUNITY");
                assert_eq!(expected, "money");
                assert_eq!(found, "boolean");
            }
            other => panic!("Expected Coercion, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn money_written_as_string_reads_back_equal(amount in money_strategy()) {
            let remote = FieldKind::Money.to_remote("OPPORTUNITY", &FieldValue::Money(amount)).unwrap();
            prop_assert!(matches!(remote, Value::String(_)));
            prop_assert_eq!(FieldKind::Money.coerce("OPPORTUNITY", &remote).unwrap(), FieldValue::Money(amount));
        }

        #[test]
        fn numeric_ids_read_as_text_ids(id in remote_id_strategy()) {
            let from_number = FieldKind::Id.coerce("ID", &json!(id)).unwrap();
            let from_string = FieldKind::Id.coerce("ID", &json!(id.to_string())).unwrap();
            prop_assert_eq!(from_number, from_string);
        }

        #[test]
        fn money_strings_read_as_decimal(raw in money_string_strategy()) {
            let expected: Decimal = raw.parse().unwrap();
            prop_assert_eq!(
                FieldKind::Money.coerce("OPPORTUNITY", &json!(raw)).unwrap(),
                FieldValue::Money(expected)
            );
        }

        #[test]
        fn flags_read_as_booleans((flag, expected) in flag_strategy()) {
            prop_assert_eq!(
                FieldKind::Boolean.coerce("CLOSED", &json!(flag)).unwrap(),
                FieldValue::Boolean(expected)
            );
        }
    }
}
