//! Property-Based Test Generators
//!
//! Provides proptest strategies for the string-encoded values and field
//! names the CRM uses.

use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for custom field keys (`UF_CRM_*`)
pub fn custom_key_strategy() -> impl Strategy<Value = String> {
    "UF_CRM_[A-Z0-9]{1,10}(_[A-Z0-9]{1,6})?"
}

/// Strategy for local attribute names that never clash with standard ones
pub fn custom_attr_strategy() -> impl Strategy<Value = String> {
    "x_[a-z]{1,10}(_[a-z]{1,6})?"
}

/// Strategy for amounts with two decimal places
pub fn money_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000i64).prop_map(|minor| Decimal::new(minor, 2))
}

/// Strategy for amounts as the CRM sends them (`"1500.00"`)
pub fn money_string_strategy() -> impl Strategy<Value = String> {
    money_strategy().prop_map(|amount| amount.to_string())
}

/// Strategy for positive remote ids
pub fn remote_id_strategy() -> impl Strategy<Value = u64> {
    1u64..10_000_000u64
}

/// Strategy for `Y`/`N` flags
pub fn flag_strategy() -> impl Strategy<Value = (&'static str, bool)> {
    prop_oneof![Just(("Y", true)), Just(("N", false))]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn custom_keys_have_prefix(key in custom_key_strategy()) {
            prop_assert!(key.starts_with("UF_CRM_"));
        }

        #[test]
        fn money_strings_parse(value in money_string_strategy()) {
            prop_assert!(value.parse::<Decimal>().is_ok());
        }

        #[test]
        fn remote_ids_are_never_placeholder(id in remote_id_strategy()) {
            prop_assert!(id > 0);
        }
    }
}
