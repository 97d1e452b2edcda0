//! Test Data Builders
//!
//! Builders for remote record payloads, shaped the way the CRM returns them
//! (upper-case keys, string-encoded values). Tests set only the fields they
//! care about.

use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use crate::fixtures::TimestampFixtures;

/// Builder for `crm.deal.*` payloads
pub struct DealRecordBuilder {
    fields: Map<String, Value>,
}

impl Default for DealRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DealRecordBuilder {
    /// Creates a builder for an open, unlinked deal
    pub fn new() -> Self {
        let defaults = json!({
            "TITLE": "Test deal",
            "TYPE_ID": "SALE",
            "STAGE_ID": "NEW",
            "CATEGORY_ID": "0",
            "OPPORTUNITY": "0.00",
            "CURRENCY_ID": "RUB",
            "COMPANY_ID": "0",
            "CONTACT_ID": "0",
            "ASSIGNED_BY_ID": "1",
            "COMMENTS": "",
            "CLOSED": "N",
            "DATE_CREATE": TimestampFixtures::created(),
            "DATE_MODIFY": TimestampFixtures::modified(),
            "UTM_SOURCE": "",
            "UF_CRM_DELIVERY_ADDRESS": "",
            "UF_CRM_DELIVERY_TYPE": "",
        });
        Self {
            fields: defaults.as_object().cloned().unwrap_or_default(),
        }
    }

    /// Sets the remote ID
    pub fn with_id(self, id: u64) -> Self {
        self.with("ID", id.to_string())
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.with("TITLE", title.into())
    }

    pub fn with_type(self, type_id: impl Into<String>) -> Self {
        self.with("TYPE_ID", type_id.into())
    }

    pub fn with_stage(self, stage_id: impl Into<String>) -> Self {
        self.with("STAGE_ID", stage_id.into())
    }

    /// Sets the amount, string-encoded like the CRM does
    pub fn with_opportunity(self, amount: Decimal) -> Self {
        self.with("OPPORTUNITY", amount.to_string())
    }

    pub fn with_company(self, company_id: u64) -> Self {
        self.with("COMPANY_ID", company_id.to_string())
    }

    pub fn with_contact(self, contact_id: u64) -> Self {
        self.with("CONTACT_ID", contact_id.to_string())
    }

    /// Sets any field by remote key
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Removes a field, as if it had not been selected
    pub fn without(mut self, key: &str) -> Self {
        self.fields.remove(key);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Builder for `crm.deal.productrows.get` rows
pub struct ProductRowBuilder {
    fields: Map<String, Value>,
}

impl ProductRowBuilder {
    /// Creates a row of `quantity` units at `price`
    pub fn new(name: impl Into<String>, price: Decimal, quantity: Decimal) -> Self {
        let fields = json!({
            "PRODUCT_ID": "0",
            "PRODUCT_NAME": name.into(),
            "PRICE": price.to_string(),
            "QUANTITY": quantity.to_string(),
            "DISCOUNT_SUM": "0.00",
            "TAX_RATE": "",
            "MEASURE_NAME": "pcs",
        });
        Self {
            fields: fields.as_object().cloned().unwrap_or_default(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.fields.insert("ID".to_string(), Value::String(id.to_string()));
        self
    }

    pub fn for_deal(mut self, deal_id: u64) -> Self {
        self.fields
            .insert("OWNER_ID".to_string(), Value::String(deal_id.to_string()));
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deal_builder_encodes_values_as_strings() {
        let deal = DealRecordBuilder::new()
            .with_id(7)
            .with_opportunity(dec!(1500.00))
            .with_company(3)
            .build();

        assert_eq!(deal["ID"], json!("7"));
        assert_eq!(deal["OPPORTUNITY"], json!("1500.00"));
        assert_eq!(deal["COMPANY_ID"], json!("3"));
        assert_eq!(deal["CONTACT_ID"], json!("0"));
    }

    #[test]
    fn test_deal_builder_without_field() {
        let deal = DealRecordBuilder::new().without("COMPANY_ID").build();
        assert!(deal.get("COMPANY_ID").is_none());
    }

    #[test]
    fn test_product_row_builder() {
        let row = ProductRowBuilder::new("Frame", dec!(250.00), dec!(4))
            .with_id(1)
            .for_deal(7)
            .build();

        assert_eq!(row["PRICE"], json!("250.00"));
        assert_eq!(row["OWNER_ID"], json!("7"));
    }
}
