//! Deal product rows

use rust_decimal::Decimal;
use serde_json::{json, Value};

use core_kernel::EntityId;

use crate::crm::Crm;
use crate::entity::EntityType;
use crate::error::CrmError;
use crate::field::FieldDescriptor;
use crate::record::Record;
use crate::value::{FieldKind, FieldValue};

const PRODUCT_ROW_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::standard("id", "ID", FieldKind::Id),
    FieldDescriptor::standard("owner_id", "OWNER_ID", FieldKind::Id),
    FieldDescriptor::standard("product_id", "PRODUCT_ID", FieldKind::Id),
    FieldDescriptor::standard("product_name", "PRODUCT_NAME", FieldKind::Text),
    FieldDescriptor::standard("price", "PRICE", FieldKind::Money),
    FieldDescriptor::standard("quantity", "QUANTITY", FieldKind::Money),
    FieldDescriptor::standard("discount_sum", "DISCOUNT_SUM", FieldKind::Money),
    FieldDescriptor::standard("tax_rate", "TAX_RATE", FieldKind::Money),
    FieldDescriptor::standard("measure_name", "MEASURE_NAME", FieldKind::Text),
];

/// One product line of a deal (read-only)
#[derive(Debug, Clone)]
pub struct ProductRow {
    record: Record,
}

impl ProductRow {
    pub fn standard_fields() -> &'static [FieldDescriptor] {
        PRODUCT_ROW_FIELDS
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn id(&self) -> Option<EntityId> {
        self.record.id()
    }

    /// Reads any mapped field by local attribute name
    pub fn get(&self, attr: &str) -> Result<FieldValue, CrmError> {
        self.record.get(attr)
    }

    field_getters! {
        owner_id: reference -> EntityId,
        product_id: reference -> EntityId,
        product_name: text -> String,
        price: money -> Decimal,
        quantity: money -> Decimal,
        discount_sum: money -> Decimal,
        tax_rate: money -> Decimal,
        measure_name: text -> String,
    }

    /// `price * quantity`; missing or empty parts count as zero
    pub fn total(&self) -> Decimal {
        let price = self.price().ok().flatten().unwrap_or_default();
        let quantity = self.quantity().ok().flatten().unwrap_or_default();
        price * quantity
    }
}

/// Product rows of one deal
#[derive(Debug, Clone)]
pub struct ProductRowSet {
    crm: Crm,
    deal_id: Option<EntityId>,
}

impl ProductRowSet {
    pub fn new(crm: Crm, deal_id: Option<EntityId>) -> Self {
        Self { crm, deal_id }
    }

    /// Fetches every row (`crm.deal.productrows.get`)
    pub async fn get_all(&self) -> Result<Vec<ProductRow>, CrmError> {
        let deal_id = self
            .deal_id
            .as_ref()
            .ok_or(CrmError::Unsaved(EntityType::Deal.name()))?;
        let method = EntityType::ProductRow.method("get");
        tracing::debug!(method = %method, deal_id = %deal_id, "Fetching product rows");

        let schema = self.crm.schema(EntityType::ProductRow);
        match self.crm.port().call(&method, json!({ "id": deal_id.as_str() })).await? {
            Value::Array(rows) => rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(fields) => Ok(ProductRow {
                        record: Record::from_remote(schema.clone(), fields),
                    }),
                    other => Err(CrmError::unexpected(&method, format!("expected an object, got {}", other))),
                })
                .collect(),
            other => Err(CrmError::unexpected(&method, format!("expected a list, got {}", other))),
        }
    }
}
