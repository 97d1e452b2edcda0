//! List filters over local attribute names
//!
//! A [`Filter`] is written against local attribute names and resolved to
//! remote keys only when a manager sends it, so an unknown attribute fails
//! before any remote call is made.
//!
//! ```rust
//! use domain_crm::filter::{Direction, Filter};
//!
//! let filter = Filter::new()
//!     .eq("type_id", "SALE")
//!     .gte("opportunity", 1000)
//!     .order_by("created_at", Direction::Desc);
//! assert_eq!(filter.conditions().len(), 2);
//! ```

use serde_json::{Map, Value};

use crate::error::CrmError;
use crate::field::Schema;
use crate::value::FieldValue;

/// Comparison operator, sent as a prefix on the remote key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Substring match
    Like,
}

impl Operator {
    pub fn prefix(&self) -> &'static str {
        match self {
            Operator::Eq => "",
            Operator::Ne => "!",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "%",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One filter condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub attr: String,
    pub op: Operator,
    pub value: FieldValue,
}

/// Conditions and ordering for a list call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
    order: Vec<(String, Direction)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition with an explicit operator
    pub fn condition(mut self, attr: impl Into<String>, op: Operator, value: impl Into<FieldValue>) -> Self {
        self.conditions.push(Condition {
            attr: attr.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, attr: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(attr, Operator::Eq, value)
    }

    pub fn ne(self, attr: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(attr, Operator::Ne, value)
    }

    pub fn gt(self, attr: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(attr, Operator::Gt, value)
    }

    pub fn gte(self, attr: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(attr, Operator::Gte, value)
    }

    pub fn lt(self, attr: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(attr, Operator::Lt, value)
    }

    pub fn lte(self, attr: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(attr, Operator::Lte, value)
    }

    pub fn like(self, attr: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.condition(attr, Operator::Like, value)
    }

    /// Adds a sort key; earlier keys take precedence
    pub fn order_by(mut self, attr: impl Into<String>, direction: Direction) -> Self {
        self.order.push((attr.into(), direction));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.order.is_empty()
    }

    /// Resolves conditions to the remote `filter` object
    pub fn to_remote_filter(&self, schema: &Schema) -> Result<Map<String, Value>, CrmError> {
        let mut filter = Map::new();
        for condition in &self.conditions {
            let field = schema.resolve(&condition.attr)?;
            let value = field.kind().to_remote(field.key(), &condition.value)?;
            filter.insert(format!("{}{}", condition.op.prefix(), field.key()), value);
        }
        Ok(filter)
    }

    /// Resolves sort keys to the remote `order` object
    pub fn to_remote_order(&self, schema: &Schema) -> Result<Map<String, Value>, CrmError> {
        let mut order = Map::new();
        for (attr, direction) in &self.order {
            let field = schema.resolve(attr)?;
            order.insert(field.key().to_string(), Value::String(direction.as_str().to_string()));
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;
    use crate::value::FieldKind;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(
            "Deal",
            [
                FieldDescriptor::standard("id", "ID", FieldKind::Id),
                FieldDescriptor::standard("type_id", "TYPE_ID", FieldKind::Select),
                FieldDescriptor::standard("opportunity", "OPPORTUNITY", FieldKind::Money),
                FieldDescriptor::standard("created_at", "DATE_CREATE", FieldKind::DateTime),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_filter_resolves_keys_and_prefixes() {
        let filter = Filter::new().eq("type_id", "SALE").gte("opportunity", 1000);
        let remote = filter.to_remote_filter(&schema()).unwrap();
        assert_eq!(remote["TYPE_ID"], json!("SALE"));
        assert_eq!(remote[">=OPPORTUNITY"], json!("1000"));
    }

    #[test]
    fn test_order_resolves_keys() {
        let filter = Filter::new().order_by("created_at", Direction::Desc);
        let order = filter.to_remote_order(&schema()).unwrap();
        assert_eq!(order["DATE_CREATE"], json!("DESC"));
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let filter = Filter::new().eq("stage", "NEW");
        assert!(matches!(
            filter.to_remote_filter(&schema()),
            Err(CrmError::UnknownAttribute { .. })
        ));
    }
}
