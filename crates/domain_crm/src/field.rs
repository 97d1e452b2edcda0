//! Field descriptors and per-entity schemas
//!
//! A [`FieldDescriptor`] pairs a local attribute name with the remote field
//! key and a coercion rule. A [`Schema`] is the complete table for one entity
//! type, validated once at construction:
//!
//! - one descriptor per local attribute name,
//! - remote keys unique within the schema.
//!
//! Custom fields extend the standard table with [`Schema::with_custom`]:
//!
//! ```rust
//! use domain_crm::field::{CustomField, Schema};
//! use domain_crm::entities::Deal;
//! use domain_crm::Entity;
//!
//! let schema = Schema::new("Deal", Deal::standard_fields().iter().cloned())
//!     .unwrap()
//!     .with_custom([
//!         CustomField::plain("utm_source", "UTM_SOURCE"),
//!         CustomField::text("delivery_address", "UF_CRM_DELIVERY_ADDRESS"),
//!         CustomField::select("delivery_type", "UF_CRM_DELIVERY_TYPE"),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(schema.resolve("delivery_address").unwrap().key(), "UF_CRM_DELIVERY_ADDRESS");
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::CrmError;
use crate::value::FieldKind;

/// Static declaration of one mapped field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    attr: Cow<'static, str>,
    key: Cow<'static, str>,
    kind: FieldKind,
    custom: bool,
}

impl FieldDescriptor {
    /// Declares a standard field; usable in `const` tables
    pub const fn standard(attr: &'static str, key: &'static str, kind: FieldKind) -> Self {
        Self {
            attr: Cow::Borrowed(attr),
            key: Cow::Borrowed(key),
            kind,
            custom: false,
        }
    }

    /// Declares a custom field with any coercion kind
    pub fn custom(attr: impl Into<String>, key: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            attr: Cow::Owned(attr.into()),
            key: Cow::Owned(key.into()),
            kind,
            custom: true,
        }
    }

    /// Local attribute name
    pub fn attr(&self) -> &str {
        &self.attr
    }

    /// Remote field key
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_custom(&self) -> bool {
        self.custom
    }

    /// Identifier fields are assigned by the remote side
    pub fn is_read_only(&self) -> bool {
        self.kind == FieldKind::Id && self.attr == "id"
    }
}

/// Shorthand constructors for custom fields
pub struct CustomField;

impl CustomField {
    /// Untyped custom field, read and written as text
    pub fn plain(attr: impl Into<String>, key: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor::custom(attr, key, FieldKind::Text)
    }

    /// Text (string) custom field
    pub fn text(attr: impl Into<String>, key: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor::custom(attr, key, FieldKind::Text)
    }

    /// List ("enumeration") custom field holding an item id
    pub fn select(attr: impl Into<String>, key: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor::custom(attr, key, FieldKind::Select)
    }

    pub fn money(attr: impl Into<String>, key: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor::custom(attr, key, FieldKind::Money)
    }

    pub fn integer(attr: impl Into<String>, key: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor::custom(attr, key, FieldKind::Integer)
    }

    pub fn boolean(attr: impl Into<String>, key: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor::custom(attr, key, FieldKind::Boolean)
    }

    pub fn datetime(attr: impl Into<String>, key: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor::custom(attr, key, FieldKind::DateTime)
    }

    /// Multiple-value custom field
    pub fn list(attr: impl Into<String>, key: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor::custom(attr, key, FieldKind::List)
    }
}

/// Field-mapping table for one entity type
#[derive(Debug, Clone)]
pub struct Schema {
    entity: &'static str,
    fields: Vec<FieldDescriptor>,
    by_attr: HashMap<String, usize>,
    by_key: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema, rejecting duplicate attribute names and remote keys
    pub fn new(
        entity: &'static str,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self, CrmError> {
        let mut schema = Self {
            entity,
            fields: Vec::new(),
            by_attr: HashMap::new(),
            by_key: HashMap::new(),
        };
        for field in fields {
            schema.push(field)?;
        }
        Ok(schema)
    }

    /// Returns a copy of this schema extended with extra (custom) fields
    pub fn with_custom(
        &self,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self, CrmError> {
        let mut schema = self.clone();
        for field in fields {
            schema.push(field)?;
        }
        Ok(schema)
    }

    fn push(&mut self, field: FieldDescriptor) -> Result<(), CrmError> {
        if self.by_attr.contains_key(field.attr()) {
            return Err(CrmError::DuplicateAttribute {
                entity: self.entity,
                attr: field.attr().to_string(),
            });
        }
        if self.by_key.contains_key(field.key()) {
            return Err(CrmError::DuplicateKey {
                entity: self.entity,
                key: field.key().to_string(),
            });
        }
        let index = self.fields.len();
        self.by_attr.insert(field.attr().to_string(), index);
        self.by_key.insert(field.key().to_string(), index);
        self.fields.push(field);
        Ok(())
    }

    /// Name of the entity type this schema describes
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Resolves a local attribute name to its descriptor
    pub fn resolve(&self, attr: &str) -> Result<&FieldDescriptor, CrmError> {
        self.by_attr
            .get(attr)
            .map(|&index| &self.fields[index])
            .ok_or_else(|| CrmError::unknown_attribute(self.entity, attr))
    }

    /// Looks a descriptor up by remote key
    pub fn by_key(&self, key: &str) -> Option<&FieldDescriptor> {
        self.by_key.get(key).map(|&index| &self.fields[index])
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn custom_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_custom())
    }

    /// Remote keys in declaration order, used as the `select` list
    pub fn remote_keys(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.key().to_string()).collect()
    }

    /// Remote key of the record identifier
    pub fn id_key(&self) -> &str {
        self.fields
            .iter()
            .find(|f| f.is_read_only())
            .map(|f| f.key())
            .unwrap_or("ID")
    }
}
