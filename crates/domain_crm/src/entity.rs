//! Entity types and the trait shared by typed entities

use std::fmt;

use crate::crm::Crm;
use crate::error::CrmError;
use crate::field::FieldDescriptor;
use crate::record::Record;
use crate::value::FieldValue;

/// Category of CRM record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Deal,
    Company,
    Contact,
    /// Timeline comment attached to a deal, company or contact
    Note,
    /// Product row of a deal
    ProductRow,
}

impl EntityType {
    pub fn name(&self) -> &'static str {
        match self {
            EntityType::Deal => "Deal",
            EntityType::Company => "Company",
            EntityType::Contact => "Contact",
            EntityType::Note => "Note",
            EntityType::ProductRow => "ProductRow",
        }
    }

    /// Remote method prefix, e.g. `crm.deal`
    pub fn api_prefix(&self) -> &'static str {
        match self {
            EntityType::Deal => "crm.deal",
            EntityType::Company => "crm.company",
            EntityType::Contact => "crm.contact",
            EntityType::Note => "crm.timeline.comment",
            EntityType::ProductRow => "crm.deal.productrows",
        }
    }

    /// Full remote method name for an operation
    pub fn method(&self, op: &str) -> String {
        format!("{}.{}", self.api_prefix(), op)
    }

    /// Owner code used by timeline methods (`ENTITY_TYPE`)
    pub fn owner_code(&self) -> Option<&'static str> {
        match self {
            EntityType::Deal => Some("deal"),
            EntityType::Company => Some("company"),
            EntityType::Contact => Some("contact"),
            EntityType::Note | EntityType::ProductRow => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed top-level CRM entity managed through a [`crate::Manager`]
///
/// Implementors are thin wrappers around a [`Record`] plus the [`Crm`]
/// handle they were loaded through, so relation reads and saves need no
/// extra arguments.
pub trait Entity: Sized + Send + Sync + 'static {
    /// Entity type tag
    const TYPE: EntityType;

    /// Standard (non-custom) field table
    fn standard_fields() -> &'static [FieldDescriptor];

    /// Wraps a record loaded or created through `crm`
    fn from_parts(record: Record, crm: Crm) -> Self;

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    fn crm(&self) -> &Crm;

    /// Reads any mapped field, custom fields included
    fn get(&self, attr: &str) -> Result<FieldValue, CrmError> {
        self.record().get(attr)
    }

    /// Stages a write to any mapped field
    fn set(&mut self, attr: &str, value: impl Into<FieldValue>) -> Result<(), CrmError> {
        self.record_mut().set(attr, value)
    }
}
