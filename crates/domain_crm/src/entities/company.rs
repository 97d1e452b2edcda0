//! Companies

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use core_kernel::EntityId;

use crate::crm::Crm;
use crate::entity::{Entity, EntityType};
use crate::error::CrmError;
use crate::field::FieldDescriptor;
use crate::record::Record;
use crate::value::{FieldKind, FieldValue};

use super::NoteSet;

const COMPANY_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::standard("id", "ID", FieldKind::Id),
    FieldDescriptor::standard("title", "TITLE", FieldKind::Text),
    FieldDescriptor::standard("company_type", "COMPANY_TYPE", FieldKind::Select),
    FieldDescriptor::standard("industry", "INDUSTRY", FieldKind::Select),
    FieldDescriptor::standard("employees", "EMPLOYEES", FieldKind::Select),
    FieldDescriptor::standard("revenue", "REVENUE", FieldKind::Money),
    FieldDescriptor::standard("currency_id", "CURRENCY_ID", FieldKind::Text),
    FieldDescriptor::standard("comments", "COMMENTS", FieldKind::Text),
    FieldDescriptor::standard("assigned_by_id", "ASSIGNED_BY_ID", FieldKind::Id),
    FieldDescriptor::standard("created_at", "DATE_CREATE", FieldKind::DateTime),
    FieldDescriptor::standard("updated_at", "DATE_MODIFY", FieldKind::DateTime),
];

/// A CRM company
#[derive(Debug, Clone)]
pub struct Company {
    record: Record,
    crm: Crm,
}

impl Entity for Company {
    const TYPE: EntityType = EntityType::Company;

    fn standard_fields() -> &'static [FieldDescriptor] {
        COMPANY_FIELDS
    }

    fn from_parts(record: Record, crm: Crm) -> Self {
        Self { record, crm }
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn crm(&self) -> &Crm {
        &self.crm
    }
}

impl Company {
    pub fn id(&self) -> Option<EntityId> {
        self.record.id()
    }

    field_getters! {
        title: text -> String,
        company_type: select -> String,
        industry: select -> String,
        employees: select -> String,
        revenue: money -> Decimal,
        currency_id: text -> String,
        comments: text -> String,
        assigned_by_id: reference -> EntityId,
        created_at: datetime -> DateTime<FixedOffset>,
        updated_at: datetime -> DateTime<FixedOffset>,
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("title", title.into())
    }

    pub fn set_company_type(&mut self, company_type: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("company_type", FieldValue::Select(company_type.into()))
    }

    pub fn set_industry(&mut self, industry: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("industry", FieldValue::Select(industry.into()))
    }

    pub fn set_revenue(&mut self, revenue: Decimal) -> Result<(), CrmError> {
        self.record.set("revenue", revenue)
    }

    pub fn set_comments(&mut self, comments: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("comments", comments.into())
    }

    /// Timeline notes attached to this company
    pub fn notes(&self) -> NoteSet {
        NoteSet::new(self.crm.clone(), EntityType::Company, self.id())
    }

    /// Sends staged changes (`crm.company.add` or `crm.company.update`)
    pub async fn save(&mut self) -> Result<(), CrmError> {
        let manager = self.crm.companies();
        manager.save(self).await
    }
}
