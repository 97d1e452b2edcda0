//! Deals

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use core_kernel::EntityId;

use crate::crm::Crm;
use crate::entity::{Entity, EntityType};
use crate::error::CrmError;
use crate::field::FieldDescriptor;
use crate::record::Record;
use crate::relation::Related;
use crate::value::{FieldKind, FieldValue};

use super::{Company, Contact, NoteSet, ProductRowSet};

const DEAL_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::standard("id", "ID", FieldKind::Id),
    FieldDescriptor::standard("title", "TITLE", FieldKind::Text),
    FieldDescriptor::standard("type_id", "TYPE_ID", FieldKind::Select),
    FieldDescriptor::standard("stage_id", "STAGE_ID", FieldKind::Select),
    FieldDescriptor::standard("category_id", "CATEGORY_ID", FieldKind::Id),
    FieldDescriptor::standard("opportunity", "OPPORTUNITY", FieldKind::Money),
    FieldDescriptor::standard("currency_id", "CURRENCY_ID", FieldKind::Text),
    FieldDescriptor::standard("company_id", "COMPANY_ID", FieldKind::Id),
    FieldDescriptor::standard("contact_id", "CONTACT_ID", FieldKind::Id),
    FieldDescriptor::standard("assigned_by_id", "ASSIGNED_BY_ID", FieldKind::Id),
    FieldDescriptor::standard("comments", "COMMENTS", FieldKind::Text),
    FieldDescriptor::standard("closed", "CLOSED", FieldKind::Boolean),
    FieldDescriptor::standard("created_at", "DATE_CREATE", FieldKind::DateTime),
    FieldDescriptor::standard("updated_at", "DATE_MODIFY", FieldKind::DateTime),
];

/// A CRM deal
///
/// `company()` and `contact()` resolve lazily and cache per instance.
#[derive(Debug, Clone)]
pub struct Deal {
    record: Record,
    crm: Crm,
    company: Related<Company>,
    contact: Related<Contact>,
}

impl Entity for Deal {
    const TYPE: EntityType = EntityType::Deal;

    fn standard_fields() -> &'static [FieldDescriptor] {
        DEAL_FIELDS
    }

    fn from_parts(record: Record, crm: Crm) -> Self {
        Self {
            record,
            crm,
            company: Related::new(),
            contact: Related::new(),
        }
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

impl Deal {
    pub fn id(&self) -> Option<EntityId> {
        self.record.id()
    }

    field_getters! {
        title: text -> String,
        type_id: select -> String,
        stage_id: select -> String,
        category_id: reference -> EntityId,
        opportunity: money -> Decimal,
        currency_id: text -> String,
        /// Linked company; the CRM's `0` placeholder reads as `None`
        company_id: reference -> EntityId,
        contact_id: reference -> EntityId,
        assigned_by_id: reference -> EntityId,
        comments: text -> String,
        closed: boolean -> bool,
        created_at: datetime -> DateTime<FixedOffset>,
        updated_at: datetime -> DateTime<FixedOffset>,
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("title", title.into())
    }

    pub fn set_stage_id(&mut self, stage_id: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("stage_id", FieldValue::Select(stage_id.into()))
    }

    pub fn set_type_id(&mut self, type_id: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("type_id", FieldValue::Select(type_id.into()))
    }

    pub fn set_opportunity(&mut self, amount: Decimal) -> Result<(), CrmError> {
        self.record.set("opportunity", amount)
    }

    pub fn set_currency_id(&mut self, currency_id: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("currency_id", currency_id.into())
    }

    pub fn set_comments(&mut self, comments: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("comments", comments.into())
    }

    /// Links (or with `None` unlinks) a company
    pub fn set_company_id(&mut self, company_id: Option<EntityId>) -> Result<(), CrmError> {
        self.company.invalidate();
        self.record.set("company_id", company_id.unwrap_or_else(|| EntityId::new("0")))
    }

    /// Links (or with `None` unlinks) a contact
    pub fn set_contact_id(&mut self, contact_id: Option<EntityId>) -> Result<(), CrmError> {
        self.contact.invalidate();
        self.record.set("contact_id", contact_id.unwrap_or_else(|| EntityId::new("0")))
    }

    /// Linked company, fetched on first read for the current `company_id`
    pub async fn company(&self) -> Result<Option<Company>, CrmError> {
        let company_id = self.record.reference("company_id")?;
        self.company.resolve(&self.crm, company_id).await
    }

    /// Linked contact, fetched on first read for the current `contact_id`
    pub async fn contact(&self) -> Result<Option<Contact>, CrmError> {
        let contact_id = self.record.reference("contact_id")?;
        self.contact.resolve(&self.crm, contact_id).await
    }

    /// Timeline notes attached to this deal
    pub fn notes(&self) -> NoteSet {
        NoteSet::new(self.crm.clone(), EntityType::Deal, self.id())
    }

    /// Product rows of this deal
    pub fn products(&self) -> ProductRowSet {
        ProductRowSet::new(self.crm.clone(), self.id())
    }

    /// Sends staged changes (`crm.deal.add` or `crm.deal.update`)
    pub async fn save(&mut self) -> Result<(), CrmError> {
        let manager = self.crm.deals();
        manager.save(self).await
    }
}
