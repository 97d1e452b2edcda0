//! Contacts

use chrono::{DateTime, FixedOffset};

use core_kernel::EntityId;

use crate::crm::Crm;
use crate::entity::{Entity, EntityType};
use crate::error::CrmError;
use crate::field::FieldDescriptor;
use crate::record::Record;
use crate::relation::Related;
use crate::value::{FieldKind, FieldValue};

use super::{Company, NoteSet};

const CONTACT_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::standard("id", "ID", FieldKind::Id),
    FieldDescriptor::standard("name", "NAME", FieldKind::Text),
    FieldDescriptor::standard("second_name", "SECOND_NAME", FieldKind::Text),
    FieldDescriptor::standard("last_name", "LAST_NAME", FieldKind::Text),
    FieldDescriptor::standard("post", "POST", FieldKind::Text),
    FieldDescriptor::standard("type_id", "TYPE_ID", FieldKind::Select),
    FieldDescriptor::standard("company_id", "COMPANY_ID", FieldKind::Id),
    FieldDescriptor::standard("comments", "COMMENTS", FieldKind::Text),
    FieldDescriptor::standard("assigned_by_id", "ASSIGNED_BY_ID", FieldKind::Id),
    FieldDescriptor::standard("created_at", "DATE_CREATE", FieldKind::DateTime),
    FieldDescriptor::standard("updated_at", "DATE_MODIFY", FieldKind::DateTime),
];

/// A CRM contact
#[derive(Debug, Clone)]
pub struct Contact {
    record: Record,
    crm: Crm,
    company: Related<Company>,
}

impl Entity for Contact {
    const TYPE: EntityType = EntityType::Contact;

    fn standard_fields() -> &'static [FieldDescriptor] {
        CONTACT_FIELDS
    }

    fn from_parts(record: Record, crm: Crm) -> Self {
        Self {
            record,
            crm,
            company: Related::new(),
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

impl Contact {
    pub fn id(&self) -> Option<EntityId> {
        self.record.id()
    }

    field_getters! {
        name: text -> String,
        second_name: text -> String,
        last_name: text -> String,
        post: text -> String,
        type_id: select -> String,
        company_id: reference -> EntityId,
        comments: text -> String,
        assigned_by_id: reference -> EntityId,
        created_at: datetime -> DateTime<FixedOffset>,
        updated_at: datetime -> DateTime<FixedOffset>,
    }

    /// Name parts joined with spaces, skipping empty and unfetched parts
    pub fn full_name(&self) -> String {
        ["name", "second_name", "last_name"]
            .iter()
            .filter_map(|attr| self.record.text(attr).ok().flatten())
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("name", name.into())
    }

    pub fn set_last_name(&mut self, last_name: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("last_name", last_name.into())
    }

    pub fn set_post(&mut self, post: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("post", post.into())
    }

    pub fn set_type_id(&mut self, type_id: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("type_id", FieldValue::Select(type_id.into()))
    }

    pub fn set_company_id(&mut self, company_id: Option<EntityId>) -> Result<(), CrmError> {
        self.company.invalidate();
        self.record.set("company_id", company_id.unwrap_or_else(|| EntityId::new("0")))
    }

    /// Employer company, fetched on first read for the current `company_id`
    pub async fn company(&self) -> Result<Option<Company>, CrmError> {
        let company_id = self.record.reference("company_id")?;
        self.company.resolve(&self.crm, company_id).await
    }

    /// Timeline notes attached to this contact
    pub fn notes(&self) -> NoteSet {
        NoteSet::new(self.crm.clone(), EntityType::Contact, self.id())
    }

    /// Sends staged changes (`crm.contact.add` or `crm.contact.update`)
    pub async fn save(&mut self) -> Result<(), CrmError> {
        let manager = self.crm.contacts();
        manager.save(self).await
    }
}
