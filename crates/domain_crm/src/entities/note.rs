//! Timeline notes
//!
//! Notes are timeline comments owned by a deal, company or contact. They are
//! reached through the owner (`deal.notes()`), which scopes every list to the
//! owner and fills in the owner fields on create.

use chrono::{DateTime, FixedOffset};

use core_kernel::EntityId;

use crate::crm::Crm;
use crate::entity::{Entity, EntityType};
use crate::error::CrmError;
use crate::field::FieldDescriptor;
use crate::filter::Filter;
use crate::manager::Manager;
use crate::record::Record;
use crate::value::{FieldKind, FieldValue};

const NOTE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::standard("id", "ID", FieldKind::Id),
    FieldDescriptor::standard("owner_id", "ENTITY_ID", FieldKind::Id),
    FieldDescriptor::standard("owner_type", "ENTITY_TYPE", FieldKind::Text),
    FieldDescriptor::standard("text", "COMMENT", FieldKind::Text),
    FieldDescriptor::standard("author_id", "AUTHOR_ID", FieldKind::Id),
    FieldDescriptor::standard("created_at", "CREATED", FieldKind::DateTime),
];

/// A timeline comment
#[derive(Debug, Clone)]
pub struct Note {
    record: Record,
    crm: Crm,
}

impl Entity for Note {
    const TYPE: EntityType = EntityType::Note;

    fn standard_fields() -> &'static [FieldDescriptor] {
        NOTE_FIELDS
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

impl Note {
    pub fn id(&self) -> Option<EntityId> {
        self.record.id()
    }

    field_getters! {
        owner_id: reference -> EntityId,
        owner_type: text -> String,
        text: text -> String,
        author_id: reference -> EntityId,
        created_at: datetime -> DateTime<FixedOffset>,
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), CrmError> {
        self.record.set("text", text.into())
    }

    /// Sends staged changes (`crm.timeline.comment.update`)
    pub async fn save(&mut self) -> Result<(), CrmError> {
        let manager = self.crm.manager::<Note>();
        manager.save(self).await
    }
}

/// Notes of one owner record
#[derive(Debug, Clone)]
pub struct NoteSet {
    crm: Crm,
    owner_type: EntityType,
    owner_id: Option<EntityId>,
}

impl NoteSet {
    pub fn new(crm: Crm, owner_type: EntityType, owner_id: Option<EntityId>) -> Self {
        Self {
            crm,
            owner_type,
            owner_id,
        }
    }

    fn owner(&self) -> Result<(EntityId, &'static str), CrmError> {
        let id = self
            .owner_id
            .clone()
            .ok_or(CrmError::Unsaved(self.owner_type.name()))?;
        let code = self
            .owner_type
            .owner_code()
            .ok_or(CrmError::Unsaved(self.owner_type.name()))?;
        Ok((id, code))
    }

    fn manager(&self) -> Manager<Note> {
        self.crm.manager::<Note>()
    }

    /// Adds a note to the owner (`crm.timeline.comment.add`)
    pub async fn create(&self, text: impl Into<String>) -> Result<Note, CrmError> {
        let (owner_id, code) = self.owner()?;
        self.manager()
            .create([
                ("owner_id", FieldValue::Id(owner_id)),
                ("owner_type", FieldValue::Text(code.to_string())),
                ("text", FieldValue::Text(text.into())),
            ])
            .await
    }

    /// Lists every note of the owner
    pub async fn get_all(&self) -> Result<Vec<Note>, CrmError> {
        self.filter(Filter::new()).await
    }

    /// Lists notes of the owner that also match `filter`
    pub async fn filter(&self, filter: Filter) -> Result<Vec<Note>, CrmError> {
        let (owner_id, code) = self.owner()?;
        let scoped = filter
            .eq("owner_id", owner_id)
            .eq("owner_type", code);
        self.manager().filter(scoped).await
    }
}
