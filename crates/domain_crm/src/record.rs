//! Client-side view of one remote record
//!
//! A [`Record`] keeps the last snapshot received from (or sent to) the CRM
//! and the changes staged locally since then. Reads prefer staged changes;
//! writes only touch the staged set until the owning entity is saved.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use core_kernel::EntityId;

use crate::error::CrmError;
use crate::field::Schema;
use crate::value::FieldValue;

/// Snapshot plus staged changes, keyed by remote field key
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    snapshot: Map<String, Value>,
    changes: Map<String, Value>,
}

impl Record {
    /// Wraps a snapshot received from the remote side
    pub fn from_remote(schema: Arc<Schema>, snapshot: Map<String, Value>) -> Self {
        Self {
            schema,
            snapshot,
            changes: Map::new(),
        }
    }

    /// Creates an empty record that does not exist remotely yet
    pub fn empty(schema: Arc<Schema>) -> Self {
        Self::from_remote(schema, Map::new())
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Remote identifier, if the record has been saved
    pub fn id(&self) -> Option<EntityId> {
        self.snapshot
            .get(self.schema.id_key())
            .and_then(EntityId::from_json)
    }

    /// Reads a field by local attribute name, coerced by its declared kind
    pub fn get(&self, attr: &str) -> Result<FieldValue, CrmError> {
        let field = self.schema.resolve(attr)?;
        let raw = self
            .changes
            .get(field.key())
            .or_else(|| self.snapshot.get(field.key()))
            .ok_or_else(|| CrmError::MissingField {
                entity: self.schema.entity(),
                attr: attr.to_string(),
                key: field.key().to_string(),
            })?;
        field.kind().coerce(field.key(), raw)
    }

    /// Stages a write; sent on the next save
    pub fn set(&mut self, attr: &str, value: impl Into<FieldValue>) -> Result<(), CrmError> {
        let field = self.schema.resolve(attr)?;
        if field.is_read_only() {
            return Err(CrmError::ReadOnlyField(attr.to_string()));
        }
        let json = field.kind().to_remote(field.key(), &value.into())?;
        self.changes.insert(field.key().to_string(), json);
        Ok(())
    }

    pub fn text(&self, attr: &str) -> Result<Option<String>, CrmError> {
        Ok(self.get(attr)?.as_text().map(str::to_string))
    }

    pub fn integer(&self, attr: &str) -> Result<Option<i64>, CrmError> {
        Ok(self.get(attr)?.as_integer())
    }

    pub fn money(&self, attr: &str) -> Result<Option<Decimal>, CrmError> {
        Ok(self.get(attr)?.as_decimal())
    }

    pub fn boolean(&self, attr: &str) -> Result<Option<bool>, CrmError> {
        Ok(self.get(attr)?.as_bool())
    }

    pub fn datetime(&self, attr: &str) -> Result<Option<DateTime<FixedOffset>>, CrmError> {
        Ok(self.get(attr)?.as_datetime())
    }

    /// Enumeration item id of a select field
    pub fn select(&self, attr: &str) -> Result<Option<String>, CrmError> {
        Ok(self.get(attr)?.as_text().map(str::to_string))
    }

    pub fn list(&self, attr: &str) -> Result<Vec<String>, CrmError> {
        Ok(self.get(attr)?.as_list().map(<[String]>::to_vec).unwrap_or_default())
    }

    /// Reads a foreign key; the CRM's `0` placeholder reads as `None`
    pub fn reference(&self, attr: &str) -> Result<Option<EntityId>, CrmError> {
        Ok(self
            .get(attr)?
            .as_id()
            .filter(|id| !id.is_unset())
            .cloned())
    }

    /// Changes staged since the last commit, keyed by remote field key
    pub fn changes(&self) -> &Map<String, Value> {
        &self.changes
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Last known remote state, keyed by remote field key
    pub fn snapshot(&self) -> &Map<String, Value> {
        &self.snapshot
    }

    /// Merges staged changes into the snapshot after a successful save
    pub fn commit(&mut self) {
        let changes = std::mem::take(&mut self.changes);
        self.snapshot.extend(changes);
    }

    /// Records the identifier the remote side assigned on creation
    pub fn assign_id(&mut self, id: &EntityId) {
        let key = self.schema.id_key().to_string();
        self.snapshot.insert(key, id.to_json());
    }

    /// Drops staged changes
    pub fn discard(&mut self) {
        self.changes.clear();
    }
}
