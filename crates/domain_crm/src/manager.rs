//! Per-entity-type managers
//!
//! Every operation forwards to exactly one remote call and awaits its single
//! response. Ordering and paging are whatever the port provides; errors from
//! the port are returned unchanged.
//!
//! | operation | remote method           |
//! |-----------|-------------------------|
//! | `get_all` | `<prefix>.list`         |
//! | `filter`  | `<prefix>.list`         |
//! | `get`     | `<prefix>.get`          |
//! | `create`  | `<prefix>.add`          |
//! | `save`    | `<prefix>.add` / `<prefix>.update` |

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use core_kernel::EntityId;

use crate::crm::Crm;
use crate::entity::Entity;
use crate::error::CrmError;
use crate::field::Schema;
use crate::filter::Filter;
use crate::record::Record;
use crate::value::FieldValue;

/// Forwards list/get/create/save calls for one entity type
pub struct Manager<E: Entity> {
    crm: Crm,
    schema: Arc<Schema>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Manager<E> {
    pub(crate) fn new(crm: Crm) -> Self {
        let schema = crm.schema(E::TYPE);
        Self {
            crm,
            schema,
            _entity: PhantomData,
        }
    }

    /// Field-mapping table used by this manager
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns an unsaved entity to fill in and save
    pub fn new_entity(&self) -> E {
        E::from_parts(Record::empty(self.schema.clone()), self.crm.clone())
    }

    /// Lists every record of this type
    pub async fn get_all(&self) -> Result<Vec<E>, CrmError> {
        self.filter(Filter::new()).await
    }

    /// Lists records matching a filter
    pub async fn filter(&self, filter: Filter) -> Result<Vec<E>, CrmError> {
        let mut params = Map::new();
        let remote_filter = filter.to_remote_filter(&self.schema)?;
        if !remote_filter.is_empty() {
            params.insert("filter".to_string(), Value::Object(remote_filter));
        }
        let order = filter.to_remote_order(&self.schema)?;
        if !order.is_empty() {
            params.insert("order".to_string(), Value::Object(order));
        }
        params.insert("select".to_string(), json!(self.schema.remote_keys()));
        self.list_with(Value::Object(params)).await
    }

    pub(crate) async fn list_with(&self, params: Value) -> Result<Vec<E>, CrmError> {
        let method = E::TYPE.method("list");
        tracing::debug!(method = %method, "Listing records");
        let items = self.crm.port().list(&method, params).await?;
        items
            .into_iter()
            .map(|item| match item {
                Value::Object(fields) => Ok(self.wrap(fields)),
                other => Err(CrmError::unexpected(&method, format!("expected an object, got {}", other))),
            })
            .collect()
    }

    /// Fetches one record by id
    pub async fn get(&self, id: &EntityId) -> Result<E, CrmError> {
        let method = E::TYPE.method("get");
        tracing::debug!(method = %method, id = %id, "Fetching record");
        match self.crm.port().call(&method, json!({ "id": id.as_str() })).await? {
            Value::Object(fields) => Ok(self.wrap(fields)),
            other => Err(CrmError::unexpected(&method, format!("expected an object, got {}", other))),
        }
    }

    /// Creates a record from `(attribute, value)` pairs
    ///
    /// The returned entity holds the sent fields plus the new id; it is not
    /// re-fetched.
    pub async fn create<I, K, V>(&self, values: I) -> Result<E, CrmError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut entity = self.new_entity();
        for (attr, value) in values {
            entity.record_mut().set(attr.as_ref(), value)?;
        }
        self.save(&mut entity).await?;
        Ok(entity)
    }

    /// Sends staged changes: `add` for a new record, `update` otherwise
    ///
    /// An existing record without staged changes sends nothing.
    pub async fn save(&self, entity: &mut E) -> Result<(), CrmError> {
        let record = entity.record_mut();
        match record.id() {
            None => {
                let method = E::TYPE.method("add");
                let result = self
                    .crm
                    .port()
                    .call(&method, json!({ "fields": record.changes() }))
                    .await?;
                let id = EntityId::from_json(&result)
                    .ok_or_else(|| CrmError::unexpected(&method, format!("expected a new id, got {}", result)))?;
                record.commit();
                record.assign_id(&id);
                tracing::info!(entity = %E::TYPE, id = %id, "Created record");
            }
            Some(id) => {
                if !record.is_dirty() {
                    tracing::debug!(entity = %E::TYPE, id = %id, "No staged changes, nothing to save");
                    return Ok(());
                }
                let method = E::TYPE.method("update");
                self.crm
                    .port()
                    .call(&method, json!({ "id": id.as_str(), "fields": record.changes() }))
                    .await?;
                record.commit();
                tracing::info!(entity = %E::TYPE, id = %id, "Updated record");
            }
        }
        Ok(())
    }

    fn wrap(&self, fields: Map<String, Value>) -> E {
        E::from_parts(Record::from_remote(self.schema.clone(), fields), self.crm.clone())
    }
}

impl<E: Entity> Clone for Manager<E> {
    fn clone(&self) -> Self {
        Self {
            crm: self.crm.clone(),
            schema: self.schema.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for Manager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("entity", &E::TYPE)
            .field("fields", &self.schema.fields().len())
            .finish()
    }
}
