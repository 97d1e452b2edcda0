//! The CRM handle
//!
//! [`Crm`] is built once at startup from an API client port and the custom
//! field declarations, then passed to whatever needs CRM access. It is cheap
//! to clone; dropping the last clone releases the port.

use std::fmt;
use std::sync::Arc;

use core_kernel::HealthCheckResult;

use crate::entities::{Company, Contact, Deal, Note, ProductRow};
use crate::entity::{Entity, EntityType};
use crate::error::CrmError;
use crate::field::{FieldDescriptor, Schema};
use crate::manager::Manager;
use crate::ports::CrmPort;

struct CrmInner {
    port: Arc<dyn CrmPort>,
    deal: Arc<Schema>,
    company: Arc<Schema>,
    contact: Arc<Schema>,
    note: Arc<Schema>,
    product_row: Arc<Schema>,
}

/// Handle to the remote CRM: API client port plus field-mapping tables
#[derive(Clone)]
pub struct Crm {
    inner: Arc<CrmInner>,
}

impl Crm {
    /// Starts building a handle around an API client port
    pub fn builder(port: Arc<dyn CrmPort>) -> CrmBuilder {
        CrmBuilder {
            port,
            deal_fields: Vec::new(),
            company_fields: Vec::new(),
            contact_fields: Vec::new(),
        }
    }

    /// Builds a handle with the standard field tables only
    pub fn new(port: Arc<dyn CrmPort>) -> Result<Self, CrmError> {
        Self::builder(port).build()
    }

    pub fn port(&self) -> &Arc<dyn CrmPort> {
        &self.inner.port
    }

    /// Field-mapping table of an entity type
    pub fn schema(&self, entity: EntityType) -> Arc<Schema> {
        match entity {
            EntityType::Deal => self.inner.deal.clone(),
            EntityType::Company => self.inner.company.clone(),
            EntityType::Contact => self.inner.contact.clone(),
            EntityType::Note => self.inner.note.clone(),
            EntityType::ProductRow => self.inner.product_row.clone(),
        }
    }

    pub fn manager<E: Entity>(&self) -> Manager<E> {
        Manager::new(self.clone())
    }

    pub fn deals(&self) -> Manager<Deal> {
        self.manager()
    }

    pub fn companies(&self) -> Manager<Company> {
        self.manager()
    }

    pub fn contacts(&self) -> Manager<Contact> {
        self.manager()
    }

    /// Checks that the API client can reach the CRM
    pub async fn health_check(&self) -> HealthCheckResult {
        self.inner.port.health_check().await
    }
}

impl fmt::Debug for Crm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crm")
            .field("deal_fields", &self.inner.deal.fields().len())
            .field("company_fields", &self.inner.company.fields().len())
            .field("contact_fields", &self.inner.contact.fields().len())
            .finish_non_exhaustive()
    }
}

/// Collects custom field declarations before the schemas are validated
pub struct CrmBuilder {
    port: Arc<dyn CrmPort>,
    deal_fields: Vec<FieldDescriptor>,
    company_fields: Vec<FieldDescriptor>,
    contact_fields: Vec<FieldDescriptor>,
}

impl CrmBuilder {
    /// Adds custom deal fields
    pub fn deal_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.deal_fields.extend(fields);
        self
    }

    /// Adds custom company fields
    pub fn company_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.company_fields.extend(fields);
        self
    }

    /// Adds custom contact fields
    pub fn contact_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.contact_fields.extend(fields);
        self
    }

    /// Validates every schema and returns the handle
    pub fn build(self) -> Result<Crm, CrmError> {
        let deal = schema_for::<Deal>(self.deal_fields)?;
        let company = schema_for::<Company>(self.company_fields)?;
        let contact = schema_for::<Contact>(self.contact_fields)?;
        let note = schema_for::<Note>(Vec::new())?;
        let product_row = Arc::new(Schema::new(
            EntityType::ProductRow.name(),
            ProductRow::standard_fields().iter().cloned(),
        )?);

        tracing::debug!(
            deal_custom = deal.custom_fields().count(),
            company_custom = company.custom_fields().count(),
            contact_custom = contact.custom_fields().count(),
            "CRM schemas built"
        );

        Ok(Crm {
            inner: Arc::new(CrmInner {
                port: self.port,
                deal,
                company,
                contact,
                note,
                product_row,
            }),
        })
    }
}

fn schema_for<E: Entity>(custom: Vec<FieldDescriptor>) -> Result<Arc<Schema>, CrmError> {
    let schema = Schema::new(E::TYPE.name(), E::standard_fields().iter().cloned())?;
    Ok(Arc::new(schema.with_custom(custom)?))
}
