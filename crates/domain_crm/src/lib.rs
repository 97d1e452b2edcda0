//! Bitrix24 CRM Accessors
//!
//! This crate maps remote CRM records (deals, companies, contacts and their
//! timeline notes and product rows) onto typed Rust entities.
//!
//! # Model
//!
//! - **Schema**: per entity type, the table of local attribute names, remote
//!   field keys and coercion kinds; custom `UF_CRM_*` fields are declared
//!   alongside the standard ones
//! - **Manager**: `get_all`, `filter`, `get`, `create` and `save` for one
//!   entity type, each forwarding to a single remote call
//! - **Relations**: `deal.company()` / `deal.contact()` resolve a foreign key
//!   on first read and cache the result on that instance
//! - **Port**: [`CrmPort`] is the only place that touches the network
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_crm::{Crm, CustomField, Filter, WebhookAdapter, WebhookConfig};
//!
//! let port = Arc::new(WebhookAdapter::new(WebhookConfig::new(webhook_url))?);
//! let crm = Crm::builder(port)
//!     .deal_fields([CustomField::text("delivery_address", "UF_CRM_DELIVERY_ADDRESS")])
//!     .build()?;
//!
//! let sales = crm.deals().filter(Filter::new().eq("type_id", "SALE")).await?;
//! if let Some(deal) = sales.first() {
//!     let company = deal.company().await?;
//! }
//! ```

pub mod adapters;
pub mod crm;
pub mod entities;
pub mod entity;
pub mod error;
pub mod field;
pub mod filter;
pub mod manager;
pub mod ports;
pub mod record;
pub mod relation;
pub mod value;

pub use adapters::{WebhookAdapter, WebhookConfig};
pub use crm::{Crm, CrmBuilder};
pub use entities::{Company, Contact, Deal, Note, NoteSet, ProductRow, ProductRowSet};
pub use entity::{Entity, EntityType};
pub use error::CrmError;
pub use field::{CustomField, FieldDescriptor, Schema};
pub use filter::{Condition, Direction, Filter, Operator};
pub use manager::Manager;
pub use ports::CrmPort;
pub use record::Record;
pub use relation::Related;
pub use value::{FieldKind, FieldValue};

#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockCrmPort, RecordedCall};
