//! CRM API client adapters
//!
//! Adapter implementations of [`crate::ports::CrmPort`]. The webhook adapter
//! talks to a Bitrix24 portal over HTTPS; tests use
//! [`crate::ports::mock::MockCrmPort`] instead.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_crm::adapters::{WebhookAdapter, WebhookConfig};
//! use domain_crm::{Crm, CrmPort};
//! use std::sync::Arc;
//!
//! let config = WebhookConfig::new(url::Url::parse(&std::env::var("WEBHOOK")?)?);
//! let port: Arc<dyn CrmPort> = Arc::new(WebhookAdapter::new(config)?);
//! let crm = Crm::new(port)?;
//! ```

pub mod webhook;

pub use webhook::{WebhookAdapter, WebhookConfig};
