//! CRM Demo
//!
//! Walks through the accessor API against a live portal: listing and
//! filtering deals, lazy relations, custom fields, notes and product rows.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_cli::{build_crm, run, AppConfig};
//!
//! let config = AppConfig::from_env()?;
//! let crm = build_crm(Arc::new(WebhookAdapter::new(config.webhook_config())?))?;
//! let summary = run(&crm, &mut std::io::stdout()).await?;
//! ```

pub mod app;
pub mod config;
pub mod demo;

pub use app::{connect_webhook, init_tracing, launch};
pub use config::{AppConfig, ConfigError};
pub use demo::{build_crm, deal_custom_fields, run, DemoSummary};
