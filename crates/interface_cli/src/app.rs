//! Startup sequence
//!
//! Loads configuration, connects the API client and runs the walkthrough.
//! Nothing is connected until a webhook is configured.

use std::io::Write;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{AdapterHealth, PortError};
use domain_crm::{CrmPort, WebhookAdapter};

use crate::config::{AppConfig, ConfigError};
use crate::demo::{build_crm, run, DemoSummary};

/// Connects the production API client
pub fn connect_webhook(config: &AppConfig) -> Result<Arc<dyn CrmPort>, PortError> {
    Ok(Arc::new(WebhookAdapter::new(config.webhook_config())?))
}

/// Runs the demo for a loaded configuration
///
/// Returns `Ok(None)` without calling `connect` when `WEBHOOK` is missing.
pub async fn launch<W, F>(
    config: Result<AppConfig, ConfigError>,
    connect: F,
    out: &mut W,
) -> anyhow::Result<Option<DemoSummary>>
where
    W: Write,
    F: FnOnce(&AppConfig) -> Result<Arc<dyn CrmPort>, PortError>,
{
    let config = match config {
        Ok(config) => config,
        Err(ConfigError::MissingWebhook) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    init_tracing(&config.log_level);
    tracing::info!(host = config.webhook_host(), "Starting CRM demo");

    let crm = build_crm(connect(&config)?)?;

    let health = crm.health_check().await;
    if health.status != AdapterHealth::Healthy {
        tracing::warn!(
            status = ?health.status,
            message = health.message.as_deref().unwrap_or_default(),
            "Webhook health check failed"
        );
    }

    Ok(Some(run(&crm, out).await?))
}

/// Initializes the tracing subscriber; `RUST_LOG` wins over `CRM_LOG_LEVEL`
///
/// Later calls keep the subscriber installed first.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init();
}
