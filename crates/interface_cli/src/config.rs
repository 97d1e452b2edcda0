//! Demo configuration

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use domain_crm::WebhookConfig;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `WEBHOOK` is not set or empty
    #[error("WEBHOOK is not set")]
    MissingWebhook,

    /// `WEBHOOK` is not an absolute http(s) URL
    #[error("WEBHOOK is not a valid URL: {0}")]
    InvalidWebhook(String),

    /// A setting is outside its accepted range
    #[error("{name} is invalid: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    /// A value could not be read or parsed
    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

/// Raw environment values, before validation
#[derive(Debug, Deserialize)]
struct RawConfig {
    webhook: Option<String>,
    #[serde(default = "default_timeout_secs")]
    crm_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    crm_log_level: String,
    #[serde(default = "default_page_limit")]
    crm_page_limit: usize,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_limit() -> usize {
    500
}

/// Demo configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Bitrix24 inbound webhook; carries the access token
    pub webhook: Url,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Maximum pages fetched per list call
    pub page_limit: usize,
}

impl AppConfig {
    /// Loads configuration from the process environment
    ///
    /// # Environment Variables
    ///
    /// * `WEBHOOK` - Bitrix24 inbound webhook URL (required)
    /// * `CRM_TIMEOUT_SECS` - request timeout in seconds (default: 30)
    /// * `CRM_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
    /// * `CRM_PAGE_LIMIT` - list page cap, at least 1 (default: 500)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(config::Environment::default())
    }

    /// Loads configuration from explicit variables instead of the environment
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(config::Environment::default().source(Some(vars)))
    }

    fn load(source: config::Environment) -> Result<Self, ConfigError> {
        let raw: RawConfig = config::Config::builder()
            .add_source(source.try_parsing(true))
            .build()?
            .try_deserialize()?;

        let webhook = raw
            .webhook
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .ok_or(ConfigError::MissingWebhook)?;
        let webhook = Url::parse(&webhook).map_err(|e| ConfigError::InvalidWebhook(e.to_string()))?;
        if !matches!(webhook.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidWebhook(format!(
                "unsupported scheme '{}'",
                webhook.scheme()
            )));
        }

        if raw.crm_page_limit == 0 {
            return Err(ConfigError::InvalidValue {
                name: "CRM_PAGE_LIMIT",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            webhook,
            timeout_secs: raw.crm_timeout_secs,
            log_level: raw.crm_log_level,
            page_limit: raw.crm_page_limit,
        })
    }

    /// Host part of the webhook, safe to log
    pub fn webhook_host(&self) -> &str {
        self.webhook.host_str().unwrap_or("unknown")
    }

    /// Adapter settings derived from this configuration
    pub fn webhook_config(&self) -> WebhookConfig {
        WebhookConfig::new(self.webhook.clone())
            .with_timeout_secs(self.timeout_secs)
            .with_page_limit(self.page_limit)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("webhook_host", &self.webhook_host())
            .field("timeout_secs", &self.timeout_secs)
            .field("log_level", &self.log_level)
            .field("page_limit", &self.page_limit)
            .finish()
    }
}
