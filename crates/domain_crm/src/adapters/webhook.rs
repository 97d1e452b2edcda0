//! Bitrix24 inbound-webhook adapter
//!
//! Every port call is one `POST <webhook>/<method>` with the parameters as a
//! JSON body. Successful responses carry `{result, next, total}`; failures
//! carry `{error, error_description}` and an HTTP status.
//!
//! # Error Handling
//!
//! - 401, `NO_AUTH_FOUND`, `INVALID_CREDENTIALS` -> `PortError::Unauthorized`
//! - 403, `ACCESS_DENIED` -> `PortError::Unauthorized`
//! - 404, `ERROR_METHOD_NOT_FOUND`, a "Not found" description -> `PortError::NotFound`
//! - 429, `QUERY_LIMIT_EXCEEDED` -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Client timeouts -> `PortError::Timeout`
//! - Transport failures -> `PortError::Connection`
//! - Undecodable bodies -> `PortError::Transformation`
//! - Other API errors -> `PortError::Remote`
//!
//! Nothing is retried. The webhook path carries the access token, so only
//! its host ever appears in `Debug` output and logs.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};

use crate::ports::CrmPort;

const ADAPTER_ID: &str = "bitrix24-webhook";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_LIMIT: usize = 500;
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Configuration for the webhook adapter
#[derive(Clone)]
pub struct WebhookConfig {
    /// Inbound webhook base URL, e.g. `https://portal.bitrix24.ru/rest/1/<token>/`
    pub webhook: Url,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum number of pages fetched by one list call
    pub page_limit: usize,
}

impl WebhookConfig {
    /// Creates a configuration with default timeout and page limit
    pub fn new(webhook: Url) -> Self {
        Self {
            webhook,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Caps the pages read per list call; at least one page is always read
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    fn host(&self) -> &str {
        self.webhook.host_str().unwrap_or("unknown")
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("host", &self.host())
            .field("webhook", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("page_limit", &self.page_limit)
            .finish()
    }
}

/// REST adapter implementing [`CrmPort`] against a Bitrix24 webhook
///
/// Holds one `reqwest::Client`, so connections are pooled across calls.
#[derive(Clone)]
pub struct WebhookAdapter {
    config: WebhookConfig,
    client: Client,
}

impl fmt::Debug for WebhookAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Response envelope shared by every REST method
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    next: Option<u64>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl WebhookAdapter {
    /// Creates an adapter with its own HTTP client
    ///
    /// # Errors
    ///
    /// `PortError::Internal` when the HTTP client cannot be built.
    pub fn new(config: WebhookConfig) -> Result<Self, PortError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    fn method_url(&self, method: &str) -> Result<Url, PortError> {
        let base = self.config.webhook.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, method))
            .map_err(|e| PortError::validation_field(format!("Invalid method name: {}", e), "method"))
    }

    async fn request(&self, method: &str, params: &Value) -> Result<ApiResponse, PortError> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "crm_request",
            host = self.config.host(),
            method,
            request_id = %request_id
        );

        async {
            let started = Instant::now();
            let result = self.send(method, params).await;
            match &result {
                Ok(response) => tracing::debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    total = ?response.total,
                    next = ?response.next,
                    "CRM call succeeded"
                ),
                Err(e) => tracing::warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "CRM call failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn send(&self, method: &str, params: &Value) -> Result<ApiResponse, PortError> {
        let response = self
            .client
            .post(self.method_url(method)?)
            .json(params)
            .send()
            .await
            .map_err(|e| self.transport_error(method, e))?;

        let status = response.status();
        let retry_after = response.headers().get(RETRY_AFTER).and_then(parse_retry_after_secs);
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(method, e))?;

        let parsed = serde_json::from_str::<ApiResponse>(&body);

        if status.is_success() {
            let envelope = parsed.map_err(|e| {
                PortError::transformation(format!("Failed to parse {} response: {}", method, e))
            })?;
            if let Some(code) = envelope.error.as_deref() {
                return Err(map_api_error(
                    method,
                    params,
                    status,
                    code,
                    envelope.error_description.as_deref().unwrap_or_default(),
                    retry_after,
                ));
            }
            return Ok(envelope);
        }

        let (code, description) = match parsed {
            Ok(envelope) => (
                envelope.error.unwrap_or_default(),
                envelope.error_description.unwrap_or_default(),
            ),
            Err(_) => (String::new(), body.trim().to_string()),
        };
        Err(map_api_error(method, params, status, &code, &description, retry_after))
    }

    fn transport_error(&self, method: &str, e: reqwest::Error) -> PortError {
        if e.is_timeout() {
            PortError::Timeout {
                operation: method.to_string(),
                duration_ms: self.config.timeout_secs.saturating_mul(1000),
            }
        } else if e.is_decode() {
            PortError::transformation(format!("Failed to read {} response: {}", method, e))
        } else {
            // reqwest errors include the full URL; strip it so the token stays out
            PortError::Connection {
                message: format!("Request to {} failed", self.config.host()),
                source: Some(Box::new(e.without_url())),
            }
        }
    }
}

/// Maps a failed response onto the port error taxonomy
fn map_api_error(
    method: &str,
    params: &Value,
    status: StatusCode,
    code: &str,
    description: &str,
    retry_after: Option<u64>,
) -> PortError {
    let not_found = || {
        let entity_type = method.rsplit_once('.').map(|(prefix, _)| prefix).unwrap_or(method);
        match params.get("id") {
            Some(Value::String(id)) => PortError::not_found(entity_type, id),
            Some(Value::Number(id)) => PortError::not_found(entity_type, id),
            _ => PortError::not_found("method", method),
        }
    };
    let message = if description.is_empty() { code } else { description };

    match code.to_ascii_uppercase().as_str() {
        "NO_AUTH_FOUND" | "INVALID_CREDENTIALS" | "EXPIRED_TOKEN" | "ACCESS_DENIED"
        | "INSUFFICIENT_SCOPE" => {
            return PortError::Unauthorized {
                message: message.to_string(),
            }
        }
        "QUERY_LIMIT_EXCEEDED" => {
            return PortError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            }
        }
        "ERROR_METHOD_NOT_FOUND" => return PortError::not_found("method", method),
        "NOT_FOUND" => return not_found(),
        _ => {}
    }
    if description.to_ascii_lowercase().contains("not found") {
        return not_found();
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized {
            message: message.to_string(),
        },
        StatusCode::NOT_FOUND => PortError::not_found("method", method),
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        s if s.is_server_error() => PortError::ServiceUnavailable {
            service: format!("{} returned {}", method, s.as_u16()),
        },
        StatusCode::BAD_REQUEST if code.is_empty() => PortError::validation(message),
        s => PortError::remote(
            if code.is_empty() { s.as_u16().to_string() } else { code.to_string() },
            message,
        ),
    }
}

fn parse_retry_after_secs(value: &HeaderValue) -> Option<u64> {
    value.to_str().ok()?.trim().parse::<u64>().ok()
}

impl DomainPort for WebhookAdapter {}

#[async_trait]
impl HealthCheckable for WebhookAdapter {
    /// Calls `profile`, which every webhook may access
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = self.request("profile", &Value::Object(Default::default())).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e @ PortError::RateLimited { .. }) => (AdapterHealth::Degraded, Some(e.to_string())),
            Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl CrmPort for WebhookAdapter {
    async fn call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        Ok(self.request(method, &params).await?.result)
    }

    async fn list(&self, method: &str, params: Value) -> Result<Vec<Value>, PortError> {
        let mut params = match params {
            Value::Object(map) => map,
            Value::Null => Default::default(),
            other => {
                return Err(PortError::validation_field(
                    format!("List parameters must be an object, got {}", other),
                    "params",
                ))
            }
        };

        let mut items = Vec::new();
        let mut pages = 0usize;
        loop {
            let response = self.request(method, &Value::Object(params.clone())).await?;
            pages += 1;
            match response.result {
                Value::Array(page) => items.extend(page),
                Value::Null => {}
                other => {
                    return Err(PortError::transformation(format!(
                        "{} did not return a list: {}",
                        method, other
                    )))
                }
            }

            match response.next {
                Some(next) if pages < self.config.page_limit => {
                    params.insert("start".to_string(), Value::from(next));
                }
                Some(_) => {
                    tracing::warn!(
                        method,
                        pages,
                        fetched = items.len(),
                        total = ?response.total,
                        "Page limit reached, list truncated"
                    );
                    break;
                }
                None => break,
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn adapter_for(server: &mockito::ServerGuard) -> WebhookAdapter {
        let webhook = Url::parse(&format!("{}/rest/1/secret-token/", server.url())).unwrap();
        WebhookAdapter::new(WebhookConfig::new(webhook).with_timeout_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_call_returns_result_member() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/1/secret-token/crm.deal.get")
            .match_body(Matcher::Json(json!({"id": "5"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result": {"ID": "5", "TITLE": "Order"}, "time": {}}"#)
            .expect(1)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let result = adapter.call("crm.deal.get", json!({"id": "5"})).await.unwrap();

        assert_eq!(result["TITLE"], json!("Order"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_follows_next_cursor() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/rest/1/secret-token/crm.deal.list")
            .match_body(Matcher::Json(json!({"select": ["ID"]})))
            .with_status(200)
            .with_body(r#"{"result": [{"ID": "1"}, {"ID": "2"}], "next": 2, "total": 3}"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/rest/1/secret-token/crm.deal.list")
            .match_body(Matcher::Json(json!({"select": ["ID"], "start": 2})))
            .with_status(200)
            .with_body(r#"{"result": [{"ID": "3"}], "total": 3}"#)
            .expect(1)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let items = adapter.list("crm.deal.list", json!({"select": ["ID"]})).await.unwrap();

        let ids: Vec<_> = items.iter().map(|i| i["ID"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_stops_at_page_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/1/secret-token/crm.deal.list")
            .with_status(200)
            .with_body(r#"{"result": [{"ID": "1"}], "next": 1, "total": 100}"#)
            .expect(2)
            .create_async()
            .await;

        let webhook = Url::parse(&format!("{}/rest/1/secret-token/", server.url())).unwrap();
        let adapter = WebhookAdapter::new(WebhookConfig::new(webhook).with_page_limit(2)).unwrap();
        let items = adapter.list("crm.deal.list", json!({})).await.unwrap();

        assert_eq!(items.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_credentials_map_to_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/1/secret-token/crm.deal.list")
            .with_status(401)
            .with_body(r#"{"error": "INVALID_CREDENTIALS", "error_description": "Invalid request credentials"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.list("crm.deal.list", json!({})).await.unwrap_err();

        match err {
            PortError::Unauthorized { message } => assert_eq!(message, "Invalid request credentials"),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_not_found_description_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/1/secret-token/crm.company.get")
            .with_status(400)
            .with_body(r#"{"error": "", "error_description": "Not found"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.call("crm.company.get", json!({"id": "77"})).await.unwrap_err();

        match err {
            PortError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "crm.company");
                assert_eq!(id, "77");
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_method_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/1/secret-token/crm.nothing.list")
            .with_status(404)
            .with_body(r#"{"error": "ERROR_METHOD_NOT_FOUND", "error_description": "Method not found!"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.call("crm.nothing.list", json!({})).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_query_limit_maps_to_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/1/secret-token/crm.deal.list")
            .with_status(503)
            .with_header("retry-after", "7")
            .with_body(r#"{"error": "QUERY_LIMIT_EXCEEDED", "error_description": "Too many requests"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.call("crm.deal.list", json!({})).await.unwrap_err();
        assert!(matches!(err, PortError::RateLimited { retry_after_secs: 7 }));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_service_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/1/secret-token/crm.deal.add")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.call("crm.deal.add", json!({"fields": {}})).await.unwrap_err();
        assert!(matches!(err, PortError::ServiceUnavailable { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_other_api_error_maps_to_remote() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/1/secret-token/crm.deal.update")
            .with_status(400)
            .with_body(r#"{"error": "ERROR_CORE", "error_description": "Stage is closed"}"#)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter
            .call("crm.deal.update", json!({"id": "1", "fields": {"TITLE": "x"}}))
            .await
            .unwrap_err();

        match err {
            PortError::Remote { code, message } => {
                assert_eq!(code, "ERROR_CORE");
                assert_eq!(message, "Stage is closed");
            }
            other => panic!("Expected Remote, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_transformation() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/1/secret-token/crm.deal.get")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter.call("crm.deal.get", json!({"id": "1"})).await.unwrap_err();
        assert!(matches!(err, PortError::Transformation { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_maps_to_connection() {
        let webhook = Url::parse("http://127.0.0.1:1/rest/1/secret-token/").unwrap();
        let adapter = WebhookAdapter::new(WebhookConfig::new(webhook).with_timeout_secs(2)).unwrap();

        let err = adapter.call("crm.deal.list", json!({})).await.unwrap_err();
        match err {
            PortError::Connection { message, .. } => assert!(!message.contains("secret-token")),
            other => panic!("Expected Connection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_health_check_calls_profile() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/1/secret-token/profile")
            .with_status(200)
            .with_body(r#"{"result": {"ID": "1", "ADMIN": true}}"#)
            .expect(1)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let result = adapter.health_check().await;

        assert_eq!(result.status, AdapterHealth::Healthy);
        assert_eq!(result.adapter_id, ADAPTER_ID);
        mock.assert_async().await;
    }

    #[test]
    fn test_debug_redacts_webhook_token() {
        let webhook = Url::parse("https://portal.bitrix24.ru/rest/1/secret-token/").unwrap();
        let adapter = WebhookAdapter::new(WebhookConfig::new(webhook)).unwrap();

        let debug = format!("{:?}", adapter);
        assert!(debug.contains("portal.bitrix24.ru"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_page_limit_is_at_least_one() {
        let webhook = Url::parse("https://portal.bitrix24.ru/rest/1/secret-token/").unwrap();
        assert_eq!(WebhookConfig::new(webhook).with_page_limit(0).page_limit, 1);
    }
}
