//! Startup sequence against the in-memory port

use std::sync::Arc;

use domain_crm::{CrmPort, MockCrmPort};
use interface_cli::{launch, AppConfig, ConfigError};
use test_utils::{assert_call_count, assert_no_calls, seeded_port};

const WEBHOOK: &str = "https://portal.bitrix24.ru/rest/1/secret-token/";

#[tokio::test]
async fn test_missing_webhook_never_connects() {
    let port = Arc::new(MockCrmPort::new());
    let mut connected = false;
    let mut out = Vec::new();

    let summary = launch(
        AppConfig::from_vars([("CRM_LOG_LEVEL", "debug")]),
        |_: &AppConfig| {
            connected = true;
            Ok(port.clone() as Arc<dyn CrmPort>)
        },
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(summary, None);
    assert!(!connected);
    assert!(out.is_empty());
    assert_no_calls(&port).await;
}

#[tokio::test]
async fn test_invalid_config_is_an_error() {
    let port = Arc::new(MockCrmPort::new());

    let result = launch(
        AppConfig::from_vars([("WEBHOOK", WEBHOOK), ("CRM_PAGE_LIMIT", "0")]),
        |_: &AppConfig| Ok(port.clone() as Arc<dyn CrmPort>),
        &mut std::io::sink(),
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidValue { .. })
    ));
    assert_no_calls(&port).await;
}

#[tokio::test]
async fn test_configured_webhook_runs_demo() {
    let port = seeded_port().await;
    let mut out = Vec::new();

    let summary = launch(
        AppConfig::from_vars([("WEBHOOK", WEBHOOK)]),
        |config: &AppConfig| {
            assert_eq!(config.webhook_host(), "portal.bitrix24.ru");
            Ok(port.clone() as Arc<dyn CrmPort>)
        },
        &mut out,
    )
    .await
    .unwrap()
    .expect("demo ran");

    assert_eq!(summary.deals_found, 3);
    assert!(String::from_utf8(out).unwrap().contains("Deals found: 3"));
    assert_call_count(&port, "crm.deal.add", 1).await;
}
