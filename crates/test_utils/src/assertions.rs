//! Custom Test Assertions
//!
//! Assertions over the traffic a [`MockCrmPort`] received, with messages
//! that list what was actually called.

use serde_json::Value;

use domain_crm::{MockCrmPort, RecordedCall};

/// Asserts that `method` was called exactly `expected` times
pub async fn assert_call_count(port: &MockCrmPort, method: &str, expected: usize) {
    let calls = port.calls_to(method).await;
    assert_eq!(
        calls.len(),
        expected,
        "Expected {} call(s) to {}, got {}; all calls: {:?}",
        expected,
        method,
        calls.len(),
        methods(&port.calls().await)
    );
}

/// Asserts that `method` was never called
pub async fn assert_not_called(port: &MockCrmPort, method: &str) {
    assert_call_count(port, method, 0).await;
}

/// Asserts that the last call to `method` carried exactly `params`
pub async fn assert_last_params(port: &MockCrmPort, method: &str, params: &Value) {
    let calls = port.calls_to(method).await;
    let last = calls
        .last()
        .unwrap_or_else(|| panic!("Expected a call to {}, got none", method));
    assert_eq!(&last.params, params, "Unexpected params for {}", method);
}

/// Asserts that the port saw no calls at all
pub async fn assert_no_calls(port: &MockCrmPort) {
    let calls = port.calls().await;
    assert!(calls.is_empty(), "Expected no calls, got {:?}", methods(&calls));
}

fn methods(calls: &[RecordedCall]) -> Vec<&str> {
    calls.iter().map(|c| c.method.as_str()).collect()
}
