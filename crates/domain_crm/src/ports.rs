//! CRM API client port
//!
//! This module defines the single seam between the accessor layer and the
//! remote CRM. Every manager operation turns into exactly one call on a
//! [`CrmPort`]; the port owns the wire format, authentication and paging.
//!
//! # Architecture
//!
//! - **Webhook Adapter**: REST calls against a Bitrix24 inbound webhook (see `adapters`)
//! - **Mock Adapter**: in-memory records for tests without network access
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_crm::{Crm, CrmPort};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn CrmPort> = Arc::new(WebhookAdapter::new(config)?);
//! let crm = Crm::builder(port).build()?;
//! ```

use async_trait::async_trait;
use serde_json::Value;

use core_kernel::{DomainPort, HealthCheckable, PortError};

/// Port for calling named remote CRM methods
///
/// Implementations map transport and API failures onto [`PortError`] and
/// return them as-is; callers never see a retry or a local reclassification.
#[async_trait]
pub trait CrmPort: DomainPort + HealthCheckable {
    /// Calls a remote method and returns its `result` member
    ///
    /// # Arguments
    ///
    /// * `method` - Remote method name, e.g. `crm.deal.get`
    /// * `params` - JSON object with the method parameters
    async fn call(&self, method: &str, params: Value) -> Result<Value, PortError>;

    /// Calls a list method and returns every item in remote order
    ///
    /// Paging is the implementation's concern; the webhook adapter follows the
    /// `next` cursor until the remote side reports no further page.
    async fn list(&self, method: &str, params: Value) -> Result<Vec<Value>, PortError>;
}

/// Mock implementation of CrmPort for testing
///
/// Stores records in memory, understands the `crm.*` methods used by the
/// managers and records every call so tests can assert on traffic.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::cmp::Ordering;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use chrono::Utc;
    use serde_json::{json, Map};

    use core_kernel::{AdapterHealth, EntityId, HealthCheckResult};

    /// One call observed by the mock
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub method: String,
        pub params: Value,
    }

    #[derive(Debug, Default)]
    struct MockStore {
        tables: HashMap<String, BTreeMap<u64, Map<String, Value>>>,
        product_rows: HashMap<String, Vec<Value>>,
        next_id: u64,
    }

    impl MockStore {
        fn allocate_id(&mut self) -> u64 {
            self.next_id += 1;
            self.next_id
        }
    }

    /// In-memory mock implementation of CrmPort
    #[derive(Debug, Default)]
    pub struct MockCrmPort {
        store: Arc<RwLock<MockStore>>,
        calls: Arc<RwLock<Vec<RecordedCall>>>,
        failures: Arc<RwLock<HashMap<String, PortError>>>,
    }

    impl MockCrmPort {
        /// Creates a new, empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts a record directly, bypassing call recording
        ///
        /// `table` is the method segment after `crm.`, e.g. `deal` or
        /// `timeline.comment`. An `ID` in `fields` is kept, otherwise one is
        /// allocated.
        pub async fn insert(&self, table: &str, fields: Value) -> EntityId {
            let mut store = self.store.write().await;
            let mut fields = fields.as_object().cloned().unwrap_or_default();
            let id = match fields.get("ID").and_then(EntityId::from_json) {
                Some(id) => {
                    let numeric = id.as_str().parse::<u64>().unwrap_or(0);
                    store.next_id = store.next_id.max(numeric);
                    numeric
                }
                None => store.allocate_id(),
            };
            fields.insert("ID".to_string(), Value::String(id.to_string()));
            store.tables.entry(table.to_string()).or_default().insert(id, fields);
            EntityId::from(id)
        }

        /// Replaces the product rows attached to a deal
        pub async fn set_product_rows(&self, deal_id: &EntityId, rows: Vec<Value>) {
            self.store
                .write()
                .await
                .product_rows
                .insert(deal_id.to_string(), rows);
        }

        /// Returns the stored fields of a record
        pub async fn record(&self, table: &str, id: &EntityId) -> Option<Map<String, Value>> {
            let key = id.as_str().parse::<u64>().ok()?;
            self.store.read().await.tables.get(table)?.get(&key).cloned()
        }

        /// Returns every call made so far
        pub async fn calls(&self) -> Vec<RecordedCall> {
            self.calls.read().await.clone()
        }

        /// Returns calls made to one method
        pub async fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
            self.calls
                .read()
                .await
                .iter()
                .filter(|c| c.method == method)
                .cloned()
                .collect()
        }

        pub async fn call_count(&self) -> usize {
            self.calls.read().await.len()
        }

        /// Makes the next call to `method` fail with `error`
        pub async fn fail_next(&self, method: &str, error: PortError) {
            self.failures.write().await.insert(method.to_string(), error);
        }

        async fn dispatch(&self, method: &str, params: &Value) -> Result<Value, PortError> {
            self.calls.write().await.push(RecordedCall {
                method: method.to_string(),
                params: params.clone(),
            });
            if let Some(error) = self.failures.write().await.remove(method) {
                return Err(error);
            }

            if method == "profile" {
                return Ok(json!({"ID": "1", "NAME": "Mock", "ADMIN": true}));
            }
            if method == "crm.deal.productrows.get" {
                let id = param_id(params)?;
                let store = self.store.read().await;
                let rows = store.product_rows.get(id.as_str()).cloned().unwrap_or_default();
                return Ok(Value::Array(rows));
            }

            let (table, op) = method
                .strip_prefix("crm.")
                .and_then(|rest| rest.rsplit_once('.'))
                .ok_or_else(|| PortError::not_found("method", method))?;

            match op {
                "add" => {
                    let fields = params
                        .get("fields")
                        .and_then(Value::as_object)
                        .cloned()
                        .ok_or_else(|| PortError::validation_field("fields are required", "fields"))?;
                    let mut store = self.store.write().await;
                    let id = store.allocate_id();
                    let mut fields = fields;
                    fields.insert("ID".to_string(), Value::String(id.to_string()));
                    store.tables.entry(table.to_string()).or_default().insert(id, fields);
                    Ok(Value::from(id))
                }
                "get" => {
                    let id = param_id(params)?;
                    let store = self.store.read().await;
                    lookup(&store, table, &id)
                        .cloned()
                        .map(Value::Object)
                        .ok_or_else(|| PortError::not_found(table, &id))
                }
                "update" => {
                    let id = param_id(params)?;
                    let fields = params
                        .get("fields")
                        .and_then(Value::as_object)
                        .cloned()
                        .unwrap_or_default();
                    let mut store = self.store.write().await;
                    let key = id.as_str().parse::<u64>().unwrap_or(0);
                    let record = store
                        .tables
                        .get_mut(table)
                        .and_then(|t| t.get_mut(&key))
                        .ok_or_else(|| PortError::not_found(table, &id))?;
                    record.extend(fields);
                    Ok(Value::Bool(true))
                }
                "list" => {
                    let store = self.store.read().await;
                    let mut items: Vec<Map<String, Value>> = store
                        .tables
                        .get(table)
                        .map(|t| t.values().cloned().collect())
                        .unwrap_or_default();
                    if let Some(filter) = params.get("filter").and_then(Value::as_object) {
                        items.retain(|item| matches_filter(item, filter));
                    }
                    if let Some(order) = params.get("order").and_then(Value::as_object) {
                        for (key, direction) in order.iter().rev() {
                            let descending = direction.as_str().is_some_and(|d| d.eq_ignore_ascii_case("DESC"));
                            items.sort_by(|a, b| {
                                let ordering = compare(a.get(key), b.get(key));
                                if descending { ordering.reverse() } else { ordering }
                            });
                        }
                    }
                    let select = params.get("select").and_then(Value::as_array);
                    Ok(Value::Array(
                        items
                            .into_iter()
                            .map(|item| Value::Object(apply_select(item, select)))
                            .collect(),
                    ))
                }
                _ => Err(PortError::not_found("method", method)),
            }
        }
    }

    fn param_id(params: &Value) -> Result<EntityId, PortError> {
        params
            .get("id")
            .and_then(EntityId::from_json)
            .ok_or_else(|| PortError::validation_field("id is required", "id"))
    }

    fn lookup<'a>(store: &'a MockStore, table: &str, id: &EntityId) -> Option<&'a Map<String, Value>> {
        let key = id.as_str().parse::<u64>().ok()?;
        store.tables.get(table)?.get(&key)
    }

    fn apply_select(item: Map<String, Value>, select: Option<&Vec<Value>>) -> Map<String, Value> {
        let Some(keys) = select else {
            return item;
        };
        if keys.iter().any(|k| k.as_str() == Some("*")) {
            return item;
        }
        let mut selected = Map::new();
        if let Some(id) = item.get("ID") {
            selected.insert("ID".to_string(), id.clone());
        }
        for key in keys.iter().filter_map(Value::as_str) {
            if let Some(value) = item.get(key) {
                selected.insert(key.to_string(), value.clone());
            }
        }
        selected
    }

    fn matches_filter(item: &Map<String, Value>, filter: &Map<String, Value>) -> bool {
        filter.iter().all(|(raw_key, expected)| {
            let (op, key) = split_operator(raw_key);
            let actual = item.get(key);
            let ordering = compare(actual, Some(expected));
            match op {
                "" | "=" => ordering == Ordering::Equal,
                "!" => ordering != Ordering::Equal,
                ">" => ordering == Ordering::Greater,
                ">=" => ordering != Ordering::Less,
                "<" => ordering == Ordering::Less,
                "<=" => ordering != Ordering::Greater,
                "%" => {
                    let haystack = actual.map(text_of).unwrap_or_default().to_lowercase();
                    haystack.contains(&text_of(expected).to_lowercase())
                }
                _ => false,
            }
        })
    }

    fn split_operator(key: &str) -> (&str, &str) {
        for op in [">=", "<=", "!", ">", "<", "%", "="] {
            if let Some(rest) = key.strip_prefix(op) {
                return (op, rest);
            }
        }
        ("", key)
    }

    fn text_of(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        let a = a.map(text_of).unwrap_or_default();
        let b = b.map(text_of).unwrap_or_default();
        match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.cmp(&b),
        }
    }

    impl DomainPort for MockCrmPort {}

    #[async_trait]
    impl HealthCheckable for MockCrmPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-crm-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl CrmPort for MockCrmPort {
        async fn call(&self, method: &str, params: Value) -> Result<Value, PortError> {
            self.dispatch(method, &params).await
        }

        async fn list(&self, method: &str, params: Value) -> Result<Vec<Value>, PortError> {
            match self.dispatch(method, &params).await? {
                Value::Array(items) => Ok(items),
                other => Err(PortError::transformation(format!(
                    "{} did not return a list: {}",
                    method, other
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::MockCrmPort;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_port_add_and_get() {
        let port = MockCrmPort::new();

        let id = port
            .call("crm.deal.add", json!({"fields": {"TITLE": "First"}}))
            .await
            .unwrap();
        let deal = port.call("crm.deal.get", json!({"id": id})).await.unwrap();

        assert_eq!(deal["TITLE"], json!("First"));
        assert_eq!(port.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_mock_port_list_filter_and_select() {
        let port = MockCrmPort::new();
        port.insert("deal", json!({"TITLE": "A", "TYPE_ID": "SALE", "OPPORTUNITY": "10"})).await;
        port.insert("deal", json!({"TITLE": "B", "TYPE_ID": "SERVICE", "OPPORTUNITY": "20"})).await;
        port.insert("deal", json!({"TITLE": "C", "TYPE_ID": "SALE", "OPPORTUNITY": "30"})).await;

        let items = port
            .list(
                "crm.deal.list",
                json!({
                    "filter": {"TYPE_ID": "SALE", ">OPPORTUNITY": "15"},
                    "select": ["TITLE"],
                }),
            )
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["TITLE"], json!("C"));
        assert!(items[0].get("TYPE_ID").is_none());
    }

    #[tokio::test]
    async fn test_mock_port_not_found() {
        let port = MockCrmPort::new();
        let result = port.call("crm.company.get", json!({"id": "404"})).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_mock_port_injected_failure() {
        let port = MockCrmPort::new();
        port.fail_next("crm.deal.list", PortError::RateLimited { retry_after_secs: 1 })
            .await;

        let first = port.list("crm.deal.list", json!({})).await;
        assert!(matches!(first, Err(PortError::RateLimited { .. })));

        let second = port.list("crm.deal.list", json!({})).await;
        assert!(second.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_port_health_check() {
        let port = MockCrmPort::new();
        let result = port.health_check().await;
        assert_eq!(result.status, core_kernel::AdapterHealth::Healthy);
    }
}
