//! Opaque identifiers for remote CRM records
//!
//! The CRM hands out identifiers as numeric strings (`"42"`) and, in a few
//! methods, as bare JSON numbers. They are never interpreted locally, so the
//! identifier is kept as the exact text the remote side uses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Identifier of a record owned by the remote CRM
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates an identifier from its remote text form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reads an identifier from a JSON value (string or number)
    ///
    /// Returns `None` for `null`, empty strings and anything that is not a
    /// scalar id.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Returns the identifier as sent to the remote side
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the CRM's "no record" placeholder (`0`)
    ///
    /// Foreign-key fields such as `COMPANY_ID` hold `"0"` when nothing is linked.
    pub fn is_unset(&self) -> bool {
        self.0.is_empty() || self.0 == "0"
    }

    /// Converts the identifier to the JSON form used in request parameters
    pub fn to_json(&self) -> Value {
        Value::String(self.0.clone())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::invalid_identifier("identifier is empty"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_display() {
        let id = EntityId::new("42");
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_entity_id_from_json_number() {
        assert_eq!(EntityId::from_json(&json!(7)), Some(EntityId::new("7")));
    }

    #[test]
    fn test_entity_id_unset_placeholder() {
        assert!(EntityId::new("0").is_unset());
        assert!(!EntityId::new("10").is_unset());
    }
}
