//! Field values and coercion rules
//!
//! The CRM transports almost everything as strings: amounts arrive as
//! `"1500.00"`, flags as `"Y"`/`"N"`, ids as `"42"`. A [`FieldKind`] decides
//! how such a raw JSON value becomes a typed [`FieldValue`] on read, and how a
//! staged value is written back on save.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde_json::Value;

use core_kernel::EntityId;

use crate::error::CrmError;

/// Coercion rule attached to a field descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Record identifier or foreign key
    Id,
    /// Free text; numbers are stringified
    Text,
    /// Whole number
    Integer,
    /// Decimal amount (opportunity, price, revenue)
    Money,
    /// `Y`/`N` flag
    Boolean,
    /// RFC 3339 timestamp
    DateTime,
    /// Enumeration item id of a list field
    Select,
    /// Multiple values (multi-select or multi-value custom fields)
    List,
}

impl FieldKind {
    /// Returns the kind name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Id => "id",
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Money => "money",
            FieldKind::Boolean => "boolean",
            FieldKind::DateTime => "datetime",
            FieldKind::Select => "select",
            FieldKind::List => "list",
        }
    }

    /// Converts a raw remote value into a typed value
    ///
    /// `null` is accepted for every kind. Empty strings are read as `Null`
    /// for the numeric and date kinds, which the CRM uses for "not filled in".
    pub fn coerce(&self, key: &str, raw: &Value) -> Result<FieldValue, CrmError> {
        if raw.is_null() {
            return Ok(FieldValue::Null);
        }
        let mismatch = || CrmError::Coercion {
            key: key.to_string(),
            expected: self.name(),
            found: raw.to_string(),
        };

        match self {
            FieldKind::Id => match raw {
                Value::String(s) if s.trim().is_empty() => Ok(FieldValue::Null),
                other => EntityId::from_json(other).map(FieldValue::Id).ok_or_else(mismatch),
            },
            FieldKind::Text => scalar_text(raw).map(FieldValue::Text).ok_or_else(mismatch),
            FieldKind::Select => scalar_text(raw).map(FieldValue::Select).ok_or_else(mismatch),
            FieldKind::Integer => match raw {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().and_then(integral))
                    .map(FieldValue::Integer)
                    .ok_or_else(mismatch),
                Value::String(s) if s.trim().is_empty() => Ok(FieldValue::Null),
                Value::String(s) => s.trim().parse().map(FieldValue::Integer).map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            FieldKind::Money => match raw {
                Value::Number(n) => parse_decimal(&n.to_string()).map(FieldValue::Money).ok_or_else(mismatch),
                Value::String(s) if s.trim().is_empty() => Ok(FieldValue::Null),
                Value::String(s) => parse_decimal(s.trim()).map(FieldValue::Money).ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
            FieldKind::Boolean => match raw {
                Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
                Value::String(s) => match s.as_str() {
                    "Y" | "y" | "1" | "true" => Ok(FieldValue::Boolean(true)),
                    "N" | "n" | "0" | "false" | "" => Ok(FieldValue::Boolean(false)),
                    _ => Err(mismatch()),
                },
                Value::Number(n) => Ok(FieldValue::Boolean(n.as_i64() != Some(0))),
                _ => Err(mismatch()),
            },
            FieldKind::DateTime => match raw {
                Value::String(s) if s.trim().is_empty() => Ok(FieldValue::Null),
                Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                    .map(FieldValue::DateTime)
                    .map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            FieldKind::List => match raw {
                Value::Array(items) => items
                    .iter()
                    .filter(|item| !item.is_null())
                    .map(scalar_text)
                    .collect::<Option<Vec<_>>>()
                    .map(FieldValue::List)
                    .ok_or_else(mismatch),
                other => scalar_text(other)
                    .map(|s| FieldValue::List(vec![s]))
                    .ok_or_else(mismatch),
            },
        }
    }

    /// Converts a staged value into the JSON form sent to the remote side
    ///
    /// Only checks that the value fits the kind; the remote side decides
    /// whether it accepts it.
    pub fn to_remote(&self, key: &str, value: &FieldValue) -> Result<Value, CrmError> {
        let mismatch = || CrmError::Coercion {
            key: key.to_string(),
            expected: self.name(),
            found: value.kind_name().to_string(),
        };

        let json = match (self, value) {
            (_, FieldValue::Null) => Value::Null,
            (FieldKind::Id, FieldValue::Id(id)) => id.to_json(),
            (FieldKind::Id, FieldValue::Integer(n)) => Value::String(n.to_string()),
            (FieldKind::Id, FieldValue::Text(s)) => Value::String(s.clone()),
            (FieldKind::Text, FieldValue::Text(s) | FieldValue::Select(s)) => Value::String(s.clone()),
            (FieldKind::Text, FieldValue::Integer(n)) => Value::String(n.to_string()),
            (FieldKind::Text, FieldValue::Money(d)) => Value::String(d.to_string()),
            (FieldKind::Select, FieldValue::Select(s) | FieldValue::Text(s)) => Value::String(s.clone()),
            (FieldKind::Select, FieldValue::Integer(n)) => Value::String(n.to_string()),
            (FieldKind::Integer, FieldValue::Integer(n)) => Value::from(*n),
            (FieldKind::Integer, FieldValue::Text(s)) => {
                let n: i64 = s.trim().parse().map_err(|_| mismatch())?;
                Value::from(n)
            }
            (FieldKind::Money, FieldValue::Money(d)) => Value::String(d.to_string()),
            (FieldKind::Money, FieldValue::Integer(n)) => Value::String(n.to_string()),
            (FieldKind::Money, FieldValue::Text(s)) => {
                let d = parse_decimal(s.trim()).ok_or_else(mismatch)?;
                Value::String(d.to_string())
            }
            (FieldKind::Boolean, FieldValue::Boolean(b)) => {
                Value::String(if *b { "Y" } else { "N" }.to_string())
            }
            (FieldKind::DateTime, FieldValue::DateTime(dt)) => Value::String(dt.to_rfc3339()),
            (FieldKind::DateTime, FieldValue::Text(s)) => {
                let dt = DateTime::parse_from_rfc3339(s.trim()).map_err(|_| mismatch())?;
                Value::String(dt.to_rfc3339())
            }
            (FieldKind::List, FieldValue::List(items)) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            (FieldKind::List, FieldValue::Text(s) | FieldValue::Select(s)) => {
                Value::Array(vec![Value::String(s.clone())])
            }
            _ => return Err(mismatch()),
        };
        Ok(json)
    }
}

/// A coerced field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Id(EntityId),
    Text(String),
    Integer(i64),
    Money(Decimal),
    Boolean(bool),
    DateTime(DateTime<FixedOffset>),
    Select(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the variant name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Id(_) => "id",
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Money(_) => "money",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::DateTime(_) => "datetime",
            FieldValue::Select(_) => "select",
            FieldValue::List(_) => "list",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Select(s) => Some(s),
            FieldValue::Id(id) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Money(d) => Some(*d),
            FieldValue::Integer(n) => Some(Decimal::from(*n)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<&EntityId> {
        match self {
            FieldValue::Id(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("-"),
            FieldValue::Id(id) => write!(f, "{}", id),
            FieldValue::Text(s) | FieldValue::Select(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Money(d) => write!(f, "{}", d),
            FieldValue::Boolean(b) => f.write_str(if *b { "Y" } else { "N" }),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            FieldValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Money(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<EntityId> for FieldValue {
    fn from(value: EntityId) -> Self {
        FieldValue::Id(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

fn scalar_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whole-number floats such as `5.0` within `i64` range
fn integral(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then(|| f as i64)
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)).ok()
}
