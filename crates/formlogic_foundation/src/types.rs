//! Declared variable types and coercion.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::collections::{SharedMap, SharedVec};
use crate::value::Value;

/// Declared type of a form variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    /// Free text.
    String,
    /// IEEE 754 double.
    Number,
    /// True or false.
    Boolean,
    /// Key/value mapping.
    Object,
    /// Ordered list.
    Array,
    /// Calendar date.
    Date,
}

impl VarType {
    /// Value a variable of this type holds when nothing else is known.
    ///
    /// Text and collections start out empty but present; numbers and dates
    /// start out as the empty sentinel.
    #[must_use]
    pub fn empty_value(self) -> Value {
        match self {
            Self::String => Value::String(Arc::from("")),
            Self::Number | Self::Date => Value::Null,
            Self::Boolean => Value::Bool(false),
            Self::Object => Value::Object(SharedMap::new()),
            Self::Array => Value::Array(SharedVec::new()),
        }
    }

    /// Checks if a value already has this type. Null is accepted by every type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::String, Value::String(_))
                | (Self::Number, Value::Number(_))
                | (Self::Boolean, Value::Bool(_))
                | (Self::Object, Value::Object(_))
                | (Self::Array, Value::Array(_))
                | (Self::Date, Value::Date(_))
        )
    }

    /// Converts a value into this type.
    ///
    /// Returns `None` when no lossless conversion exists:
    /// - numbers accept numeric strings
    /// - strings accept numbers and booleans
    /// - booleans accept `"true"` and `"false"`
    /// - dates accept `YYYY-MM-DD` and RFC 3339 date-times (date part kept)
    /// - objects and arrays are never converted
    #[must_use]
    pub fn coerce(self, value: Value) -> Option<Value> {
        if self.accepts(&value) {
            return Some(value);
        }

        match (self, &value) {
            (Self::Number, Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Some(Value::Null);
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(Value::Number)
            }
            (Self::String, Value::Number(_) | Value::Bool(_)) => {
                Some(Value::String(value.to_string().into()))
            }
            (Self::String, Value::Date(d)) => Some(Value::String(d.to_string().into())),
            (Self::Boolean, Value::String(s)) => match s.as_ref() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            (Self::Date, Value::String(s)) => {
                if s.is_empty() {
                    return Some(Value::Null);
                }
                parse_date(s).map(Value::Date)
            }
            _ => None,
        }
    }
}

/// Parses an ISO 8601 calendar date or the date part of an RFC 3339 timestamp.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Date => "date",
        };
        write!(f, "{name}")
    }
}
