//! Attribute casts.
//!
//! A cast converts a stored value into its typed form when read, and a typed
//! value back into its storage form when written.

use chrono::{DateTime, NaiveDateTime};
use quarry_core::{SqlValue, DATETIME_FORMAT};

use crate::error::{OrmError, Result};

/// Declared attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    /// 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean, stored as an integer on most engines.
    Bool,
    /// Text.
    String,
    /// JSON document.
    Json,
    /// Timestamp.
    DateTime,
}

impl Cast {
    /// Returns the cast name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Json => "json",
            Self::DateTime => "datetime",
        }
    }

    fn invalid(self, attribute: &str, message: impl Into<String>) -> OrmError {
        OrmError::InvalidCast {
            attribute: attribute.to_string(),
            cast: self.name(),
            message: message.into(),
        }
    }

    /// Converts a stored value to its typed form. `Null` stays `Null`.
    pub fn read(self, attribute: &str, value: &SqlValue) -> Result<SqlValue> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }
        let unexpected = || self.invalid(attribute, format!("unexpected value {value:?}"));
        match self {
            Self::Int => value.as_i64().map(SqlValue::Int).ok_or_else(unexpected),
            Self::Float => value.as_f64().map(SqlValue::Float).ok_or_else(unexpected),
            Self::Bool => match value {
                SqlValue::Bool(b) => Ok(SqlValue::Bool(*b)),
                SqlValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" => Ok(SqlValue::Bool(true)),
                    "0" | "false" | "" => Ok(SqlValue::Bool(false)),
                    _ => Err(unexpected()),
                },
                other => other
                    .as_i64()
                    .map(|n| SqlValue::Bool(n != 0))
                    .ok_or_else(unexpected),
            },
            Self::String => match value {
                SqlValue::Text(text) => Ok(SqlValue::Text(text.clone())),
                SqlValue::Int(n) => Ok(SqlValue::Text(n.to_string())),
                SqlValue::Float(f) => Ok(SqlValue::Text(f.to_string())),
                SqlValue::Bool(b) => Ok(SqlValue::Text(String::from(if *b { "1" } else { "0" }))),
                SqlValue::Json(json) => Ok(SqlValue::Text(json.to_string())),
                SqlValue::DateTime(dt) => Ok(SqlValue::Text(dt.format(DATETIME_FORMAT).to_string())),
                SqlValue::Blob(bytes) => String::from_utf8(bytes.clone())
                    .map(SqlValue::Text)
                    .map_err(|e| self.invalid(attribute, e.to_string())),
                SqlValue::Null => Ok(SqlValue::Null),
            },
            Self::Json => match value {
                SqlValue::Json(json) => Ok(SqlValue::Json(json.clone())),
                SqlValue::Text(text) => serde_json::from_str(text)
                    .map(SqlValue::Json)
                    .map_err(|e| self.invalid(attribute, e.to_string())),
                _ => Err(unexpected()),
            },
            Self::DateTime => match value {
                SqlValue::DateTime(dt) => Ok(SqlValue::DateTime(*dt)),
                SqlValue::Text(text) => parse_datetime(text)
                    .map(SqlValue::DateTime)
                    .ok_or_else(unexpected),
                SqlValue::Int(seconds) => DateTime::from_timestamp(*seconds, 0)
                    .map(|dt| SqlValue::DateTime(dt.naive_utc()))
                    .ok_or_else(unexpected),
                _ => Err(unexpected()),
            },
        }
    }

    /// Converts a value to its storage form. Only `Json` and `DateTime`
    /// change the value; other casts store it as given. The connection
    /// binds JSON and timestamps with the engine's own types.
    pub fn write(self, attribute: &str, value: SqlValue) -> Result<SqlValue> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }
        match self {
            Self::Json => match value {
                SqlValue::Json(json) => Ok(SqlValue::Json(json)),
                other => Ok(SqlValue::Json(serde_json::to_value(&other)?)),
            },
            Self::DateTime => self.read(attribute, &value),
            Self::Int | Self::Float | Self::Bool | Self::String => Ok(value),
        }
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_utc()))
}
