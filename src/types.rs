//! Core type definitions
//!
//! Includes column data types and the scalar values the generator escapes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::sql::sanitize::escape_string;

// ============================================================================
// Column Data Types
// ============================================================================

/// Column type descriptor with MySQL rendering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataType {
    /// Maps to TINYINT(1)
    Boolean,

    /// Maps to INTEGER, optionally UNSIGNED
    Integer {
        #[serde(default)]
        unsigned: bool,
    },

    /// Maps to BIGINT, optionally UNSIGNED
    BigInt {
        #[serde(default)]
        unsigned: bool,
    },

    Float,

    /// Maps to DOUBLE PRECISION
    Double,

    /// Fixed-point number (maps to DECIMAL)
    Decimal {
        #[serde(default = "default_precision")]
        precision: u8,
        #[serde(default = "default_scale")]
        scale: u8,
    },

    /// Variable-length string (maps to VARCHAR, default length 255)
    String {
        #[serde(default = "default_length")]
        length: u32,
        #[serde(default)]
        binary: bool,
    },

    /// Fixed-length string (maps to CHAR)
    Char {
        #[serde(default = "default_length")]
        length: u32,
        #[serde(default)]
        binary: bool,
    },

    Text,

    Blob,

    Json,

    Date,

    /// Maps to DATETIME, with optional fractional seconds precision
    DateTime {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        precision: Option<u8>,
    },

    Time,

    /// Maps to CHAR(36) BINARY
    Uuid,

    /// Enumerated strings (maps to ENUM('a', 'b'))
    Enum { values: Vec<String> },

    Geometry,

    /// Verbatim type text for anything not covered above
    Custom { sql: String },
}

fn default_precision() -> u8 {
    10
}

fn default_scale() -> u8 {
    0
}

fn default_length() -> u32 {
    255
}

impl DataType {
    pub fn integer() -> Self {
        DataType::Integer { unsigned: false }
    }

    pub fn decimal(precision: u8, scale: u8) -> Self {
        DataType::Decimal { precision, scale }
    }

    pub fn string(length: u32) -> Self {
        DataType::String {
            length,
            binary: false,
        }
    }

    pub fn date_time() -> Self {
        DataType::DateTime { precision: None }
    }

    pub fn custom(sql: impl Into<String>) -> Self {
        DataType::Custom { sql: sql.into() }
    }

    /// Convert the descriptor to MySQL column type text
    pub fn to_sql(&self) -> String {
        match self {
            DataType::Boolean => "TINYINT(1)".to_string(),
            DataType::Integer { unsigned } => with_unsigned("INTEGER", *unsigned),
            DataType::BigInt { unsigned } => with_unsigned("BIGINT", *unsigned),
            DataType::Float => "FLOAT".to_string(),
            DataType::Double => "DOUBLE PRECISION".to_string(),
            DataType::Decimal { precision, scale } => format!("DECIMAL({},{})", precision, scale),
            DataType::String { length, binary } => {
                with_binary(format!("VARCHAR({})", length), *binary)
            }
            DataType::Char { length, binary } => with_binary(format!("CHAR({})", length), *binary),
            DataType::Text => "TEXT".to_string(),
            DataType::Blob => "BLOB".to_string(),
            DataType::Json => "JSON".to_string(),
            DataType::Date => "DATE".to_string(),
            DataType::DateTime { precision: None } => "DATETIME".to_string(),
            DataType::DateTime {
                precision: Some(fsp),
            } => format!("DATETIME({})", fsp),
            DataType::Time => "TIME".to_string(),
            DataType::Uuid => "CHAR(36) BINARY".to_string(),
            DataType::Enum { values } => format!(
                "ENUM({})",
                values
                    .iter()
                    .map(|v| escape_string(v))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            DataType::Geometry => "GEOMETRY".to_string(),
            DataType::Custom { sql } => sql.clone(),
        }
    }

    /// BLOB, TEXT, GEOMETRY and JSON columns (and binary strings) cannot
    /// carry a DEFAULT clause in MySQL
    pub fn accepts_default(&self) -> bool {
        !matches!(
            self,
            DataType::Text
                | DataType::Blob
                | DataType::Geometry
                | DataType::Json
                | DataType::String { binary: true, .. }
                | DataType::Char { binary: true, .. }
        )
    }
}

fn with_unsigned(base: &str, unsigned: bool) -> String {
    if unsigned {
        format!("{} UNSIGNED", base)
    } else {
        base.to_string()
    }
}

fn with_binary(base: String, binary: bool) -> String {
    if binary { format!("{} BINARY", base) } else { base }
}

// ============================================================================
// Scalar Values
// ============================================================================

/// A value embedded into generated SQL as an escaped literal
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    /// A JSON document rendered as its serialized text
    Json(serde_json::Value),
    /// Operand list for IN / NOT IN
    List(Vec<SqlValue>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Dates and date-times, which compare through a temporal cast
    pub fn is_temporal(&self) -> bool {
        matches!(self, SqlValue::Date(_) | SqlValue::DateTime(_))
    }

    /// Convert to a JSON value (dates become ISO-8601 strings)
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SqlValue::Null => serde_json::Value::Null,
            SqlValue::Bool(b) => serde_json::Value::Bool(*b),
            SqlValue::Integer(i) => serde_json::Value::from(*i),
            SqlValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SqlValue::Decimal(d) => serde_json::Value::String(d.to_string()),
            SqlValue::String(s) => serde_json::Value::String(s.clone()),
            SqlValue::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            SqlValue::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            SqlValue::Json(v) => v.clone(),
            SqlValue::List(items) => {
                serde_json::Value::Array(items.iter().map(SqlValue::to_json).collect())
            }
        }
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SqlValue::Null,
            serde_json::Value::Bool(b) => SqlValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    // Above i64::MAX; f64 would round it
                    SqlValue::Decimal(Decimal::from(u))
                } else {
                    n.as_f64()
                        .map(SqlValue::Float)
                        .unwrap_or_else(|| SqlValue::String(n.to_string()))
                }
            }
            serde_json::Value::String(s) => SqlValue::String(s),
            serde_json::Value::Array(items) => {
                SqlValue::List(items.into_iter().map(SqlValue::from).collect())
            }
            object @ serde_json::Value::Object(_) => SqlValue::Json(object),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::String(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::String(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(value.into())
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<Decimal> for SqlValue {
    fn from(value: Decimal) -> Self {
        SqlValue::Decimal(value)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Date(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::DateTime(value)
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for SqlValue {
    fn from(values: Vec<T>) -> Self {
        SqlValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SqlValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(SqlValue::from)
    }
}
