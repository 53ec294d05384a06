//! Value types for sqlsink
//!
//! Typed parameter values covering the record field types:
//! - Primitive types (bool, integers, floats)
//! - Text and binary data
//! - Logical types (decimal, date, time, timestamp)
//! - SQL NULL

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::FieldType;

/// SQL value bound to a statement parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean value
    Bool(bool),
    /// 8-bit signed integer
    Int8(i8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit floating point
    Float32(f32),
    /// 64-bit floating point
    Float64(f64),
    /// Arbitrary precision decimal
    Decimal(Decimal),
    /// Text string
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Date without time
    Date(NaiveDate),
    /// Time without date
    Time(NaiveTime),
    /// Timestamp without timezone
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Check if value is NULL
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value's kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOLEAN",
            Self::Int8(_) => "INT8",
            Self::Int16(_) => "INT16",
            Self::Int32(_) => "INT32",
            Self::Int64(_) => "INT64",
            Self::Float32(_) => "FLOAT32",
            Self::Float64(_) => "FLOAT64",
            Self::Decimal(_) => "DECIMAL",
            Self::String(_) => "STRING",
            Self::Bytes(_) => "BYTES",
            Self::Date(_) => "DATE",
            Self::Time(_) => "TIME",
            Self::Timestamp(_) => "TIMESTAMP",
        }
    }

    /// Whether this value can be stored in a field of the given type.
    ///
    /// NULL matches every type; nullability is checked separately.
    pub fn matches(&self, field_type: &FieldType) -> bool {
        matches!(
            (self, field_type),
            (Self::Null, _)
                | (Self::Bool(_), FieldType::Boolean)
                | (Self::Int8(_), FieldType::Int8)
                | (Self::Int16(_), FieldType::Int16)
                | (Self::Int32(_), FieldType::Int32)
                | (Self::Int64(_), FieldType::Int64)
                | (Self::Float32(_), FieldType::Float32)
                | (Self::Float64(_), FieldType::Float64)
                | (Self::Decimal(_), FieldType::Decimal { .. })
                | (Self::String(_), FieldType::String)
                | (Self::Bytes(_), FieldType::Bytes)
                | (Self::Date(_), FieldType::Date)
                | (Self::Time(_), FieldType::Time)
                | (Self::Timestamp(_), FieldType::Timestamp)
        )
    }

    /// Try to convert to bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to convert to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int8(n) => Some(i64::from(*n)),
            Self::Int16(n) => Some(i64::from(*n)),
            Self::Int32(n) => Some(i64::from(*n)),
            Self::Int64(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to convert to string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Self::Null,
        }
    }
}

/// A table row as reported by connection metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    /// Catalog, when the driver reports one
    pub catalog: Option<String>,
    /// Schema qualifier
    pub schema: Option<String>,
    /// Table name
    pub name: String,
    /// Table type (TABLE, VIEW, ...)
    pub table_type: String,
}

impl TableMetadata {
    /// Create table metadata for a plain table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
            table_type: "TABLE".into(),
        }
    }

    /// Set the schema qualifier
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Get fully qualified name
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(s) => format!("{}.{}", s, self.name),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int32(0).is_null());
    }

    #[test]
    fn test_value_from_impl() {
        let v: Value = 42_i32.into();
        assert!(matches!(v, Value::Int32(42)));

        let v: Value = 1_234_567_890_i64.into();
        assert!(matches!(v, Value::Int64(1_234_567_890)));

        let v: Value = "hello".into();
        assert!(matches!(v, Value::String(s) if s == "hello"));

        let v: Value = None::<i32>.into();
        assert!(v.is_null());
    }

    #[test]
    fn test_value_matches_field_type() {
        assert!(Value::Int32(1).matches(&FieldType::Int32));
        assert!(!Value::Int32(1).matches(&FieldType::Int64));
        assert!(Value::Null.matches(&FieldType::String));
        assert!(Value::Decimal(Decimal::new(1050, 2)).matches(&FieldType::Decimal {
            precision: 10,
            scale: 2
        }));
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int16(7).as_i64(), Some(7));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Float64(1.0).as_i64(), None);
    }

    #[test]
    fn test_table_metadata() {
        let table = TableMetadata::new("users").with_schema("public");
        assert_eq!(table.qualified_name(), "public.users");
        assert_eq!(table.table_type, "TABLE");
    }
}
