//! Record schemas and records for sqlsink
//!
//! Provides:
//! - FieldType: closed set of semantic field types
//! - RecordSchema: ordered, named, typed and nullable field list
//! - Record: one logical row bound to a destination table
//!
//! Field order is significant: it fixes both the DDL column order and the
//! DML parameter positions.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::security::validate_sql_identifier;
use crate::types::Value;

/// Semantic type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Boolean
    Boolean,
    /// Text
    String,
    /// Binary data
    Bytes,
    /// Fixed precision decimal
    Decimal {
        /// Total number of digits
        precision: u8,
        /// Digits after the decimal point
        scale: u8,
    },
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Timestamp without timezone
    Timestamp,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int8 => write!(f, "INT8"),
            Self::Int16 => write!(f, "INT16"),
            Self::Int32 => write!(f, "INT32"),
            Self::Int64 => write!(f, "INT64"),
            Self::Float32 => write!(f, "FLOAT32"),
            Self::Float64 => write!(f, "FLOAT64"),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::String => write!(f, "STRING"),
            Self::Bytes => write!(f, "BYTES"),
            Self::Decimal { precision, scale } => write!(f, "DECIMAL({},{})", precision, scale),
            Self::Date => write!(f, "DATE"),
            Self::Time => write!(f, "TIME"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// A single field of a record schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// Field (and column) name
    pub name: String,
    /// Semantic type
    pub field_type: FieldType,
    /// Whether the field may hold NULL
    pub nullable: bool,
}

impl Field {
    /// Create a required field
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
        }
    }

    /// Create an optional (nullable) field
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: true,
        }
    }
}

/// Ordered field list describing one row's shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordSchema {
    fields: Vec<Field>,
}

impl RecordSchema {
    /// Start building a schema
    pub fn builder() -> RecordSchemaBuilder {
        RecordSchemaBuilder::default()
    }

    /// Build a schema from a field list, validating names.
    ///
    /// A schema needs at least one field.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::schema("record schema must have at least one field"));
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            validate_sql_identifier(&field.name)?;
            if !seen.insert(field.name.as_str()) {
                return Err(Error::schema(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }
        Ok(Self { fields })
    }

    /// Fields in declaration order
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Builder for [`RecordSchema`]
#[derive(Debug, Default)]
pub struct RecordSchemaBuilder {
    fields: Vec<Field>,
}

impl RecordSchemaBuilder {
    /// Append a required field
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(Field::required(name, field_type));
        self
    }

    /// Append an optional field
    pub fn optional_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(Field::optional(name, field_type));
        self
    }

    /// Build the schema
    pub fn build(self) -> Result<RecordSchema> {
        RecordSchema::new(self.fields)
    }
}

/// One logical row destined for a table
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    table: String,
    schema: Arc<RecordSchema>,
    values: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record for the given table and schema
    pub fn new(table: impl Into<String>, schema: Arc<RecordSchema>) -> Self {
        Self {
            table: table.into(),
            schema,
            values: HashMap::new(),
        }
    }

    /// Set a field value.
    ///
    /// Fails if the field is unknown, the value's type does not match the
    /// field type, or NULL is put into a required field.
    pub fn put(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        let field = self.schema.field(name).ok_or_else(|| {
            Error::schema(format!("field '{}' is not part of the record schema", name))
        })?;

        if value.is_null() && !field.nullable {
            return Err(Error::schema(format!(
                "field '{}' is not nullable",
                field.name
            )));
        }
        if !value.matches(&field.field_type) {
            return Err(Error::schema(format!(
                "field '{}' expects {}, got {}",
                field.name,
                field.field_type,
                value.kind()
            )));
        }

        self.values.insert(field.name.clone(), value);
        Ok(self)
    }

    /// Destination table name
    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Record schema
    #[inline]
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Value of a field, if one was put
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}
