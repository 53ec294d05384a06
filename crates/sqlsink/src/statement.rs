//! DDL and DML generation.
//!
//! Both generators are pure: identical inputs always yield identical text.
//! Identifiers were validated when the [`TableIdentifier`] and
//! [`RecordSchema`] were built, so they are emitted unquoted.

use crate::dialect::Dialect;
use crate::identifier::TableIdentifier;
use crate::schema::RecordSchema;

/// A parameter slot in a generated statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindPosition {
    /// 1-based parameter index
    pub index: usize,
    /// Field bound at this index
    pub field: String,
}

/// Immutable SQL text plus its ordered bind positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStatement {
    sql: String,
    bind_positions: Vec<BindPosition>,
}

impl GeneratedStatement {
    /// SQL text
    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind positions in parameter order (empty for DDL)
    #[inline]
    pub fn bind_positions(&self) -> &[BindPosition] {
        &self.bind_positions
    }

    /// Number of parameters
    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.bind_positions.len()
    }
}

/// Generate `CREATE TABLE` for a schema.
///
/// The surrogate `id` key column always comes first, followed by every
/// schema field in order, including a field that is itself named `id`.
pub fn generate_create_table(
    table: &TableIdentifier,
    schema: &RecordSchema,
    dialect: Dialect,
) -> GeneratedStatement {
    let mut columns = Vec::with_capacity(schema.len() + 1);
    columns.push(dialect.id_column_definition().to_string());

    for field in schema.fields() {
        let mut def = format!("{} {}", field.name, dialect.column_type(field.field_type));
        if !field.nullable {
            def.push_str(" NOT NULL");
        }
        columns.push(def);
    }

    GeneratedStatement {
        sql: format!("CREATE TABLE {} ({})", table, columns.join(", ")),
        bind_positions: Vec::new(),
    }
}

/// Generate a parameterized `INSERT` for a schema.
///
/// Dialect independent: `?` placeholders, one per field, in field order.
pub fn generate_insert(table: &TableIdentifier, schema: &RecordSchema) -> GeneratedStatement {
    let columns = schema.field_names().join(", ");
    let placeholders = vec!["?"; schema.len()].join(", ");

    let bind_positions = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field)| BindPosition {
            index: i + 1,
            field: field.name.clone(),
        })
        .collect();

    GeneratedStatement {
        sql: format!(
            "INSERT INTO {}({}) VALUES ({})",
            table, columns, placeholders
        ),
        bind_positions,
    }
}
