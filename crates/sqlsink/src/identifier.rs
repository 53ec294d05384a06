//! Destination table identifiers.
//!
//! A table name arrives as an opaque, possibly dot-qualified string
//! (`schema.table` or `table`). The writer needs both forms: the full text
//! for DDL/DML and the (schema, table) pair for the metadata existence
//! query.

use std::fmt;

use crate::error::Result;
use crate::security::validate_sql_identifier;

/// A validated, possibly schema-qualified table name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdentifier {
    schema: Option<String>,
    table: String,
}

impl TableIdentifier {
    /// Parse a table identifier.
    ///
    /// The name is split at its last dot: `a.b.c` has schema qualifier
    /// `a.b` and bare table `c`. Every dot-separated part must be a valid
    /// identifier.
    ///
    /// Identifiers are emitted unquoted, so only plain ASCII names are
    /// accepted (see [`validate_sql_identifier`]). Quoted names, names
    /// with spaces or non-ASCII letters are rejected even where the target
    /// database would accept them in quotes.
    pub fn parse(name: &str) -> Result<Self> {
        let (schema, table) = match name.rsplit_once('.') {
            Some((schema, table)) => (Some(schema), table),
            None => (None, name),
        };

        if let Some(schema) = schema {
            for part in schema.split('.') {
                validate_sql_identifier(part)?;
            }
        }
        validate_sql_identifier(table)?;

        Ok(Self {
            schema: schema.map(str::to_string),
            table: table.to_string(),
        })
    }

    /// Schema qualifier, if any
    #[inline]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Bare table name
    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Full name as used in statements
    pub fn qualified_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.table),
            None => write!(f, "{}", self.table),
        }
    }
}

impl std::str::FromStr for TableIdentifier {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
