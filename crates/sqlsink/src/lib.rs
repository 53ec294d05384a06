//! # sqlsink
//!
//! Schema-driven relational table writer.
//!
//! Given a typed record schema and a batch of records, sqlsink makes sure
//! the destination table exists (dialect-appropriate `CREATE TABLE`) and
//! writes the batch with one parameterized `INSERT` executed as a single
//! batch round trip. Connections come from a pluggable [`DataSource`].
//!
//! ## Features
//!
//! - **Auto-DDL**: table existence via connection metadata, CREATE TABLE
//!   with a surrogate `id` key when missing
//! - **Dialects**: PostgreSQL, DB2, MySQL/MariaDB, SQL Server, resolved per
//!   connection from the reported product name
//! - **Batched inserts**: positional binding in schema field order, SQL NULL
//!   for missing optional values
//! - **Guaranteed release**: statements and connections are closed on
//!   every path
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sqlsink::prelude::*;
//!
//! let schema = Arc::new(
//!     RecordSchema::builder()
//!         .field("user_id", FieldType::Int32)
//!         .field("username", FieldType::String)
//!         .optional_field("email", FieldType::String)
//!         .build()?,
//! );
//!
//! let record = Record::new("app.accounts", schema)
//!     .put("user_id", 1)?
//!     .put("username", "John")?;
//!
//! let writer = TableWriter::new(data_source);
//! writer.insert("app.accounts", &[record]).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod connection;
pub mod dialect;
pub mod error;
pub mod identifier;
pub mod schema;
pub mod security;
pub mod statement;
pub mod testing;
pub mod types;
pub mod writer;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{Error, ErrorCategory, Result};

    // Values and records
    pub use crate::schema::{Field, FieldType, Record, RecordSchema, RecordSchemaBuilder};
    pub use crate::types::{TableMetadata, Value};

    // Connection capabilities
    pub use crate::connection::{Connection, DataSource, DatabaseMetadata, PreparedStatement};

    // SQL generation
    pub use crate::dialect::Dialect;
    pub use crate::identifier::TableIdentifier;
    pub use crate::statement::{
        generate_create_table, generate_insert, BindPosition, GeneratedStatement,
    };

    // Writer
    pub use crate::writer::{TableWriter, TableWriterConfig, WriteStats};
}

// Re-export commonly used items at crate root
pub use connection::DataSource;
pub use error::{Error, Result};
pub use types::Value;
pub use writer::TableWriter;
