//! SQL dialects for sqlsink
//!
//! A [`Dialect`] is resolved from the product name a live connection
//! reports and parameterizes DDL generation: the surrogate key column and
//! the SQL type of each field. The set is closed; product names that do
//! not map to a variant fail with
//! [`Error::UnsupportedDialect`](crate::error::Error::UnsupportedDialect)
//! instead of falling back to a default.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::schema::FieldType;

/// Length used for STRING columns
pub const STRING_COLUMN_LENGTH: u32 = 255;

/// Supported database dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// PostgreSQL
    Postgres,
    /// IBM Db2 (LUW, z/OS, i)
    Db2,
    /// MySQL and MariaDB
    MySql,
    /// Microsoft SQL Server
    SqlServer,
}

impl Dialect {
    /// All supported dialects
    pub const ALL: [Dialect; 4] = [
        Dialect::Postgres,
        Dialect::Db2,
        Dialect::MySql,
        Dialect::SqlServer,
    ];

    /// Map a driver-reported product name to a dialect.
    ///
    /// Matching is case-insensitive on the name's prefix, e.g.
    /// `PostgreSQL`, `DB2/LINUXX8664`, `MariaDB`, `Microsoft SQL Server`.
    pub fn from_product_name(product_name: &str) -> Result<Self> {
        let name = product_name.trim().to_ascii_uppercase();

        if name.starts_with("POSTGRES") {
            Ok(Self::Postgres)
        } else if name.starts_with("DB2") {
            Ok(Self::Db2)
        } else if name.starts_with("MYSQL") || name.starts_with("MARIADB") {
            Ok(Self::MySql)
        } else if name.starts_with("MICROSOFT SQL SERVER") || name.starts_with("SQL SERVER") {
            Ok(Self::SqlServer)
        } else {
            Err(Error::unsupported_dialect(product_name))
        }
    }

    /// Resolve the dialect of a live connection from its metadata.
    ///
    /// Not cached: each connection may target a different product.
    pub async fn resolve(conn: &dyn Connection) -> Result<Self> {
        let metadata = conn.metadata().await?;
        let product_name = metadata.database_product_name().await?;
        let dialect = Self::from_product_name(&product_name)?;
        debug!(product = %product_name, dialect = %dialect, "Resolved SQL dialect");
        Ok(dialect)
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres => "PostgreSQL",
            Self::Db2 => "DB2",
            Self::MySql => "MySQL",
            Self::SqlServer => "SQL Server",
        }
    }

    /// Definition of the surrogate `id` primary key column
    pub fn id_column_definition(&self) -> &'static str {
        match self {
            Self::Postgres => "id SERIAL PRIMARY KEY",
            Self::Db2 => "id INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY",
            Self::MySql => "id INTEGER AUTO_INCREMENT PRIMARY KEY",
            Self::SqlServer => "id INTEGER IDENTITY(1,1) PRIMARY KEY",
        }
    }

    /// Native column type for a field type
    pub fn column_type(&self, field_type: FieldType) -> String {
        match field_type {
            FieldType::Int8 => match self {
                Self::MySql => "TINYINT".to_string(),
                _ => "SMALLINT".to_string(),
            },
            FieldType::Int16 => "SMALLINT".to_string(),
            FieldType::Int32 => "INTEGER".to_string(),
            FieldType::Int64 => "BIGINT".to_string(),
            FieldType::Float32 => match self {
                Self::MySql => "FLOAT".to_string(),
                _ => "REAL".to_string(),
            },
            FieldType::Float64 => match self {
                Self::Postgres => "DOUBLE PRECISION".to_string(),
                Self::Db2 | Self::MySql => "DOUBLE".to_string(),
                Self::SqlServer => "FLOAT".to_string(),
            },
            FieldType::Boolean => match self {
                Self::SqlServer => "BIT".to_string(),
                _ => "BOOLEAN".to_string(),
            },
            FieldType::String => format!("VARCHAR({})", STRING_COLUMN_LENGTH),
            FieldType::Bytes => match self {
                Self::Postgres => "BYTEA".to_string(),
                Self::Db2 | Self::MySql => "BLOB".to_string(),
                Self::SqlServer => "VARBINARY(MAX)".to_string(),
            },
            FieldType::Decimal { precision, scale } => match self {
                Self::Postgres => format!("NUMERIC({},{})", precision, scale),
                _ => format!("DECIMAL({},{})", precision, scale),
            },
            FieldType::Date => "DATE".to_string(),
            FieldType::Time => "TIME".to_string(),
            FieldType::Timestamp => match self {
                Self::SqlServer => "DATETIME2".to_string(),
                _ => "TIMESTAMP".to_string(),
            },
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
