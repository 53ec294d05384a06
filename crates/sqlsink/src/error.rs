//! Error types for sqlsink
//!
//! Every failure of a write surfaces as [`Error`], carrying enough context
//! (table, dialect, SQL) for the caller to log or re-raise. Classification
//! via [`ErrorCategory`] lets a retry wrapper decide what to replay; the
//! writer itself never retries.

use std::fmt;
use thiserror::Error;

use crate::dialect::Dialect;

/// Result type for sqlsink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection could not be acquired or was lost (retriable)
    Connection,
    /// Database product is not supported
    Dialect,
    /// Statement execution failed at the driver
    Execution,
    /// A value could not be bound to a parameter
    Binding,
    /// Metadata lookup failed
    Metadata,
    /// Configuration or identifier error
    Configuration,
    /// Records do not agree on a schema
    Schema,
}

impl ErrorCategory {
    /// Whether errors in this category are generally retriable
    #[inline]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Connection)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "connection"),
            Self::Dialect => write!(f, "dialect"),
            Self::Execution => write!(f, "execution"),
            Self::Binding => write!(f, "binding"),
            Self::Metadata => write!(f, "metadata"),
            Self::Configuration => write!(f, "configuration"),
            Self::Schema => write!(f, "schema"),
        }
    }
}

/// Main error type for sqlsink
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// The data source could not produce a connection
    #[error("connection acquisition failed: {message}")]
    ConnectionAcquisition {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Connection-level failure after acquisition (lost link, close failure)
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Product name did not map to a supported dialect
    #[error("unsupported database dialect: '{product_name}'{}", table_suffix(.table))]
    UnsupportedDialect {
        product_name: String,
        table: Option<String>,
    },

    /// DDL or DML execution failed
    #[error("statement execution failed on table {table}{}: {message} [sql: {sql}]", dialect_suffix(.dialect))]
    StatementExecution {
        table: String,
        dialect: Option<Dialect>,
        sql: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A value could not be bound at a parameter position
    #[error("cannot bind field '{field}' at position {position} for table {table}: {message}")]
    Binding {
        table: String,
        field: String,
        position: usize,
        message: String,
    },

    /// Metadata query failed
    #[error("metadata error{}: {message}", table_suffix(.table))]
    Metadata {
        message: String,
        table: Option<String>,
    },

    /// Identifier rejected before it reached any SQL text
    #[error("invalid identifier '{identifier}': {message}")]
    InvalidIdentifier { identifier: String, message: String },

    /// Record or schema construction error
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Batch records do not share one schema
    #[error("schema mismatch in batch for table {table}: record {index} differs from the first record")]
    SchemaMismatch { table: String, index: usize },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

fn table_suffix(table: &Option<String>) -> String {
    match table {
        Some(t) => format!(" for table {}", t),
        None => String::new(),
    }
}

fn dialect_suffix(dialect: &Option<Dialect>) -> String {
    match dialect {
        Some(d) => format!(" ({})", d),
        None => String::new(),
    }
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConnectionAcquisition { .. } | Self::Connection { .. } => {
                ErrorCategory::Connection
            }
            Self::UnsupportedDialect { .. } => ErrorCategory::Dialect,
            Self::StatementExecution { .. } => ErrorCategory::Execution,
            Self::Binding { .. } => ErrorCategory::Binding,
            Self::Metadata { .. } => ErrorCategory::Metadata,
            Self::InvalidIdentifier { .. } | Self::Configuration { .. } => {
                ErrorCategory::Configuration
            }
            Self::Schema { .. } | Self::SchemaMismatch { .. } => ErrorCategory::Schema,
        }
    }

    /// Whether this error is retriable
    #[inline]
    pub fn is_retriable(&self) -> bool {
        self.category().is_retriable()
    }

    /// Create a connection acquisition error
    pub fn connection_acquisition(message: impl Into<String>) -> Self {
        Self::ConnectionAcquisition {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection acquisition error with source
    pub fn connection_acquisition_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConnectionAcquisition {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create an unsupported dialect error
    pub fn unsupported_dialect(product_name: impl Into<String>) -> Self {
        Self::UnsupportedDialect {
            product_name: product_name.into(),
            table: None,
        }
    }

    /// Create a statement execution error without table context.
    ///
    /// Drivers raise this; the writer fills in table and dialect via
    /// [`Error::in_context`].
    pub fn execution(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StatementExecution {
            table: String::new(),
            dialect: None,
            sql: sql.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a metadata error
    pub fn metadata(message: impl Into<String>) -> Self {
        Self::Metadata {
            message: message.into(),
            table: None,
        }
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Attach table (and, for execution errors, dialect) context.
    ///
    /// Fills in only what the raising layer left empty. Variants that
    /// already name their table, or carry no table at all, pass through.
    pub fn in_context(self, table: &str, dialect: Option<Dialect>) -> Self {
        match self {
            Self::StatementExecution {
                table: t,
                dialect: d,
                sql,
                message,
                source,
            } => Self::StatementExecution {
                table: if t.is_empty() { table.to_string() } else { t },
                dialect: d.or(dialect),
                sql,
                message,
                source,
            },
            Self::Binding {
                table: t,
                field,
                position,
                message,
            } => Self::Binding {
                table: if t.is_empty() { table.to_string() } else { t },
                field,
                position,
                message,
            },
            Self::UnsupportedDialect {
                product_name,
                table: t,
            } => Self::UnsupportedDialect {
                product_name,
                table: t.or_else(|| Some(table.to_string())),
            },
            Self::Metadata { message, table: t } => Self::Metadata {
                message,
                table: t.or_else(|| Some(table.to_string())),
            },
            other => other,
        }
    }
}
