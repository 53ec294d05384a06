//! Connection capabilities consumed by sqlsink
//!
//! The writer never talks to a driver directly. It is handed a
//! [`DataSource`] and works through these traits:
//! - DataSource: acquire a usable connection (pool, single handle, dialer)
//! - Connection: prepare statements, read metadata, close
//! - DatabaseMetadata: product name and table lookup
//! - PreparedStatement: positional binding, batching, execution
//!
//! Implementations of [`DataSource::get_connection`] must be safe to call
//! concurrently; each writer call uses its own connection.
//!
//! An acquired connection is held in a [`ConnectionGuard`] so that it is
//! closed even when the owning future is dropped or a driver call panics.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::error::Result;
use crate::types::{TableMetadata, Value};

/// Source of database connections
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Acquire a connection.
    ///
    /// Failures should be reported as
    /// [`Error::ConnectionAcquisition`](crate::error::Error::ConnectionAcquisition).
    async fn get_connection(&self) -> Result<Box<dyn Connection>>;
}

/// A connection to a database
#[async_trait]
pub trait Connection: Send + Sync {
    /// Prepare a statement for execution
    async fn prepare_statement(&self, sql: &str) -> Result<Box<dyn PreparedStatement>>;

    /// Access connection metadata
    async fn metadata(&self) -> Result<Box<dyn DatabaseMetadata>>;

    /// Close (release) the connection
    async fn close(&self) -> Result<()>;
}

/// Metadata reported by a live connection
#[async_trait]
pub trait DatabaseMetadata: Send + Sync {
    /// Free-form database product name reported by the driver
    async fn database_product_name(&self) -> Result<String>;

    /// List tables matching the given filters.
    ///
    /// `table_types` restricts the kinds of tables reported; an empty
    /// slice means all kinds.
    async fn get_tables(
        &self,
        catalog: Option<&str>,
        schema_pattern: Option<&str>,
        table_name_pattern: &str,
        table_types: &[&str],
    ) -> Result<Vec<TableMetadata>>;
}

/// A prepared statement
#[async_trait]
pub trait PreparedStatement: Send + Sync {
    /// Bind a value (or NULL) at a 1-based parameter position
    async fn set_object(&mut self, position: usize, value: Value) -> Result<()>;

    /// Queue the currently bound parameters as one batch row
    async fn add_batch(&mut self) -> Result<()>;

    /// Execute the statement once (DDL)
    async fn execute(&mut self) -> Result<()>;

    /// Execute all queued rows, returning affected counts per row
    async fn execute_batch(&mut self) -> Result<Vec<u64>>;

    /// Close the statement
    async fn close(&mut self) -> Result<()>;

    /// Get the SQL string
    fn sql(&self) -> &str;
}

/// Owns an acquired connection until it is released.
///
/// [`ConnectionGuard::release`] closes the connection in place. A guard
/// dropped without being released (cancelled future, panic unwinding
/// through a driver call) spawns `close()` on the current Tokio runtime.
pub struct ConnectionGuard {
    conn: Arc<dyn Connection>,
    table: String,
    released: bool,
}

impl ConnectionGuard {
    /// Guard a connection acquired for work on `table`
    pub fn new(conn: Box<dyn Connection>, table: impl Into<String>) -> Self {
        Self {
            conn: Arc::from(conn),
            table: table.into(),
            released: false,
        }
    }

    /// Close the connection, logging (not returning) a close failure
    pub async fn release(mut self) {
        // Set before awaiting: a cancelled close must not be retried by Drop.
        self.released = true;
        if let Err(e) = self.conn.close().await {
            warn!(table = %self.table, error = %e, "Failed to close connection");
        }
    }
}

impl std::ops::Deref for ConnectionGuard {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref()
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let conn = Arc::clone(&self.conn);
        let table = std::mem::take(&mut self.table);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(table = %table, "Connection dropped before release, closing in background");
                handle.spawn(async move {
                    if let Err(e) = conn.close().await {
                        warn!(table = %table, error = %e, "Failed to close connection");
                    }
                });
            }
            Err(_) => {
                warn!(table = %table, "Connection dropped outside a Tokio runtime, close skipped");
            }
        }
    }
}
