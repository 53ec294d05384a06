//! Table writer: auto-DDL plus batched inserts
//!
//! Provides:
//! - TableWriter: creates the destination table when missing, then writes
//!   a batch of records as one prepared-statement batch execution
//! - TableWriterConfig: serde/validator configuration
//! - WriteStats: counters for written records and created tables
//!
//! Each call is self-contained: acquire a connection, act, and release the
//! connection on every exit path. Prepared statements are closed before the
//! connection is released. The connection is held in a [`ConnectionGuard`],
//! so a cancelled or panicking call still closes it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use validator::{Validate, ValidationError};

use crate::connection::{Connection, ConnectionGuard, DataSource, PreparedStatement};
use crate::dialect::Dialect;
use crate::error::{Error, ErrorCategory, Result};
use crate::identifier::TableIdentifier;
use crate::schema::{Record, RecordSchema};
use crate::statement::{generate_create_table, generate_insert, GeneratedStatement};
use crate::types::Value;

/// Table writer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct TableWriterConfig {
    /// Check for the destination table and create it when missing
    #[serde(default = "default_true")]
    pub auto_create: bool,

    /// Fail a batch whose records do not all share the first record's schema
    #[serde(default)]
    pub reject_mixed_schemas: bool,

    /// Table types passed to the metadata existence lookup
    #[serde(default = "default_table_types")]
    #[validate(length(min = 1), custom(function = "validate_table_types"))]
    pub table_types: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_table_types() -> Vec<String> {
    vec!["TABLE".to_string()]
}

fn validate_table_types(types: &[String]) -> std::result::Result<(), ValidationError> {
    if types.iter().any(|t| t.trim().is_empty()) {
        return Err(ValidationError::new("empty_table_type"));
    }
    Ok(())
}

impl Default for TableWriterConfig {
    fn default() -> Self {
        Self {
            auto_create: true,
            reject_mixed_schemas: false,
            table_types: default_table_types(),
        }
    }
}

impl TableWriterConfig {
    /// Enable/disable table auto-creation
    pub fn with_auto_create(mut self, enabled: bool) -> Self {
        self.auto_create = enabled;
        self
    }

    /// Enable/disable rejection of mixed-schema batches
    pub fn with_reject_mixed_schemas(mut self, enabled: bool) -> Self {
        self.reject_mixed_schemas = enabled;
        self
    }

    /// Set the table types used by the existence lookup
    pub fn with_table_types(mut self, types: Vec<String>) -> Self {
        self.table_types = types;
        self
    }
}

/// Writer statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Records submitted in successful batches
    pub records_written: u64,
    /// Successful batch executions
    pub batches_written: u64,
    /// Failed insert calls
    pub batches_failed: u64,
    /// Tables created by the writer
    pub tables_created: u64,
}

/// Atomic writer statistics
#[derive(Debug, Default)]
#[allow(missing_docs)]
pub struct AtomicWriteStats {
    pub records_written: AtomicU64,
    pub batches_written: AtomicU64,
    pub batches_failed: AtomicU64,
    pub tables_created: AtomicU64,
}

impl AtomicWriteStats {
    /// Record a successful batch
    pub fn record_batch(&self, records: u64) {
        self.records_written.fetch_add(records, Ordering::Relaxed);
        self.batches_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed batch
    pub fn record_failure(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a created table
    pub fn record_table_created(&self) {
        self.tables_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot
    pub fn snapshot(&self) -> WriteStats {
        WriteStats {
            records_written: self.records_written.load(Ordering::Relaxed),
            batches_written: self.batches_written.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            tables_created: self.tables_created.load(Ordering::Relaxed),
        }
    }
}

/// Writes record batches into relational tables
pub struct TableWriter {
    data_source: Arc<dyn DataSource>,
    config: TableWriterConfig,
    stats: AtomicWriteStats,
}

impl std::fmt::Debug for TableWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableWriter")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl TableWriter {
    /// Create a writer with the default configuration
    pub fn new(data_source: Arc<dyn DataSource>) -> Self {
        Self {
            data_source,
            config: TableWriterConfig::default(),
            stats: AtomicWriteStats::default(),
        }
    }

    /// Create a writer with a validated configuration
    pub fn with_config(data_source: Arc<dyn DataSource>, config: TableWriterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(format!("invalid table writer config: {}", e)))?;

        Ok(Self {
            data_source,
            config,
            stats: AtomicWriteStats::default(),
        })
    }

    /// Writer configuration
    #[inline]
    pub fn config(&self) -> &TableWriterConfig {
        &self.config
    }

    /// Snapshot of writer statistics
    pub fn stats(&self) -> WriteStats {
        self.stats.snapshot()
    }

    /// Create a table for the given schema.
    ///
    /// Always issues `CREATE TABLE`; calling it for an existing table is
    /// the caller's responsibility to avoid.
    pub async fn create_table(&self, table: &str, schema: &RecordSchema) -> Result<()> {
        let table = TableIdentifier::parse(table)?;
        let conn = self.acquire(&table).await?;

        let result = async {
            let dialect = Self::resolve_dialect(&*conn, &table).await?;
            Self::execute_create(&*conn, &table, schema, dialect).await
        }
        .await;

        conn.release().await;

        if result.is_ok() {
            self.stats.record_table_created();
        }
        result
    }

    /// Check whether a table exists using connection metadata
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let table = TableIdentifier::parse(table)?;
        let conn = self.acquire(&table).await?;
        let result = self.table_exists_on(&*conn, &table).await;
        conn.release().await;
        result
    }

    /// Insert a batch of records into one table.
    ///
    /// All records must share the schema of the first record; it drives
    /// both the CREATE TABLE (when the table is missing) and the INSERT.
    /// A missing value binds SQL NULL. An empty batch is a no-op and does
    /// not acquire a connection.
    pub async fn insert(&self, table: &str, records: &[Record]) -> Result<()> {
        let Some(first) = records.first() else {
            debug!(table = %table, "Empty batch, nothing to insert");
            return Ok(());
        };

        let table = TableIdentifier::parse(table)?;
        let schema = Arc::clone(first.schema());

        if self.config.reject_mixed_schemas {
            if let Some(index) = records.iter().position(|r| r.schema() != &schema) {
                return Err(Error::SchemaMismatch {
                    table: table.to_string(),
                    index,
                });
            }
        }

        let conn = self.acquire(&table).await?;
        let result = self
            .insert_on(&*conn, &table, &schema, records)
            .await;
        conn.release().await;

        match &result {
            Ok(created) => {
                if *created {
                    self.stats.record_table_created();
                }
                self.stats.record_batch(records.len() as u64);
            }
            Err(e) => {
                self.stats.record_failure();
                error!(table = %table, records = records.len(), error = %e, "Insert failed");
            }
        }

        result.map(|_| ())
    }

    /// Write records that may target different tables.
    ///
    /// Records are grouped by their own table name, keeping first-seen
    /// order, and each group is inserted with [`TableWriter::insert`].
    /// Stops at the first failing group; earlier groups stay written.
    pub async fn write(&self, records: Vec<Record>) -> Result<()> {
        let mut groups: Vec<(String, Vec<Record>)> = Vec::new();
        for record in records {
            match groups.iter_mut().find(|(t, _)| t == record.table()) {
                Some((_, group)) => group.push(record),
                None => groups.push((record.table().to_string(), vec![record])),
            }
        }

        for (table, group) in &groups {
            self.insert(table, group).await?;
        }
        Ok(())
    }

    async fn acquire(&self, table: &TableIdentifier) -> Result<ConnectionGuard> {
        let conn = self.data_source.get_connection().await.map_err(|e| match e {
            e @ Error::ConnectionAcquisition { .. } => e,
            other => Error::ConnectionAcquisition {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        })?;
        Ok(ConnectionGuard::new(conn, table.to_string()))
    }

    async fn resolve_dialect(conn: &dyn Connection, table: &TableIdentifier) -> Result<Dialect> {
        Dialect::resolve(conn)
            .await
            .map_err(|e| e.in_context(&table.to_string(), None))
    }

    async fn close_statement(mut stmt: Box<dyn PreparedStatement>, table: &TableIdentifier) {
        if let Err(e) = stmt.close().await {
            warn!(table = %table, sql = %stmt.sql(), error = %e, "Failed to close statement");
        }
    }

    async fn table_exists_on(&self, conn: &dyn Connection, table: &TableIdentifier) -> Result<bool> {
        let types: Vec<&str> = self.config.table_types.iter().map(String::as_str).collect();
        let tables = async {
            let metadata = conn.metadata().await?;
            metadata
                .get_tables(None, table.schema(), table.table(), &types)
                .await
        }
        .await
        .map_err(|e| e.in_context(&table.to_string(), None))?;

        let exists = !tables.is_empty();
        debug!(table = %table, exists, "Checked table existence");
        Ok(exists)
    }

    /// Returns whether the table had to be created.
    async fn insert_on(
        &self,
        conn: &dyn Connection,
        table: &TableIdentifier,
        schema: &RecordSchema,
        records: &[Record],
    ) -> Result<bool> {
        let mut created = false;
        if self.config.auto_create && !self.table_exists_on(conn, table).await? {
            let dialect = Self::resolve_dialect(conn, table).await?;
            Self::execute_create(conn, table, schema, dialect).await?;
            created = true;
        }

        let stmt = generate_insert(table, schema);
        debug!(table = %table, sql = %stmt.sql(), records = records.len(), "Prepared insert");

        let mut prepared = conn
            .prepare_statement(stmt.sql())
            .await
            .map_err(|e| e.in_context(&table.to_string(), None))?;

        let outcome = Self::bind_and_execute(&mut *prepared, &stmt, table, schema, records)
            .await
            .map_err(|e| e.in_context(&table.to_string(), None));

        Self::close_statement(prepared, table).await;
        outcome.map(|_| created)
    }

    async fn execute_create(
        conn: &dyn Connection,
        table: &TableIdentifier,
        schema: &RecordSchema,
        dialect: Dialect,
    ) -> Result<()> {
        let stmt = generate_create_table(table, schema, dialect);
        debug!(table = %table, dialect = %dialect, sql = %stmt.sql(), "Creating table");

        let name = table.to_string();
        let mut prepared = conn
            .prepare_statement(stmt.sql())
            .await
            .map_err(|e| e.in_context(&name, Some(dialect)))?;

        let outcome = prepared
            .execute()
            .await
            .map_err(|e| e.in_context(&name, Some(dialect)));

        Self::close_statement(prepared, table).await;
        outcome?;

        info!(table = %table, dialect = %dialect, "Created table");
        Ok(())
    }

    async fn bind_and_execute(
        prepared: &mut dyn PreparedStatement,
        stmt: &GeneratedStatement,
        table: &TableIdentifier,
        schema: &RecordSchema,
        records: &[Record],
    ) -> Result<()> {
        for (row, record) in records.iter().enumerate() {
            for (pos, field) in stmt.bind_positions().iter().zip(schema.fields()) {
                let value = record.get(&pos.field).cloned().unwrap_or(Value::Null);
                if !value.matches(&field.field_type) {
                    return Err(Error::Binding {
                        table: table.to_string(),
                        field: field.name.clone(),
                        position: pos.index,
                        message: format!(
                            "record {} holds {} for a {} field",
                            row,
                            value.kind(),
                            field.field_type
                        ),
                    });
                }
                prepared
                    .set_object(pos.index, value)
                    .await
                    .map_err(|e| match e {
                        e @ Error::Binding { .. } => e,
                        e if e.category() == ErrorCategory::Connection => e,
                        other => Error::Binding {
                            table: table.to_string(),
                            field: field.name.clone(),
                            position: pos.index,
                            message: other.to_string(),
                        },
                    })?;
            }
            prepared.add_batch().await?;
            trace!(table = %table, row, "Queued batch row");
        }

        let counts = prepared.execute_batch().await?;
        debug!(
            table = %table,
            rows = records.len(),
            affected = counts.iter().sum::<u64>(),
            "Executed insert batch"
        );
        Ok(())
    }
}
