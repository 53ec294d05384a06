//! Testing utilities for sqlsink
//!
//! [`MockDataSource`] is an in-memory data source that records every call
//! made through the connection capabilities, so writer behavior can be
//! verified without a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlsink::testing::{Call, MockDataSource};
//!
//! let ds = Arc::new(MockDataSource::new("PostgreSQL").with_existing_table("users"));
//! let writer = TableWriter::new(ds.clone());
//! writer.insert("users", &records).await?;
//!
//! assert_eq!(ds.count(|c| matches!(c, Call::ExecuteBatch { .. })), 1);
//! assert_eq!(ds.connections_closed(), 1);
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::connection::{Connection, DataSource, DatabaseMetadata, PreparedStatement};
use crate::error::{Error, Result};
use crate::types::{TableMetadata, Value};

/// A call observed by the mock
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Call {
    /// `DataSource::get_connection`
    GetConnection,
    /// `DatabaseMetadata::database_product_name`
    ProductName,
    /// `DatabaseMetadata::get_tables`
    GetTables {
        catalog: Option<String>,
        schema: Option<String>,
        table: String,
        types: Vec<String>,
    },
    /// `Connection::prepare_statement`
    Prepare { sql: String },
    /// `PreparedStatement::set_object`
    SetObject {
        sql: String,
        position: usize,
        value: Value,
    },
    /// `PreparedStatement::add_batch`
    AddBatch { sql: String },
    /// `PreparedStatement::execute`
    Execute { sql: String },
    /// `PreparedStatement::execute_batch`
    ExecuteBatch { sql: String, rows: usize },
    /// `PreparedStatement::close`
    CloseStatement { sql: String },
    /// `Connection::close`
    CloseConnection,
}

#[derive(Debug, Default, Clone, Copy)]
struct Failures {
    acquire: bool,
    product_name: bool,
    get_tables: bool,
    prepare: bool,
    set_object: bool,
    execute: bool,
    execute_batch: bool,
    close_statement: bool,
    close_connection: bool,
    panic_execute_batch: bool,
    hang_execute_batch: bool,
}

#[derive(Debug)]
struct MockState {
    product_name: Mutex<String>,
    tables: Mutex<HashSet<String>>,
    failures: Mutex<Failures>,
    calls: Mutex<Vec<Call>>,
}

impl MockState {
    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn failures(&self) -> Failures {
        *self.failures.lock()
    }
}

/// Recording in-memory data source
#[derive(Debug, Clone)]
pub struct MockDataSource {
    state: Arc<MockState>,
}

impl MockDataSource {
    /// Create a mock reporting the given database product name
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            state: Arc::new(MockState {
                product_name: Mutex::new(product_name.into()),
                tables: Mutex::new(HashSet::new()),
                failures: Mutex::new(Failures::default()),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Report a table as existing (`schema.table` or `table`)
    pub fn with_existing_table(self, name: impl Into<String>) -> Self {
        self.state.tables.lock().insert(name.into());
        self
    }

    /// Fail every connection acquisition
    pub fn failing_acquire(self) -> Self {
        self.state.failures.lock().acquire = true;
        self
    }

    /// Fail product name lookups
    pub fn failing_product_name(self) -> Self {
        self.state.failures.lock().product_name = true;
        self
    }

    /// Fail table existence lookups
    pub fn failing_get_tables(self) -> Self {
        self.state.failures.lock().get_tables = true;
        self
    }

    /// Fail statement preparation
    pub fn failing_prepare(self) -> Self {
        self.state.failures.lock().prepare = true;
        self
    }

    /// Fail parameter binding
    pub fn failing_set_object(self) -> Self {
        self.state.failures.lock().set_object = true;
        self
    }

    /// Fail single executions (DDL)
    pub fn failing_execute(self) -> Self {
        self.state.failures.lock().execute = true;
        self
    }

    /// Fail batch executions (DML)
    pub fn failing_execute_batch(self) -> Self {
        self.state.failures.lock().execute_batch = true;
        self
    }

    /// Fail statement close
    pub fn failing_close_statement(self) -> Self {
        self.state.failures.lock().close_statement = true;
        self
    }

    /// Fail connection close
    pub fn failing_close(self) -> Self {
        self.state.failures.lock().close_connection = true;
        self
    }

    /// Panic inside batch execution
    pub fn panicking_execute_batch(self) -> Self {
        self.state.failures.lock().panic_execute_batch = true;
        self
    }

    /// Never complete batch execution
    pub fn hanging_execute_batch(self) -> Self {
        self.state.failures.lock().hang_execute_batch = true;
        self
    }

    fn failures(&self) -> Failures {
        *self.state.failures.lock()
    }

    /// Change the reported product name
    pub fn set_product_name(&self, name: impl Into<String>) {
        *self.state.product_name.lock() = name.into();
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().clone()
    }

    /// Number of recorded calls matching a predicate
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.calls.lock().iter().filter(|c| pred(c)).count()
    }

    /// SQL texts passed to `prepare_statement`, in order
    pub fn prepared_sql(&self) -> Vec<String> {
        self.state
            .calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Prepare { sql } => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    /// `(position, value)` pairs bound on statements with the given SQL
    pub fn bound_values(&self, sql: &str) -> Vec<(usize, Value)> {
        self.state
            .calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::SetObject {
                    sql: s,
                    position,
                    value,
                } if s == sql => Some((*position, value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Connections handed out
    pub fn connections_acquired(&self) -> usize {
        self.count(|c| matches!(c, Call::GetConnection))
    }

    /// Connections closed
    pub fn connections_closed(&self) -> usize {
        self.count(|c| matches!(c, Call::CloseConnection))
    }

    /// Whether the mock currently knows the table
    pub fn has_table(&self, name: &str) -> bool {
        self.state.tables.lock().contains(name)
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn get_connection(&self) -> Result<Box<dyn Connection>> {
        if self.failures().acquire {
            return Err(Error::connection_acquisition("mock: connection refused"));
        }
        self.state.record(Call::GetConnection);
        Ok(Box::new(MockConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockConnection {
    state: Arc<MockState>,
}

#[async_trait]
impl Connection for MockConnection {
    async fn prepare_statement(&self, sql: &str) -> Result<Box<dyn PreparedStatement>> {
        self.state.record(Call::Prepare {
            sql: sql.to_string(),
        });
        if self.state.failures().prepare {
            return Err(Error::execution(sql, "mock: prepare failed"));
        }
        Ok(Box::new(MockStatement {
            sql: sql.to_string(),
            state: Arc::clone(&self.state),
            rows: 0,
        }))
    }

    async fn metadata(&self) -> Result<Box<dyn DatabaseMetadata>> {
        Ok(Box::new(MockMetadata {
            state: Arc::clone(&self.state),
        }))
    }

    async fn close(&self) -> Result<()> {
        self.state.record(Call::CloseConnection);
        if self.state.failures().close_connection {
            return Err(Error::connection("mock: close failed"));
        }
        Ok(())
    }
}

struct MockMetadata {
    state: Arc<MockState>,
}

#[async_trait]
impl DatabaseMetadata for MockMetadata {
    async fn database_product_name(&self) -> Result<String> {
        self.state.record(Call::ProductName);
        if self.state.failures().product_name {
            return Err(Error::metadata("mock: product name unavailable"));
        }
        Ok(self.state.product_name.lock().clone())
    }

    async fn get_tables(
        &self,
        catalog: Option<&str>,
        schema_pattern: Option<&str>,
        table_name_pattern: &str,
        table_types: &[&str],
    ) -> Result<Vec<TableMetadata>> {
        self.state.record(Call::GetTables {
            catalog: catalog.map(str::to_string),
            schema: schema_pattern.map(str::to_string),
            table: table_name_pattern.to_string(),
            types: table_types.iter().map(|t| t.to_string()).collect(),
        });
        if self.state.failures().get_tables {
            return Err(Error::metadata("mock: table lookup failed"));
        }

        let key = match schema_pattern {
            Some(schema) => format!("{}.{}", schema, table_name_pattern),
            None => table_name_pattern.to_string(),
        };
        if !self.state.tables.lock().contains(&key) {
            return Ok(Vec::new());
        }

        let mut table = TableMetadata::new(table_name_pattern);
        table.schema = schema_pattern.map(str::to_string);
        Ok(vec![table])
    }
}

struct MockStatement {
    sql: String,
    state: Arc<MockState>,
    rows: usize,
}

#[async_trait]
impl PreparedStatement for MockStatement {
    async fn set_object(&mut self, position: usize, value: Value) -> Result<()> {
        self.state.record(Call::SetObject {
            sql: self.sql.clone(),
            position,
            value,
        });
        if self.state.failures().set_object {
            return Err(Error::execution(&self.sql, "mock: unsupported parameter type"));
        }
        Ok(())
    }

    async fn add_batch(&mut self) -> Result<()> {
        self.rows += 1;
        self.state.record(Call::AddBatch {
            sql: self.sql.clone(),
        });
        Ok(())
    }

    async fn execute(&mut self) -> Result<()> {
        self.state.record(Call::Execute {
            sql: self.sql.clone(),
        });
        if self.state.failures().execute {
            return Err(Error::execution(&self.sql, "mock: execution failed"));
        }

        // CREATE TABLE <name> (...)
        if let Some(name) = self
            .sql
            .strip_prefix("CREATE TABLE ")
            .and_then(|rest| rest.split_whitespace().next())
        {
            self.state.tables.lock().insert(name.to_string());
        }
        Ok(())
    }

    async fn execute_batch(&mut self) -> Result<Vec<u64>> {
        self.state.record(Call::ExecuteBatch {
            sql: self.sql.clone(),
            rows: self.rows,
        });
        let failures = self.state.failures();
        if failures.panic_execute_batch {
            panic!("mock: driver panicked in execute_batch");
        }
        if failures.hang_execute_batch {
            std::future::pending::<()>().await;
        }
        if failures.execute_batch {
            return Err(Error::execution(&self.sql, "mock: batch failed"));
        }
        let counts = vec![1; self.rows];
        self.rows = 0;
        Ok(counts)
    }

    async fn close(&mut self) -> Result<()> {
        self.state.record(Call::CloseStatement {
            sql: self.sql.clone(),
        });
        if self.state.failures().close_statement {
            return Err(Error::execution(&self.sql, "mock: statement close failed"));
        }
        Ok(())
    }

    fn sql(&self) -> &str {
        &self.sql
    }
}
