//! Database Manager
//!
//! All database access goes through [`DatabaseManager`]: schema introspection
//! (cached for the lifetime of the manager), schema rendering, and execution
//! of read-only statements.
//!
//! ```text
//! DatabaseManager
//!     ├── schema cache   RwLock<Option<Arc<DatabaseSchema>>>
//!     ├── select check   lexical, before any connection is opened
//!     └── driver         Arc<dyn DatabaseDriver> (PostgresDriver in production)
//! ```
//!
//! The read-only check only looks at the first word of the statement. It is
//! not a parser and not a security boundary: a statement starting with a
//! comment is rejected, as is a `WITH ... SELECT` query.

pub mod error;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::DatabaseConfig;
use crate::schema::DatabaseSchema;

pub use error::{DatabaseError, DatabaseResult};
pub use postgres::PostgresDriver;

/// Rows returned by a read-only statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub data: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, data: Vec<Vec<serde_json::Value>>) -> Self {
        let row_count = data.len();
        Self {
            columns,
            data,
            row_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Backend that actually talks to a database.
///
/// Implementations open and release their own connection per call.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Read tables, columns, primary keys and foreign keys of the `public` namespace
    async fn introspect(&self) -> DatabaseResult<DatabaseSchema>;

    /// Run a statement that already passed [`is_read_only`]
    async fn query(&self, sql: &str) -> DatabaseResult<QueryResult>;
}

/// `true` when the trimmed, case-insensitive statement starts with `select`.
pub fn is_read_only(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"))
}

/// Schema cache plus read-only query execution over a [`DatabaseDriver`].
pub struct DatabaseManager {
    driver: Arc<dyn DatabaseDriver>,
    schema: RwLock<Option<Arc<DatabaseSchema>>>,
}

impl DatabaseManager {
    pub fn new(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self {
            driver,
            schema: RwLock::new(None),
        }
    }

    /// Manager backed by PostgreSQL with the given connection parameters.
    pub fn postgres(config: &DatabaseConfig) -> Self {
        Self::new(Arc::new(PostgresDriver::new(config)))
    }

    /// Return the cached schema, introspecting the database on first use.
    ///
    /// Failures are not cached; the next call tries again. Two callers racing
    /// on an empty cache both introspect and the last one to finish wins.
    pub async fn database_schema(&self) -> DatabaseResult<Arc<DatabaseSchema>> {
        let cached = self.schema.read().clone();
        if let Some(schema) = cached {
            return Ok(schema);
        }

        let schema = Arc::new(self.driver.introspect().await?);
        tracing::info!(
            tables = schema.tables.len(),
            relationships = schema.relationships.len(),
            "schema_introspected"
        );
        *self.schema.write() = Some(Arc::clone(&schema));
        Ok(schema)
    }

    /// Render the schema, optionally restricted to `filtered_tables`.
    pub async fn formatted_schema(
        &self,
        filtered_tables: Option<&[String]>,
    ) -> DatabaseResult<String> {
        let schema = self.database_schema().await?;
        Ok(schema.format(filtered_tables))
    }

    /// Execute `sql` if it passes the read-only check.
    ///
    /// Anything else is rejected with [`DatabaseError::UnsupportedQuery`]
    /// without opening a connection.
    pub async fn execute_sql_query(&self, sql: &str) -> DatabaseResult<QueryResult> {
        if !is_read_only(sql) {
            tracing::debug!(sql, "query_rejected");
            return Err(DatabaseError::UnsupportedQuery);
        }

        let result = self.driver.query(sql).await;
        match &result {
            Ok(rows) => tracing::debug!(row_count = rows.row_count, "query_executed"),
            Err(e) => tracing::warn!(error = %e, "query_failed"),
        }
        result
    }

    /// Drop the cached schema so the next access re-reads the catalog.
    pub fn invalidate_schema(&self) {
        *self.schema.write() = None;
    }

    /// The cached schema, without touching the database.
    pub fn cached_schema(&self) -> Option<Arc<DatabaseSchema>> {
        self.schema.read().clone()
    }
}
