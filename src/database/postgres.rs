//! PostgreSQL Driver
//!
//! [`DatabaseDriver`] over `tokio-postgres`. Every call opens its own
//! connection and releases it when the call returns (the connection task ends
//! once the `Client` is dropped). No pooling, no retries.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio_postgres::types::Type;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

use super::{DatabaseDriver, DatabaseError, DatabaseResult, QueryResult};
use crate::config::DatabaseConfig;
use crate::schema::{ColumnSchema, DatabaseSchema, ForeignKey, TableSchema};

const TABLES_SQL: &str = "
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_schema = 'public'
    ORDER BY table_name";

const COLUMNS_SQL: &str = "
    SELECT
        column_name::text,
        data_type::text,
        is_nullable::text,
        column_default::text
    FROM information_schema.columns
    WHERE table_schema = 'public'
    AND table_name = $1::text
    ORDER BY ordinal_position";

const PRIMARY_KEYS_SQL: &str = "
    SELECT kcu.column_name::text
    FROM information_schema.key_column_usage kcu
    WHERE kcu.table_schema = 'public'
    AND kcu.table_name = $1::text
    AND kcu.constraint_name IN (
        SELECT constraint_name
        FROM information_schema.table_constraints
        WHERE table_schema = 'public'
        AND table_name = $1::text
        AND constraint_type = 'PRIMARY KEY'
    )
    ORDER BY kcu.ordinal_position";

// Constraint names are only unique per table, so foreign keys are read from
// the catalog by relation oid, pairing local and referenced columns by position.
const FOREIGN_KEYS_SQL: &str = "
    SELECT
        local_col.attname::text,
        foreign_rel.relname::text AS foreign_table,
        foreign_col.attname::text AS foreign_column
    FROM pg_catalog.pg_constraint con
    JOIN pg_catalog.pg_class rel ON rel.oid = con.conrelid
    JOIN pg_catalog.pg_namespace nsp ON nsp.oid = rel.relnamespace
    JOIN pg_catalog.pg_class foreign_rel ON foreign_rel.oid = con.confrelid
    CROSS JOIN LATERAL unnest(con.conkey, con.confkey)
        WITH ORDINALITY AS pair(local_attnum, foreign_attnum, position)
    JOIN pg_catalog.pg_attribute local_col
        ON local_col.attrelid = con.conrelid AND local_col.attnum = pair.local_attnum
    JOIN pg_catalog.pg_attribute foreign_col
        ON foreign_col.attrelid = con.confrelid AND foreign_col.attnum = pair.foreign_attnum
    WHERE con.contype = 'f'
    AND nsp.nspname = 'public'
    AND rel.relname = $1::text
    ORDER BY con.conname, pair.position";

/// Connection parameters plus the operations the manager needs.
pub struct PostgresDriver {
    config: tokio_postgres::Config,
    /// `user@host:port/dbname`, for logs (never includes the password)
    target: String,
}

impl PostgresDriver {
    pub fn new(config: &DatabaseConfig) -> Self {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&config.host)
            .port(config.port)
            .user(&config.user)
            .dbname(&config.name)
            .application_name("text2sql");
        if !config.password.is_empty() {
            pg.password(&config.password);
        }
        if config.connect_timeout_secs > 0 {
            pg.connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        }

        Self {
            config: pg,
            target: format!(
                "{}@{}:{}/{}",
                config.user, config.host, config.port, config.name
            ),
        }
    }

    /// Open a fresh connection. It closes when the returned client is dropped.
    async fn connect(&self) -> DatabaseResult<Client> {
        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let target = self.target.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(db = %target, error = %e, "postgres_connection_error");
            }
        });

        tracing::debug!(db = %self.target, "postgres_connected");
        Ok(client)
    }

    async fn read_table(client: &Client, name: &str) -> DatabaseResult<TableSchema> {
        let mut table = TableSchema::new(name);

        for row in client.query(COLUMNS_SQL, &[&name]).await? {
            let nullable: String = row.try_get(2).map_err(introspection)?;
            table.columns.push(ColumnSchema {
                name: row.try_get(0).map_err(introspection)?,
                data_type: row.try_get(1).map_err(introspection)?,
                nullable: nullable == "YES",
                default: row.try_get(3).map_err(introspection)?,
            });
        }

        for row in client.query(PRIMARY_KEYS_SQL, &[&name]).await? {
            table
                .primary_keys
                .push(row.try_get(0).map_err(introspection)?);
        }

        for row in client.query(FOREIGN_KEYS_SQL, &[&name]).await? {
            table.foreign_keys.push(ForeignKey {
                column: row.try_get(0).map_err(introspection)?,
                referenced_table: row.try_get(1).map_err(introspection)?,
                referenced_column: row.try_get(2).map_err(introspection)?,
            });
        }

        Ok(table)
    }
}

fn introspection(err: tokio_postgres::Error) -> DatabaseError {
    DatabaseError::Introspection(err.to_string())
}

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    async fn introspect(&self) -> DatabaseResult<DatabaseSchema> {
        let client = self.connect().await?;

        let names: Vec<String> = client
            .query(TABLES_SQL, &[])
            .await?
            .iter()
            .map(|row| row.try_get(0))
            .collect::<Result<_, _>>()
            .map_err(introspection)?;

        let mut tables = Vec::with_capacity(names.len());
        for name in &names {
            tables.push(Self::read_table(&client, name).await?);
        }

        Ok(DatabaseSchema::from_tables(tables))
    }

    async fn query(&self, sql: &str) -> DatabaseResult<QueryResult> {
        let client = self.connect().await?;

        // Prepare only to learn column names and types; the rows come back as
        // text through the simple protocol so every column type can be read.
        let statement = client.prepare(sql).await?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let types: Vec<Type> = statement
            .columns()
            .iter()
            .map(|c| c.type_().clone())
            .collect();

        let mut data = Vec::new();
        for message in client.simple_query(sql).await? {
            if let SimpleQueryMessage::Row(row) = message {
                let values = (0..row.len())
                    .map(|idx| decode_text(row.get(idx), types.get(idx).unwrap_or(&Type::TEXT)))
                    .collect();
                data.push(values);
            }
        }

        Ok(QueryResult::new(columns, data))
    }
}

/// Convert a text-protocol cell into JSON according to its column type.
///
/// Values that do not parse as their declared type fall back to strings;
/// non-finite floats (`NaN`, `Infinity`) stay strings since JSON has no
/// representation for them.
pub fn decode_text(text: Option<&str>, ty: &Type) -> Value {
    let Some(text) = text else {
        return Value::Null;
    };
    let fallback = || Value::String(text.to_string());

    match *ty {
        Type::BOOL => match text {
            "t" => Value::Bool(true),
            "f" => Value::Bool(false),
            _ => fallback(),
        },
        Type::INT2 | Type::INT4 | Type::INT8 | Type::OID => {
            text.parse::<i64>().map_or_else(|_| fallback(), Value::from)
        }
        Type::FLOAT4 | Type::FLOAT8 | Type::NUMERIC => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map_or_else(fallback, Value::Number),
        Type::JSON | Type::JSONB => serde_json::from_str(text).unwrap_or_else(|_| fallback()),
        _ => fallback(),
    }
}
