//! REST API Data Transfer Objects
//!
//! Request/response bodies shared by the server and the terminal client.

use serde::{Deserialize, Serialize};

use crate::database::{DatabaseError, QueryResult};
use crate::inference::GenerationResult;

/// Body of `POST /generate_sql`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Natural-language question
    pub query: String,
    /// Tables whose schema is shown to the model
    #[serde(default)]
    pub tables: Vec<String>,
}

/// Execution outcome: rows on success, `{ "error": ... }` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Rows(QueryResult),
    Error { error: String },
}

impl From<Result<QueryResult, DatabaseError>> for QueryOutcome {
    fn from(result: Result<QueryResult, DatabaseError>) -> Self {
        match result {
            Ok(rows) => QueryOutcome::Rows(rows),
            Err(e) => QueryOutcome::Error {
                error: e.to_string(),
            },
        }
    }
}

/// Response of `POST /generate_sql`
///
/// `sql_query` carries the raw model output; `execute_query` is `null` when
/// the output held no SQL fence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSqlResponse {
    pub status: String,
    pub sql_query: String,
    #[serde(default)]
    pub execute_query: Option<QueryOutcome>,
}

impl From<GenerationResult> for GenerateSqlResponse {
    fn from(result: GenerationResult) -> Self {
        Self {
            status: "success".to_string(),
            sql_query: result.response,
            execute_query: result.execution.map(QueryOutcome::from),
        }
    }
}

/// Response of `POST /get_database_schema`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SchemaResponse {
    pub fn success(schema: String) -> Self {
        Self {
            status: "success".to_string(),
            schema: Some(schema),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            schema: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Whether the schema has been introspected yet
    pub schema_cached: bool,
}

/// Error body: `{ "detail": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}
