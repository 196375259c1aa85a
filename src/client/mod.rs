//! Terminal front end
//!
//! Library half of `text2sql-client`: the HTTP client for the inference
//! service, the table-selection panel, submission validation, and output
//! formatting. The binary only wires these into a rustyline loop.
//!
//! ```text
//! .schema / .reload  → ApiClient::database_schema → SchemaPanel::parse
//! .toggle 2 orders   → SchemaPanel::toggle
//! <question>         → submit → validate → ApiClient::generate_sql → render_answer
//! ```

pub mod command;
pub mod format;
pub mod panel;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::protocol::rest::dto::{
    ErrorDetail, GenerateSqlResponse, HealthDto, QueryRequest, SchemaResponse,
};

pub use command::Command;
pub use format::{render_answer, render_table};
pub use panel::{SchemaPanel, TableEntry};

/// Failures talking to the inference service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The service could not be reached or did not answer in time
    #[error("Connection Error: {0}")]
    Connection(String),

    /// The service answered with an error status or an unreadable body
    #[error("Backend Error: {0}")]
    Backend(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Backend(format!("invalid response: {err}"))
        } else {
            ClientError::Connection(err.to_string())
        }
    }
}

/// Local validation failures; nothing is sent when one of these is raised.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitWarning {
    #[error("Please enter a question")]
    EmptyQuestion,

    #[error("Please select relevant tables")]
    NoTablesSelected,
}

/// Check a submission before any request is made.
pub fn validate_submission(question: &str, selected: &[String]) -> Result<(), SubmitWarning> {
    if question.trim().is_empty() {
        return Err(SubmitWarning::EmptyQuestion);
    }
    if selected.is_empty() {
        return Err(SubmitWarning::NoTablesSelected);
    }
    Ok(())
}

/// What happened to a submitted question.
#[derive(Debug)]
pub enum SubmitOutcome {
    Warning(SubmitWarning),
    Failed(ClientError),
    Answered(GenerateSqlResponse),
}

/// HTTP client for the inference service.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        ApiClient {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.server, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Backend(backend_detail(status, &body)));
        }
        Ok(response.json().await?)
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    pub async fn health(&self) -> Result<HealthDto, ClientError> {
        let response = self.client.get(self.url("/health")).send().await?;
        Self::decode(response).await
    }

    pub async fn database_schema(&self) -> Result<SchemaResponse, ClientError> {
        self.post("/get_database_schema", &serde_json::json!({}))
            .await
    }

    pub async fn generate_sql(
        &self,
        request: &QueryRequest,
    ) -> Result<GenerateSqlResponse, ClientError> {
        self.post("/generate_sql", request).await
    }

    /// Validate, then ask the service. Never panics on service failures.
    pub async fn submit(&self, question: &str, panel: &SchemaPanel) -> SubmitOutcome {
        let tables = panel.selected_names();
        if let Err(warning) = validate_submission(question, &tables) {
            return SubmitOutcome::Warning(warning);
        }

        let request = QueryRequest {
            query: question.trim().to_string(),
            tables,
        };
        match self.generate_sql(&request).await {
            Ok(response) => SubmitOutcome::Answered(response),
            Err(e) => SubmitOutcome::Failed(e),
        }
    }
}

/// `detail` from a `{"detail": ...}` body, else the status line.
fn backend_detail(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorDetail>(body) {
        Ok(err) => err.detail,
        Err(_) => status.to_string(),
    }
}
