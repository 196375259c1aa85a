//! Inference Service
//!
//! Turns a question plus a set of relevant tables into SQL and runs it.
//!
//! ```text
//! question + tables
//!     ↓
//! [formatted schema]   DatabaseManager::formatted_schema(tables)
//!     ↓
//! [prompt]             instructions + schema + question
//!     ↓
//! [chat template]      system turn + user turn + assistant header
//!     ↓
//! [language model]     continuation only
//!     ↓
//! [extract_sql]        last ```sql fenced block, if any
//!     ↓
//! [execute]            DatabaseManager::execute_sql_query
//! ```

pub mod chat;
pub mod extract;
pub mod model;
pub mod prompt;

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::config::ModelConfig;
use crate::database::{DatabaseError, DatabaseManager, QueryResult};

pub use chat::{ChatTemplate, Message, MessageRole};
pub use extract::extract_sql;
pub use model::{HttpCompletionModel, LanguageModel, ModelError};
pub use prompt::build_prompt;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("schema unavailable: {0}")]
    Schema(#[from] DatabaseError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Generation knobs that do not depend on the backend.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub template: ChatTemplate,
    pub system_prompt: String,
    pub max_new_tokens: usize,
}

impl From<&ModelConfig> for GenerationSettings {
    fn from(config: &ModelConfig) -> Self {
        Self {
            template: config.chat_template,
            system_prompt: config.system_prompt.clone(),
            max_new_tokens: config.max_new_tokens,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&ModelConfig::default())
    }
}

/// Outcome of one generation call.
#[derive(Debug)]
pub struct GenerationResult {
    /// Raw model output, narrative included
    pub response: String,
    /// Query found inside the SQL fence
    pub sql: Option<String>,
    /// Execution outcome, present only when a query was found
    pub execution: Option<Result<QueryResult, DatabaseError>>,
}

/// Schema retrieval and SQL generation over a database and a language model.
pub struct Text2Sql {
    database: Arc<DatabaseManager>,
    model: Arc<dyn LanguageModel>,
    settings: GenerationSettings,
    start_time: Instant,
}

impl Text2Sql {
    pub fn new(
        database: Arc<DatabaseManager>,
        model: Arc<dyn LanguageModel>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            database,
            model,
            settings,
            start_time: Instant::now(),
        }
    }

    /// Get uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.database
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Unfiltered schema text.
    pub async fn database_schema(&self) -> Result<String, DatabaseError> {
        self.database.formatted_schema(None).await
    }

    /// Ask the model for SQL answering `question` over `tables`, then run it.
    ///
    /// Execution failures are part of the result; only schema and model
    /// failures are errors.
    pub async fn generate_sql(
        &self,
        question: &str,
        tables: &[String],
    ) -> Result<GenerationResult, InferenceError> {
        let schema = self.database.formatted_schema(Some(tables)).await?;
        let user_prompt = prompt::build_prompt(&schema, question);
        let text = prompt::render_conversation(
            self.settings.template,
            &self.settings.system_prompt,
            &user_prompt,
        );

        let response = self
            .model
            .generate(&text, self.settings.max_new_tokens)
            .await?;

        let sql = extract_sql(&response).map(str::to_string);
        let execution = match &sql {
            Some(query) => Some(self.database.execute_sql_query(query).await),
            None => None,
        };

        tracing::info!(
            model = self.model.name(),
            tables = tables.len(),
            sql_found = sql.is_some(),
            executed = matches!(execution, Some(Ok(_))),
            "sql_generated"
        );

        Ok(GenerationResult {
            response,
            sql,
            execution,
        })
    }
}
