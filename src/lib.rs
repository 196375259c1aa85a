//! # Text2SQL
//!
//! Natural-language questions in, PostgreSQL results out.
//!
//! ## Pipeline Architecture
//!
//! ```text
//! question + selected tables
//!     ↓
//! [DatabaseManager]     → cached schema, filtered to the selection
//!     ↓
//! [Prompt + template]   → chat-formatted instruction prompt
//!     ↓
//! [LanguageModel]       → narrative + ```sql fenced query
//!     ↓
//! [extract_sql]         → query text (or nothing)
//!     ↓
//! [execute_sql_query]   → rows, or an inline error for non-select
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use text2sql::{Config, DatabaseManager, GenerationSettings, HttpCompletionModel, Text2Sql};
//!
//! let config = Config::load()?;
//! let database = Arc::new(DatabaseManager::postgres(&config.database));
//! let model = Arc::new(HttpCompletionModel::new(&config.model));
//! let service = Text2Sql::new(database, model, GenerationSettings::from(&config.model));
//!
//! let result = service
//!     .generate_sql("How many orders per customer?", &["orders".to_string()])
//!     .await?;
//! println!("{}", result.response);
//! ```
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `schema` | Schema model and text rendering |
//! | `database` | Introspection, schema cache, read-only execution |
//! | `inference` | Prompting, model backends, SQL extraction |
//! | `protocol` | HTTP API and browser UI |
//! | `client` | Terminal front end |
//! | `config` | Layered configuration |
//! | `logging` | Tracing subscriber setup |

pub mod client;
pub mod config;
pub mod database;
pub mod inference;
pub mod logging;
pub mod protocol;
pub mod schema;

pub use config::Config;
pub use database::{DatabaseDriver, DatabaseError, DatabaseManager, PostgresDriver, QueryResult};
pub use inference::{
    extract_sql, GenerationResult, GenerationSettings, HttpCompletionModel, InferenceError,
    LanguageModel, ModelError, Text2Sql,
};
pub use schema::{ColumnSchema, DatabaseSchema, ForeignKey, Relationship, TableSchema};
