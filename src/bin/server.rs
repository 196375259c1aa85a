//! Text2SQL Server Binary
//!
//! Serves the SQL generation API and the browser UI.
//!
//! ## Usage
//!
//! ```bash
//! # Start server with default settings (0.0.0.0:8000)
//! cargo run --bin text2sql-server
//!
//! # Custom address and config file
//! cargo run --bin text2sql-server -- --host 127.0.0.1 --port 9000 --config prod.toml
//! ```
//!
//! Database settings come from `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_HOST`
//! and `DB_PORT` (a `.env` file is read first) or from the `[database]` section.

use std::sync::Arc;

use clap::Parser;

use text2sql::logging::init_tracing;
use text2sql::protocol::rest;
use text2sql::{Config, DatabaseManager, GenerationSettings, HttpCompletionModel, Text2Sql};

/// Text-to-SQL inference service
#[derive(Parser, Debug)]
#[command(name = "text2sql-server", version, about, long_about = None)]
struct Args {
    /// Bind address (overrides http.host)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides http.port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file (default: config.toml + config.local.toml)
    #[arg(short, long)]
    config: Option<String>,
}

fn load_config(path: Option<&str>) -> Config {
    let loaded = match path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("WARNING: Invalid configuration ({e}), using defaults");
        Config::default()
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let _ = dotenvy::dotenv();
    let mut config = load_config(args.config.as_deref());

    // Initialize tracing using config as fallback when env vars are not set
    init_tracing(&config.logging);

    if let Some(host) = args.host {
        config.http.host = host;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }

    let database = Arc::new(DatabaseManager::postgres(&config.database));
    let model = Arc::new(HttpCompletionModel::new(&config.model));

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        db_host = %config.database.host,
        db_port = config.database.port,
        db_name = %config.database.name,
        model = %config.model.name,
        model_url = %model.url(),
        template = %config.model.chat_template,
        "server_starting"
    );

    let service = Arc::new(Text2Sql::new(
        database,
        model,
        GenerationSettings::from(&config.model),
    ));

    rest::start_http_server(service, &config.http).await?;

    Ok(())
}
