//! Tracing setup shared by the binaries.
//!
//! Environment variables take precedence over the `[logging]` section:
//!
//! - `TEXT2SQL_LOG_LEVEL`, then `RUST_LOG`: filter directives
//! - `TEXT2SQL_LOG_JSON`: `1` for JSON lines, `0` for compact text
//! - `TEXT2SQL_LOG_FILE`: append to this file through a non-blocking writer
//!   instead of writing to stderr

use std::env;
use std::sync::OnceLock;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

static TRACE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Filter directives: explicit level, then `RUST_LOG`, then config.
fn resolve_level(
    explicit: Option<String>,
    rust_log: Option<String>,
    config: &LoggingConfig,
) -> String {
    let non_blank = |v: &String| !v.trim().is_empty();
    explicit
        .filter(non_blank)
        .or_else(|| rust_log.filter(non_blank))
        .unwrap_or_else(|| config.level.clone())
}

fn resolve_json(explicit: Option<String>, config: &LoggingConfig) -> bool {
    explicit.map_or_else(|| config.format.eq_ignore_ascii_case("json"), |v| v != "0")
}

fn make_writer() -> (BoxMakeWriter, bool) {
    let Ok(log_path) = env::var("TEXT2SQL_LOG_FILE") else {
        return (BoxMakeWriter::new(std::io::stderr), true);
    };

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = TRACE_GUARD.set(guard);
            (BoxMakeWriter::new(non_blocking), false)
        }
        Err(e) => {
            eprintln!("ERROR: Unable to open TEXT2SQL_LOG_FILE '{log_path}': {e}");
            (BoxMakeWriter::new(std::io::stderr), true)
        }
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_tracing(config: &LoggingConfig) {
    let level = resolve_level(
        env::var("TEXT2SQL_LOG_LEVEL").ok(),
        env::var("RUST_LOG").ok(),
        config,
    );
    let json = resolve_json(env::var("TEXT2SQL_LOG_JSON").ok(), config);
    let (writer, ansi) = make_writer();

    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_writer(writer)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if json {
        Box::new(builder.json().finish())
    } else {
        Box::new(builder.compact().finish())
    };

    let _ = tracing::subscriber::set_global_default(subscriber);
}
