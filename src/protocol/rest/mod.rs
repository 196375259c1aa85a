//! HTTP API Module
//!
//! Routes:
//!
//! - `POST /generate_sql`: question + tables in, model output + rows out
//! - `POST /get_database_schema`: full formatted schema
//! - `GET /health`: liveness and schema cache state
//! - `GET /`: embedded single-page UI (when enabled)

pub mod dto;
pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::HttpConfig;
use crate::inference::Text2Sql;

use self::handlers::{admin, generate, schema};

fn cors_layer(config: &HttpConfig) -> Option<CorsLayer> {
    if !config.cors_origins.is_empty() {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|s| {
                let parsed = s.parse();
                if parsed.is_err() {
                    tracing::warn!(origin = %s, "invalid_cors_origin_ignored");
                }
                parsed.ok()
            })
            .collect();
        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else if config.cors_allow_all {
        Some(CorsLayer::permissive())
    } else {
        // same-origin only
        None
    }
}

/// Creates the Axum router
pub fn create_router(service: Arc<Text2Sql>, config: &HttpConfig) -> Router {
    let mut app = Router::new()
        .route("/health", get(admin::health))
        .route("/generate_sql", post(generate::generate_sql))
        .route("/get_database_schema", post(schema::get_database_schema));

    if config.ui_enabled {
        app = app.route("/", get(admin::index));
    }

    app = app.layer(Extension(service));

    if let Some(cors) = cors_layer(config) {
        app = app.layer(cors);
    }

    app
}

/// Starts the HTTP server with graceful shutdown support.
///
/// Listens for SIGINT (ctrl-c) and SIGTERM; in-flight requests finish before
/// the call returns.
pub async fn start_http_server(
    service: Arc<Text2Sql>,
    config: &HttpConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(service, config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(%addr, ui = config.ui_enabled, "http_server_listening");

    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4()?
    } else {
        tokio::net::TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(1024)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("http_server_stopped");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl_c_handler_unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "sigterm_handler_unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!(signal = "SIGINT", "shutting_down"),
        () = terminate => tracing::info!(signal = "SIGTERM", "shutting_down"),
    }
}
