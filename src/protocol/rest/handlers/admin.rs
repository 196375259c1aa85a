//! Admin Handlers
//!
//! Health check and the embedded UI page.

use std::sync::Arc;

use axum::{response::Html, Extension, Json};

use crate::inference::Text2Sql;
use crate::protocol::rest::dto::HealthDto;

/// Health check endpoint
pub async fn health(Extension(service): Extension<Arc<Text2Sql>>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: service.uptime_seconds(),
        schema_cached: service.database().cached_schema().is_some(),
    })
}

/// Single-page question/answer UI
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../ui.html"))
}
