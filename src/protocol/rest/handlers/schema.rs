//! Schema Handler

use std::sync::Arc;

use axum::{Extension, Json};

use crate::inference::Text2Sql;
use crate::protocol::rest::dto::SchemaResponse;

/// `POST /get_database_schema`
///
/// Always answers 200; a database failure is reported in the body.
pub async fn get_database_schema(
    Extension(service): Extension<Arc<Text2Sql>>,
) -> Json<SchemaResponse> {
    match service.database_schema().await {
        Ok(schema) => Json(SchemaResponse::success(schema)),
        Err(e) => {
            tracing::warn!(error = %e, "schema_unavailable");
            Json(SchemaResponse::error(e.to_string()))
        }
    }
}
