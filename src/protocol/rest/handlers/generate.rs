//! SQL Generation Handler

use std::sync::Arc;

use axum::{Extension, Json};
use tracing::Instrument;
use uuid::Uuid;

use crate::inference::Text2Sql;
use crate::protocol::rest::dto::{GenerateSqlResponse, QueryRequest};
use crate::protocol::rest::error::RestError;

/// `POST /generate_sql`
///
/// Execution errors travel inside `execute_query`; schema or model failures
/// become a 500 with a generic detail.
pub async fn generate_sql(
    Extension(service): Extension<Arc<Text2Sql>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<GenerateSqlResponse>, RestError> {
    let span = tracing::info_span!(
        "generate_sql",
        request_id = %Uuid::new_v4(),
        tables = request.tables.len()
    );

    async move {
        match service.generate_sql(&request.query, &request.tables).await {
            Ok(result) => Ok(Json(GenerateSqlResponse::from(result))),
            Err(e) => {
                tracing::error!(error = %e, "generation_failed");
                Err(RestError::internal())
            }
        }
    }
    .instrument(span)
    .await
}
