//! CSV export and import over HTTP.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use cellar_core::csv::{self, ImportReport};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/export.csv", get(export))
        .route("/import", post(import))
}

async fn export(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let mut buffer = Vec::new();
    let rows = state.with_db(|conn| csv::export(conn, &mut buffer))?;
    tracing::info!(rows, "csv export served");

    let mut response = buffer.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    response.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        header::HeaderValue::from_static("attachment; filename=\"cellar.csv\""),
    );
    Ok(response)
}

/// Takes the raw CSV file as the request body. Returns 200 with the report
/// even when some rows were rejected; only a broken header fails the call.
async fn import(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<(StatusCode, Json<ImportReport>)> {
    let report = state.with_db(|conn| csv::import(conn, body.as_bytes()))?;
    Ok((StatusCode::OK, Json(report)))
}
