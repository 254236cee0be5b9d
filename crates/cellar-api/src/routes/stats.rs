//! Statistics and tag inventory routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use cellar_core::store::{stats, tags};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(summary))
        .route("/tags", get(list_tags))
        .route("/tags/suggest", get(suggest_tags))
}

async fn summary(State(state): State<Arc<AppState>>) -> ApiResult<Json<stats::CellarStats>> {
    Ok(Json(state.with_db(stats::summary)?))
}

async fn list_tags(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<tags::TagCount>>> {
    Ok(Json(state.with_db(tags::list)?))
}

#[derive(Debug, Deserialize)]
struct SuggestQuery {
    #[serde(default)]
    q: String,
    limit: Option<u32>,
}

async fn suggest_tags(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SuggestQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let limit = query.limit.unwrap_or(10).min(50);
    Ok(Json(
        state.with_db(|conn| tags::suggest(conn, &query.q, limit))?,
    ))
}
