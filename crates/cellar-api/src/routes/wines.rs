//! Wine catalog routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

use cellar_core::model::{NewWine, Wine, WineColour, WineUpdate};
use cellar_core::store::wines;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/wines", get(list).post(create))
        .route("/wines/{id}", get(fetch).put(update).delete(delete))
        .route("/wines/{id}/varietals", put(replace_varietals))
}

#[derive(Debug, Deserialize)]
struct WinesQuery {
    colour: Option<String>,
    producer: Option<String>,
}

async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WinesQuery>,
) -> ApiResult<Json<Vec<Wine>>> {
    let colour = query
        .colour
        .as_deref()
        .map(str::parse::<WineColour>)
        .transpose()
        .map_err(ApiError)?;
    let result =
        state.with_db(|conn| wines::list(conn, colour, query.producer.as_deref()))?;
    Ok(Json(result))
}

async fn fetch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Wine>> {
    Ok(Json(state.with_db(|conn| wines::get(conn, &id))?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewWine>,
) -> ApiResult<(StatusCode, Json<Wine>)> {
    let wine = state.with_db(|conn| wines::create(conn, &payload))?;
    Ok((StatusCode::CREATED, Json(wine)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<WineUpdate>,
) -> ApiResult<Json<Wine>> {
    Ok(Json(
        state.with_db(|conn| wines::update(conn, &id, &payload))?,
    ))
}

/// Replaces the wine's whole varietal set with the posted list of names.
async fn replace_varietals(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(names): Json<Vec<String>>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(
        state.with_db(|conn| wines::set_varietals(conn, &id, &names))?,
    ))
}

async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.with_db(|conn| wines::delete(conn, &id))?;
    Ok(StatusCode::NO_CONTENT)
}
