//! Catalog resources: countries, regions, producers, varietals.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

use cellar_core::model::{
    Country, NewProducer, NewRegion, Producer, ProducerUpdate, Region, RegionUpdate, Varietal,
};
use cellar_core::store::{countries, producers, regions, varietals};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/countries", get(list_countries).post(create_country))
        .route(
            "/countries/{id}",
            put(rename_country).delete(delete_country),
        )
        .route("/regions", get(list_regions).post(create_region))
        .route("/regions/{id}", put(update_region).delete(delete_region))
        .route("/producers", get(list_producers).post(create_producer))
        .route(
            "/producers/{id}",
            put(update_producer).delete(delete_producer),
        )
        .route("/varietals", get(list_varietals).post(create_varietal))
        .route(
            "/varietals/{id}",
            put(rename_varietal).delete(delete_varietal),
        )
}

#[derive(Debug, Deserialize)]
struct NamePayload {
    name: String,
}

// --- countries ---

async fn list_countries(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Country>>> {
    Ok(Json(state.with_db(countries::list)?))
}

async fn create_country(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NamePayload>,
) -> ApiResult<(StatusCode, Json<Country>)> {
    let country = state.with_db(|conn| countries::create(conn, &payload.name))?;
    Ok((StatusCode::CREATED, Json(country)))
}

async fn rename_country(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<NamePayload>,
) -> ApiResult<Json<Country>> {
    let country = state.with_db(|conn| countries::rename(conn, &id, &payload.name))?;
    Ok(Json(country))
}

async fn delete_country(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.with_db(|conn| countries::delete(conn, &id))?;
    Ok(StatusCode::NO_CONTENT)
}

// --- regions ---

#[derive(Debug, Deserialize)]
struct RegionsQuery {
    country: Option<String>,
}

async fn list_regions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegionsQuery>,
) -> ApiResult<Json<Vec<Region>>> {
    let regions = state.with_db(|conn| regions::list(conn, query.country.as_deref()))?;
    Ok(Json(regions))
}

async fn create_region(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewRegion>,
) -> ApiResult<(StatusCode, Json<Region>)> {
    let region = state.with_db(|conn| regions::create(conn, &payload))?;
    Ok((StatusCode::CREATED, Json(region)))
}

async fn update_region(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<RegionUpdate>,
) -> ApiResult<Json<Region>> {
    let region = state.with_db(|conn| regions::update(conn, &id, &payload))?;
    Ok(Json(region))
}

async fn delete_region(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.with_db(|conn| regions::delete(conn, &id))?;
    Ok(StatusCode::NO_CONTENT)
}

// --- producers ---

async fn list_producers(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Producer>>> {
    Ok(Json(state.with_db(producers::list)?))
}

async fn create_producer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewProducer>,
) -> ApiResult<(StatusCode, Json<Producer>)> {
    let producer = state.with_db(|conn| producers::create(conn, &payload))?;
    Ok((StatusCode::CREATED, Json(producer)))
}

async fn update_producer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ProducerUpdate>,
) -> ApiResult<Json<Producer>> {
    let producer = state.with_db(|conn| producers::update(conn, &id, &payload))?;
    Ok(Json(producer))
}

async fn delete_producer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.with_db(|conn| producers::delete(conn, &id))?;
    Ok(StatusCode::NO_CONTENT)
}

// --- varietals ---

async fn list_varietals(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<varietals::VarietalCount>>> {
    Ok(Json(state.with_db(varietals::list)?))
}

async fn create_varietal(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NamePayload>,
) -> ApiResult<(StatusCode, Json<Varietal>)> {
    let varietal = state.with_db(|conn| varietals::create(conn, &payload.name))?;
    Ok((StatusCode::CREATED, Json(varietal)))
}

async fn rename_varietal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<NamePayload>,
) -> ApiResult<Json<Varietal>> {
    let varietal = state.with_db(|conn| varietals::rename(conn, &id, &payload.name))?;
    Ok(Json(varietal))
}

async fn delete_varietal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.with_db(|conn| varietals::delete(conn, &id))?;
    Ok(StatusCode::NO_CONTENT)
}
