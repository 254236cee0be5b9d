//! Bottle inventory routes, including consume and the move to the wishlist.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use cellar_core::model::{BottleDetails, BottleUpdate, NewBottle, WineColour, WishlistDetails};
use cellar_core::store::{
    bottles::{self, BottleFilter, BottleSort},
    moves,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bottles", get(list).post(create))
        .route("/bottles/{id}", get(fetch).put(update).delete(delete))
        .route("/bottles/{id}/consume", post(consume))
        .route("/bottles/{id}/move-to-wishlist", post(move_to_wishlist))
}

#[derive(Debug, Deserialize)]
struct BottlesQuery {
    colour: Option<String>,
    country: Option<String>,
    region: Option<String>,
    producer: Option<String>,
    varietal: Option<String>,
    tag: Option<String>,
    q: Option<String>,
    #[serde(default)]
    in_stock: bool,
    sort: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl BottlesQuery {
    fn into_filter(self) -> Result<BottleFilter, cellar_core::Error> {
        let colour = self
            .colour
            .as_deref()
            .map(str::parse::<WineColour>)
            .transpose()?;
        let sort = self
            .sort
            .as_deref()
            .map(str::parse::<BottleSort>)
            .transpose()?
            .unwrap_or_default();
        Ok(BottleFilter {
            colour,
            country_id: self.country,
            region_id: self.region,
            producer_id: self.producer,
            varietal: self.varietal,
            tag: self.tag,
            search: self.q,
            in_stock_only: self.in_stock,
            limit: self.limit,
            offset: self.offset,
            sort,
        })
    }
}

async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BottlesQuery>,
) -> ApiResult<Json<Vec<BottleDetails>>> {
    let filter = query.into_filter().map_err(ApiError)?;
    Ok(Json(state.with_db(|conn| bottles::list(conn, &filter))?))
}

async fn fetch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<BottleDetails>> {
    Ok(Json(state.with_db(|conn| bottles::get(conn, &id))?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewBottle>,
) -> ApiResult<(StatusCode, Json<BottleDetails>)> {
    let bottle = state.with_db(|conn| bottles::create(conn, &payload))?;
    Ok((StatusCode::CREATED, Json(bottle)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<BottleUpdate>,
) -> ApiResult<Json<BottleDetails>> {
    Ok(Json(
        state.with_db(|conn| bottles::update(conn, &id, &payload))?,
    ))
}

async fn consume(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<BottleDetails>> {
    Ok(Json(state.with_db(|conn| bottles::consume(conn, &id))?))
}

/// The body is optional; omitted fields fall back to the bottle's own price
/// and tags.
async fn move_to_wishlist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    options: Option<Json<moves::StashOptions>>,
) -> ApiResult<Json<WishlistDetails>> {
    let options = options.map(|Json(options)| options).unwrap_or_default();
    Ok(Json(
        state.with_db(|conn| moves::bottle_to_wishlist(conn, &id, &options))?,
    ))
}

async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.with_db(|conn| bottles::delete(conn, &id))?;
    Ok(StatusCode::NO_CONTENT)
}
