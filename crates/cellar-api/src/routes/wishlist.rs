//! Wishlist routes, including the move into the cellar.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;

use cellar_core::model::{BottleDetails, NewWishlistItem, WineColour, WishlistDetails, WishlistUpdate};
use cellar_core::store::{moves, wishlist};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/wishlist", get(list).post(create))
        .route("/wishlist/{id}", put(update).delete(delete))
        .route("/wishlist/{id}/move-to-cellar", post(move_to_cellar))
}

#[derive(Debug, Deserialize)]
struct WishlistQuery {
    colour: Option<String>,
    tag: Option<String>,
}

async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WishlistQuery>,
) -> ApiResult<Json<Vec<WishlistDetails>>> {
    let colour = query
        .colour
        .as_deref()
        .map(str::parse::<WineColour>)
        .transpose()
        .map_err(ApiError)?;
    let items = state.with_db(|conn| wishlist::list(conn, colour, query.tag.as_deref()))?;
    Ok(Json(items))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewWishlistItem>,
) -> ApiResult<(StatusCode, Json<WishlistDetails>)> {
    let item = state.with_db(|conn| wishlist::create(conn, &payload))?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<WishlistUpdate>,
) -> ApiResult<Json<WishlistDetails>> {
    Ok(Json(
        state.with_db(|conn| wishlist::update(conn, &id, &payload))?,
    ))
}

async fn move_to_cellar(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(options): Json<moves::AcquireOptions>,
) -> ApiResult<Json<BottleDetails>> {
    Ok(Json(state.with_db(|conn| {
        moves::wishlist_to_cellar(conn, &id, &options)
    })?))
}

async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.with_db(|conn| wishlist::delete(conn, &id))?;
    Ok(StatusCode::NO_CONTENT)
}
