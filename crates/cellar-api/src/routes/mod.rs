//! HTTP route handlers, grouped by resource.

pub mod bottles;
pub mod catalog;
pub mod interchange;
pub mod stats;
pub mod wines;
pub mod wishlist;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::state::AppState;

/// All resource routes that sit behind the auth middleware.
pub fn protected() -> Router<Arc<AppState>> {
    Router::new()
        .merge(catalog::router())
        .merge(wines::router())
        .merge(bottles::router())
        .merge(wishlist::router())
        .merge(stats::router())
        .merge(interchange::router())
}

pub async fn health() -> &'static str {
    "ok"
}

pub fn health_router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
