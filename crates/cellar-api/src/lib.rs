//! HTTP API for the cellar wine inventory.
//!
//! Everything under `/api` except the session routes sits behind the
//! password-cookie middleware; `/health` is always open. With guest mode
//! enabled, GET routes are readable without a session.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    middleware,
    routing::get,
};
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use cellar_core::config::Config;
use state::AppState;

/// Build the full application router for the given state.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = routes::protected().layer(middleware::from_fn_with_state(
        state.clone(),
        session::require_session,
    ));

    let api = Router::new()
        .route(
            "/session",
            get(session::status)
                .post(session::login)
                .delete(session::logout),
        )
        .merge(protected);

    Router::new()
        .merge(routes::health_router())
        .nest("/api", api)
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

/// Open the database, bind, and serve until SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the listener cannot
/// bind.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let conn = cellar_core::db::open_store(&config.database.path)?;
    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(conn, config);
    let app = router(state);

    let listener = TcpListener::bind(&address).await?;
    tracing::info!("listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        ctrl_c().await.expect("install Ctrl+C handler");
        tracing::info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
        tracing::info!("received SIGTERM, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}
