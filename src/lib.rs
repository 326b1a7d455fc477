pub mod accounts;
pub mod association;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod media;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::media::MediaStore;
use crate::rate_limit::LoginRateLimiter;
use crate::state::{AppState, SharedState};

const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

pub fn build_app(pool: PgPool, config: Config) -> Router {
    let media = MediaStore::new(&config.media_root, &config.base_url, &config.media_url);
    let media_service = ServeDir::new(media.root());
    let media_url = config.media_url.clone();
    let max_upload_size = config.max_upload_size;

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        media,
        login_limiter: LoginRateLimiter::new(),
    });

    spawn_limiter_cleanup(&state);

    Router::new()
        .merge(routes::api_routes(max_upload_size))
        .nest_service(&media_url, media_service)
        .route("/health", axum::routing::get(health))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

/// Periodically evicts expired login limiter entries. Stops once the app
/// state is dropped.
fn spawn_limiter_cleanup(state: &SharedState) {
    let weak = Arc::downgrade(state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let Some(state) = weak.upgrade() else { break };
            state.login_limiter.cleanup();
        }
    });
}

async fn health() -> &'static str {
    "ok"
}
