//! API Routes
//!
//! Configures the Axum router for the page server.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, page_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /_health` - Health check endpoint
/// - `GET /_stats` - Instance cache statistics
/// - everything else - rendered by the app
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/_health", get(health_handler))
        .route("/_stats", get(stats_handler))
        .fallback(page_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
