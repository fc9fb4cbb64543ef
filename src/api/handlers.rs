//! API Handlers
//!
//! HTTP request handlers for the page server.

use std::sync::Arc;

use axum::{extract::State, http::Uri, response::Html, Json};

use crate::app::App;
use crate::config::Config;
use crate::error::Result;
use crate::models::{HealthResponse, StatsResponse};
use crate::site::demo_app;

/// Application state shared across all handlers.
///
/// Page rendering only needs `&App`; the app guards its own shared data.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<App>,
}

impl AppState {
    /// Creates a new AppState serving the given app.
    pub fn new(app: App) -> Self {
        Self { app: Arc::new(app) }
    }

    /// Creates the demo site from server configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        demo_app(config.app_config()).map(Self::new)
    }
}

/// Fallback handler: renders whatever path and query the request carries.
///
/// Browsers never send the fragment, so hash routing does not apply here.
pub async fn page_handler(State(state): State<AppState>, uri: Uri) -> Result<Html<String>> {
    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let markup = state.app.to_string(path)?;
    Ok(Html(markup))
}

/// Handler for GET /_stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.app.cache_stats().into())
}

/// Handler for GET /_health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
