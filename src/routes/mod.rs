//! API Routes
//!
//! - `/api/chat` - Chat endpoint (JSON or server-sent event streaming)
//! - `/api/health` - Health check

pub mod chat;
pub mod health;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(chat::router(state.clone()))
        .merge(health::router(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
