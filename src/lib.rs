// Scholar Search - multi-persona assistant for academic literature search

pub mod agents;
pub mod config;
pub mod llm;
pub mod models;
pub mod routes;
pub mod tools;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
