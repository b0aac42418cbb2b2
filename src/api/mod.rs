mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::engine::PolicyConfig;
use crate::llm::ModelClient;
use crate::store::SessionStore;

/// Shared dependencies for the API layer: the session store and model client
/// are trait objects so tests can swap them out.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub model: Arc<dyn ModelClient>,
    pub policy: PolicyConfig,
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Sessions
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/{id}", get(handlers::get_session))
        .route("/sessions/{id}", delete(handlers::delete_session))
        .route("/sessions/{id}/messages", post(handlers::send_message))
        .route("/sessions/{id}/summary", get(handlers::get_summary))
        .route("/sessions/{id}/analysis", post(handlers::generate_analysis))
        // Feature selection
        .route(
            "/sessions/{id}/features/{feature_id}",
            patch(handlers::set_feature_checked),
        )
        .route(
            "/sessions/{id}/features/checked",
            post(handlers::set_all_features_checked),
        )
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
