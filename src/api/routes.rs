use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::registry::Registry;
use crate::validator::Validator;

use super::handlers::{create_short_url, health_check, index, AppState};

pub fn create_api_router(registry: Arc<Registry>, validator: Arc<Validator>) -> Router {
    let state = Arc::new(AppState {
        registry,
        validator,
    });

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health_check))
        .route("/api/shorturl", post(create_short_url))
        .with_state(state)
}
