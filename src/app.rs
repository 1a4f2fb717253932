use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::create_api_router;
use crate::config::RedirectMode;
use crate::redirect::create_redirect_router;
use crate::registry::Registry;
use crate::validator::Validator;

/// Full HTTP surface: creation, redirect, health, with permissive CORS and request tracing.
pub fn create_app(
    registry: Arc<Registry>,
    validator: Arc<Validator>,
    redirect_status: RedirectMode,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_api_router(Arc::clone(&registry), validator)
        .merge(create_redirect_router(registry, redirect_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
