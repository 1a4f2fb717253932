use axum::{routing::get, Router};
use std::sync::Arc;

use crate::config::RedirectMode;
use crate::registry::Registry;

use super::handlers::{redirect_url, RedirectState};

pub fn create_redirect_router(registry: Arc<Registry>, redirect_status: RedirectMode) -> Router {
    let state = Arc::new(RedirectState {
        registry,
        redirect_status,
    });

    Router::new()
        .route("/api/shorturl/{short_url}", get(redirect_url))
        .with_state(state)
}
