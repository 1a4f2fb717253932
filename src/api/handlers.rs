use axum::{
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::error::ApiError;
use crate::models::{ShortenRequest, ShortenResponse};
use crate::registry::Registry;
use crate::validator::Validator;

pub struct AppState {
    pub registry: Arc<Registry>,
    pub validator: Arc<Validator>,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub status: String,
}

/// Request body read as JSON when the client says so, as a urlencoded form otherwise.
///
/// A body that fails to parse yields an empty request, which the handler
/// reports as an invalid url.
pub struct ShortenBody(pub ShortenRequest);

impl<S> FromRequest<S> for ShortenBody
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let parsed = if is_json {
            Json::<ShortenRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .ok()
        } else {
            Form::<ShortenRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .ok()
        };

        Ok(ShortenBody(parsed.unwrap_or_default()))
    }
}

/// Validate and register a URL
pub async fn create_short_url(
    State(state): State<Arc<AppState>>,
    ShortenBody(payload): ShortenBody,
) -> Result<Json<ShortenResponse>, ApiError> {
    let candidate = payload
        .url
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::InvalidUrl)?;

    let validated = state.validator.validate(&candidate).await?;
    let short_url = state.registry.register(&validated).await?;

    Ok(Json(ShortenResponse {
        original_url: validated.into_inner(),
        short_url,
    }))
}

/// Usage banner
pub async fn index() -> &'static str {
    concat!(
        "URL Shortener Microservice. ",
        "POST /api/shorturl with a \"url\" field, then GET /api/shorturl/<short_url>."
    )
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        status: "OK".to_string(),
    })
}
