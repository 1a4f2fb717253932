use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{header::LOCATION, HeaderValue},
    response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::sync::Arc;

use crate::api::ApiError;
use crate::config::RedirectMode;
use crate::registry::{parse_identifier, Registry};

/// Bytes escaped in a Location header; existing `%XX` escapes pass through.
const LOCATION_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

pub struct RedirectState {
    pub registry: Arc<Registry>,
    pub redirect_status: RedirectMode,
}

/// Redirect to the URL registered under the identifier
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(short_url) = path.map_err(|rejection| {
        tracing::debug!(error = %rejection, "unreadable identifier");
        ApiError::InvalidUrl
    })?;

    let id = parse_identifier(&short_url)?;
    let original_url = state.registry.resolve(id).await?;

    let location = location_header(&original_url).map_err(|err| {
        tracing::error!(id, error = %err, "stored url is not a valid Location header");
        ApiError::Server
    })?;

    Ok((state.redirect_status.status_code(), [(LOCATION, location)]).into_response())
}

/// Header value for a stored URL, escaping bytes a header cannot carry.
/// The stored string itself is left untouched.
fn location_header(url: &str) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let encoded = utf8_percent_encode(url, LOCATION_ENCODE_SET).to_string();
    HeaderValue::from_str(&encoded)
}
