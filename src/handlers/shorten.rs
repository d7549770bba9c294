use crate::{codec, store::StoreError, AppState};
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

// ── Form / response types ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ShortenForm {
    pub long_url: String,
}

#[derive(Serialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub long_url: String,
}

// ── Submission core ────────────────────────────────────────────────────────

enum SubmitError {
    /// The submitted string is not an absolute http(s) URL.
    InvalidUrl,
    Storage(StoreError),
}

/// Validate and normalize the submitted URL, then insert-or-reuse.
///
/// Returns the assigned (or reused) identifier together with the canonical
/// URL string that was stored.
async fn submit(state: &AppState, raw: &str) -> Result<(i64, String), SubmitError> {
    let parsed = Url::parse(raw).map_err(|_| SubmitError::InvalidUrl)?;
    if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
        return Err(SubmitError::InvalidUrl);
    }

    // The parsed form is what gets stored, so trivially different spellings
    // of the same URL collapse onto one record.
    let long_url = parsed.to_string();

    let id = state
        .store
        .insert_or_get(&long_url)
        .await
        .map_err(SubmitError::Storage)?;
    state.cache.set(id, long_url.as_str());

    tracing::info!("id={}: url={} --> code={}", id, long_url, codec::encode(id));
    Ok((id, long_url))
}

fn submit_error_response(err: SubmitError, raw: &str) -> Response {
    match err {
        SubmitError::InvalidUrl => {
            tracing::warn!("Rejected invalid URL submission: '{}'", raw);
            (StatusCode::BAD_REQUEST, "Invalid URL").into_response()
        }
        SubmitError::Storage(e) => {
            tracing::error!("Storage error shortening '{}': {:?}", raw, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// POST /newLink
///
/// Browser form submission; on success, redirect (303) to the success page
/// carrying the freshly encoded short code.
pub async fn shorten_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ShortenForm>,
) -> Response {
    match submit(&state, &form.long_url).await {
        Ok((id, _)) => {
            Redirect::to(&format!("/success?short={}", codec::encode(id))).into_response()
        }
        Err(e) => submit_error_response(e, &form.long_url),
    }
}

/// POST /api/newLink
///
/// Same submission as the form flow, answered with JSON instead of a page.
pub async fn shorten_api(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ShortenForm>,
) -> Response {
    match submit(&state, &form.long_url).await {
        Ok((id, long_url)) => Json(ShortenResponse {
            short_url: format!("{}/{}", state.config.base_url, codec::encode(id)),
            long_url,
        })
        .into_response(),
        Err(e) => submit_error_response(e, &form.long_url),
    }
}
