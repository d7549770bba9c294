use crate::{codec, store::StoreError, AppState};
use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

// ── Template structs ───────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate;

#[derive(Template)]
#[template(path = "success.html")]
struct SuccessTemplate {
    short_url: String,
    long_url: String,
}

// ── Query types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SuccessParams {
    short: Option<String>,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET /
/// Landing page with the URL submission form.
pub async fn index() -> Response {
    IndexTemplate.into_response()
}

/// GET /success?short=<code>
///
/// Shown after a form submission; re-resolves the code so the page always
/// reflects what is actually stored.
pub async fn success(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuccessParams>,
) -> Response {
    let code = match params.short {
        Some(code) if !code.is_empty() => code,
        _ => return (StatusCode::BAD_REQUEST, "Missing short code").into_response(),
    };

    let id = match codec::decode(&code) {
        Ok(id) => id,
        Err(_) => return (StatusCode::NOT_FOUND, "Short link not found").into_response(),
    };

    match state.store.lookup(id).await {
        Ok(long_url) => SuccessTemplate {
            short_url: format!("{}/{}", state.config.base_url, code),
            long_url,
        }
        .into_response(),
        Err(StoreError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, "Short link not found").into_response()
        }
        Err(e) => {
            tracing::error!("Storage error rendering success page for '{}': {:?}", code, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}
