use crate::{codec, store::StoreError, AppState};
use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::{net::SocketAddr, sync::Arc};

/// GET /:code
///
/// 1. Decode the short code into an identifier. Undecodable codes are 404 —
///    malformed and unknown codes are indistinguishable from outside.
/// 2. Check the in-memory cache; on a miss, fall back to the store and
///    backfill the cache for next time.
/// 3. Spawn a background task to record the hit so the redirect is never
///    blocked (or failed) by the accounting write.
/// 4. Return a 301 redirect to the long URL.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    // ── 1. Decode ──────────────────────────────────────────────────────────
    let id = match codec::decode(&code) {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!("Undecodable short code '{}': {}", code, e);
            return (StatusCode::NOT_FOUND, "Short link not found").into_response();
        }
    };

    // ── 2. Resolve URL ─────────────────────────────────────────────────────
    let long_url = match state.cache.get(id) {
        Some(url) => url,
        None => {
            // Cache miss — check the store
            match state.store.lookup(id).await {
                Ok(url) => {
                    // Backfill the cache for next time
                    state.cache.set(id, url.as_str());
                    url
                }
                Err(StoreError::NotFound(_)) => {
                    return (StatusCode::NOT_FOUND, "Short link not found").into_response();
                }
                Err(e) => {
                    // A genuine storage fault is never presented as 404.
                    tracing::error!("Storage error looking up id {}: {:?}", id, e);
                    return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
                }
            }
        }
    };

    // ── 3. Record the hit in the background ────────────────────────────────
    let ip = extract_ip(&headers, addr);
    let store = state.store.clone();

    tokio::spawn(async move {
        // The visitor already has their redirect; a failure here is only
        // an accounting gap.
        if let Err(e) = store.record_hit(id, &ip, Utc::now()).await {
            tracing::warn!("Failed to record hit for id {}: {:?}", id, e);
        }
    });

    // ── 4. Redirect ────────────────────────────────────────────────────────
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, long_url)]).into_response()
}

// ── Helpers ────────────────────────────────────────────────────────────────

/// Determine the real client IP, preferring common proxy headers.
fn extract_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    // X-Forwarded-For can be a comma-separated list; take the first entry.
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(ip) = xff.split(',').next().map(str::trim) {
            if !ip.is_empty() {
                return ip.to_owned();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        if !real_ip.is_empty() {
            return real_ip.to_owned();
        }
    }

    addr.ip().to_string()
}
