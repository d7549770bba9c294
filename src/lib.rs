//! Curtail — a small URL shortener.
//!
//! The core is the base-62 [`codec`] and the deduplicating [`store`]; the
//! HTTP [`handlers`] are thin collaborators around those two. Exposed as a
//! library so integration tests can drive the full router in-process.

pub mod cache;
pub mod codec;
pub mod config;
pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use cache::LinkCache;
use config::AppConfig;
use store::LinkStore;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    /// The injected link store; handlers only ever see the trait.
    pub store: Arc<dyn LinkStore>,
    pub cache: LinkCache,
    pub config: AppConfig,
}

// ── Router ─────────────────────────────────────────────────────────────────

/// Build the application router over a shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Landing page with the submission form
        .route("/", get(handlers::pages::index))
        // Browser form flow: POST then redirect to the success page
        .route("/newLink", post(handlers::shorten::shorten_form))
        .route("/success", get(handlers::pages::success))
        // JSON API flavour of the same submission
        .route("/api/newLink", post(handlers::shorten::shorten_api))
        // Short-code redirect — must come LAST so the fixed paths take priority
        .route("/:code", get(handlers::resolve::resolve))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
