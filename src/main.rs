use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curtail::{cache::LinkCache, config::AppConfig, router, store::SqliteStore, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent — env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curtail=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    tracing::info!("Starting Curtail on {}:{}", config.host, config.port);
    tracing::info!("Base URL: {}", config.base_url);

    // Open the SQLite pool (creating the file on first run) and ensure the
    // schema exists — safe to repeat on every startup.
    let store = SqliteStore::connect(&config.database_url).await?;
    tracing::info!("Database ready at {}", config.database_url);

    let bind_addr = format!("{}:{}", config.host, config.port);

    let state = Arc::new(AppState {
        store: Arc::new(store),
        cache: LinkCache::new(),
        config,
    });

    let app = router(state);

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
