//! Barako scoreboard binary entrypoint wiring storage, engines, detection and the HTTP layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use barako_scoreboard::{
    config::AppConfig,
    dao::kv_store::{FileStore, KeyValueStore, MemoryStore},
    routes,
    services::detection_service,
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = open_store(&config).await?;

    // Hydrate before the router exists so no request can race the initial load.
    let app_state = AppState::hydrate(config, store).await;
    detection_service::start(&app_state).await;

    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    app_state.shutdown().await;
    Ok(())
}

/// Pick the key-value backend from `STORAGE_BACKEND` (`file`, `memory`, `couch`).
async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "file".into());
    let store: Arc<dyn KeyValueStore> = match backend.as_str() {
        "memory" => {
            warn!("using in-memory storage; state is lost on exit");
            Arc::new(MemoryStore::new())
        }
        "file" => {
            info!(data_dir = %config.data_dir().display(), "using file storage");
            Arc::new(FileStore::new(config.data_dir().clone()))
        }
        #[cfg(feature = "couch-store")]
        "couch" => {
            use barako_scoreboard::dao::kv_store::couchdb::{CouchConfig, CouchStore};

            let couch_config = CouchConfig::from_env().context("reading CouchDB configuration")?;
            info!(base_url = %couch_config.base_url, database = %couch_config.database, "using CouchDB storage");
            Arc::new(
                CouchStore::connect(couch_config)
                    .await
                    .context("connecting to CouchDB")?,
            )
        }
        other => anyhow::bail!("unsupported STORAGE_BACKEND `{other}`"),
    };

    if let Err(err) = store.health_check().await {
        warn!(backend = store.backend(), error = %err, "storage not healthy at startup; continuing with defaults");
    }
    Ok(store)
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
