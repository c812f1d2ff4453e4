mod config;
mod errors;
mod layout;
mod merge;
mod models;
mod resume;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, MergeBackend};
use crate::layout::default_page_config;
use crate::merge::{DocumentMerger, LocalMerger, RemoteMerger};
use crate::resume::scratch::ScratchDir;
use crate::resume::templates::TemplateCatalog;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed or missing env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Templates are only read by the remote backend; check them up front there.
    let templates = TemplateCatalog::new(&config.templates_dir);
    let merger: Arc<dyn DocumentMerger> = match &config.merge_backend {
        MergeBackend::Local => Arc::new(LocalMerger::new(default_page_config())),
        MergeBackend::Remote(remote) => {
            templates.verify()?;
            info!("Remote merge service: {}", remote.endpoint);
            Arc::new(RemoteMerger::new(remote)?)
        }
    };
    info!("Document merge backend: {}", merger.backend());

    let scratch = ScratchDir::new(&config.scratch_dir);
    scratch.ensure().with_context(|| {
        format!(
            "Cannot create scratch directory {}",
            config.scratch_dir.display()
        )
    })?;
    info!("Scratch directory: {}", scratch.root().display());
    info!("Serving frontend from {}", config.static_dir.display());

    let cors = cors_layer(&config)?;

    // Build app state
    let state = AppState {
        config: config.clone(),
        merger,
        templates,
        scratch,
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
