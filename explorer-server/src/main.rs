//! Entrypoint binding the Façade's Axum router to a Connect+h2c listener.
//!
//! Everything this binary does beyond "parse env vars, wire the engine,
//! serve" is out of scope per `spec.md` §1: no CLI flags, no embedded
//! static assets, no CORS, no Eliza test server. Logging *setup* lives
//! here (the subscriber); the library crates only emit `tracing` events.

mod config;

use std::sync::Arc;

use config::ExplorerConfig;
use explorer_facade::FacadeState;
use explorer_loader::Loader;
use explorer_loader::subprocess::RealSubprocess;
use explorer_session::SessionManager;
use explorer_session::SessionManagerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ExplorerConfig::from_env() {
        Ok(config) => config,
        Err(message) => {
            tracing::error!(error = %message, "invalid configuration");
            std::process::exit(1);
        }
    };

    let loader = Arc::new(Loader::new(Arc::new(RealSubprocess), config.loader));
    let sessions = SessionManager::new(SessionManagerConfig::default());
    let state = FacadeState { sessions: sessions.clone(), loader };
    let app = explorer_facade::router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(addr = %config.bind_addr, error = %err, "failed to bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!(addr = %config.bind_addr, "explorer listening");

    // `axum::serve` negotiates HTTP/1.1 and h2c on the same plaintext
    // socket, which is what lets gRPC clients (HTTP/2-only) reach the same
    // port as Connect clients speaking HTTP/1.1 (`spec.md` §6.1).
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server exited with error");
    }

    sessions.close().await;
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received shutdown signal"),
        Err(err) => tracing::warn!(error = %err, "failed to listen for shutdown signal"),
    }
}
