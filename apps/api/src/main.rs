//! # MedPOS API Server
//!
//! ## Startup Sequence
//! 1. Load configuration
//! 2. Initialize tracing
//! 3. Connect to database & run migrations
//! 4. Start the idempotency sweeper
//! 5. Serve until Ctrl+C / SIGTERM, then stop the sweeper and close the pool

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use medpos_api::{router, AppState, ServerConfig};
use medpos_core::idempotency::InMemoryIdempotencyStore;
use medpos_db::Database;
use medpos_engine::{spawn_idempotency_sweeper, SaleEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;

    init_logging(&config.log);
    info!(
        bind_addr = %config.bind_addr,
        database = %config.database_path.display(),
        idempotency_ttl_secs = config.idempotency_ttl_secs,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config()).await?;
    info!("Database ready");

    let store = Arc::new(InMemoryIdempotencyStore::new(config.idempotency_ttl()));
    let sweeper = spawn_idempotency_sweeper(store.clone(), config.sweep_interval());

    let engine = SaleEngine::new(db.clone(), store);
    let app = router(AppState::new(engine));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "MedPOS API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured filter.
fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
