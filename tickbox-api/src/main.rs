//! # Tickbox API Server
//!
//! Multi-user todo backend: account registration, token login and per-user
//! todo CRUD over JSON.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Public endpoints (`/register`, `/login`, `/health`)
//! - Token-authenticated todo endpoints (`/todos`, `/todos/:id`)
//! - PostgreSQL storage with embedded migrations, or an in-memory store
//!
//! ## Usage
//!
//! ```bash
//! STORAGE_BACKEND=memory JWT_SECRET=$(openssl rand -hex 32) cargo run -p tickbox-api
//! ```

use std::sync::Arc;
use tickbox_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat, StorageConfig},
};
use tickbox_shared::{
    db::{
        migrations::{get_migration_status, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::{memory::MemoryStore, postgres::PgStore, Store},
};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!(
        "Tickbox API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Build storage backend
    let (store, pool): (Arc<dyn Store>, _) = match &config.storage {
        StorageConfig::Postgres {
            url,
            max_connections,
        } => {
            let pool = create_pool(DatabaseConfig {
                url: url.clone(),
                max_connections: *max_connections,
                ..Default::default()
            })
            .await?;

            run_migrations(&pool).await?;
            let status = get_migration_status(&pool).await?;
            tracing::info!(
                applied_migrations = status.applied_migrations,
                latest_version = ?status.latest_version,
                "Database schema ready"
            );

            (Arc::new(PgStore::new(pool.clone())), Some(pool))
        }
        StorageConfig::Memory => {
            tracing::warn!("Using in-memory storage; data will be lost on restart");
            (Arc::new(MemoryStore::new()), None)
        }
    };

    tracing::info!(backend = store.backend(), "Storage ready");

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "tickbox_api=debug,tickbox_shared=info,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
