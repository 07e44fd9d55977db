//! # FindMyHelper API Server binary
//!
//! Startup sequence: load config, connect the selected storage backend
//! (failing hard if postgres is unreachable), run migrations, seed the
//! category taxonomy, apply the admin bootstrap, then serve.
//!
//! ```bash
//! STORAGE_BACKEND=memory cargo run -p findmyhelper-api
//! ```

use std::sync::Arc;

use findmyhelper_shared::{
    db,
    models::UpdateUser,
    store::{ensure_default_categories, MemoryStore, PgStore, Store},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use findmyhelper_api::{
    app::{build_router, AppState},
    config::{Config, StorageBackendChoice},
    notify::Notifier,
    services::{
        email::{EmailSender, HttpEmailSender, NoopEmailSender},
        object_store::{HttpObjectStore, LocalObjectStore, ObjectStore},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "findmyhelper_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "FindMyHelper API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match config.storage.backend {
        StorageBackendChoice::Postgres => {
            let url = config.storage.database_url.clone().ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL is required when STORAGE_BACKEND=postgres")
            })?;

            let pool = db::create_pool(db::DatabaseConfig {
                url,
                max_connections: config.storage.max_connections,
                ..Default::default()
            })
            .await?;
            db::run_migrations(&pool).await?;

            tracing::info!("Using the postgres storage backend");
            Arc::new(PgStore::new(pool))
        }
        StorageBackendChoice::Memory => {
            tracing::warn!(
                "Using the in-memory storage backend; all data is lost on restart"
            );
            Arc::new(MemoryStore::new())
        }
    };

    ensure_default_categories(store.as_ref()).await?;

    bootstrap_admin(store.as_ref(), &config).await?;

    let sender: Arc<dyn EmailSender> = match &config.email {
        Some(email_config) => Arc::new(HttpEmailSender::new(email_config.clone())),
        None => {
            tracing::warn!("No email provider configured; notifications are log-only");
            Arc::new(NoopEmailSender)
        }
    };
    let notifier = Notifier::new(
        sender,
        config.api.public_base_url.clone(),
        config.admin_notify_address.clone(),
    );

    let objects: Arc<dyn ObjectStore> = match &config.object_store {
        Some(object_config) => Arc::new(HttpObjectStore::new(object_config.clone())),
        None => {
            tracing::warn!("No object store configured; uploads return placeholder URLs");
            Arc::new(LocalObjectStore::new(config.api.public_base_url.clone()))
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(store, config, notifier, objects);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Promotes the configured bootstrap account to admin
///
/// Admin status lives on the user row; this is the only place outside the
/// admin data itself that grants it.
async fn bootstrap_admin(store: &dyn Store, config: &Config) -> anyhow::Result<()> {
    let Some(admin_email) = &config.admin_email else {
        return Ok(());
    };

    match store.user_by_email(&admin_email.to_lowercase()).await? {
        Some(user) if user.is_admin => {}
        Some(user) => {
            store
                .update_user(
                    user.id,
                    UpdateUser {
                        is_admin: Some(true),
                        ..Default::default()
                    },
                )
                .await?;
            tracing::info!(user_id = user.id, "Promoted bootstrap admin account");
        }
        None => {
            tracing::warn!(
                email = %admin_email,
                "ADMIN_EMAIL account does not exist yet; register it and restart"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
