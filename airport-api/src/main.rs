use std::net::SocketAddr;
use std::sync::Arc;

use airport_api::{
    app,
    state::{AppState, AuthConfig},
};
use airport_core::Store;
use airport_store::{MemoryStore, PostgresStore};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airport_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = airport_store::Config::load().context("Failed to load config")?;
    tracing::info!("Starting Airport API on port {}", config.server.port);

    let store: Arc<dyn Store> = match &config.database.url {
        Some(url) => {
            let store = PostgresStore::connect(url, &config.database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            store.migrate().await.context("Failed to run migrations")?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("No database.url configured; bookings are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let app_state = AppState {
        store,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
        pagination: config.pagination.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
