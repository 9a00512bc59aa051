use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use itemgate::config::{ServiceConfig, StoreBackend};
use itemgate::http::http_router;
use itemgate::services::ItemService;
use itemgate_core::DocumentStore;
use itemgate_memory_store::MemoryDocumentStore;
use itemgate_postgresql_store::PostgresqlDocumentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("failed to register tracer with registry")?;

    let config = ServiceConfig::from_env()?;

    let store: Arc<dyn DocumentStore> = match config.store {
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store, nothing survives a restart");
            Arc::new(MemoryDocumentStore::default())
        }
        StoreBackend::Postgresql { database_url } => {
            let store = PostgresqlDocumentStore::new(database_url);
            store
                .migrate()
                .await
                .context("failed to migrate DATABASE_URL")?;
            Arc::new(store)
        }
    };

    let service = Arc::new(ItemService::new(store));
    let app = http_router(service);

    let addr: SocketAddr = config
        .endpoint
        .parse()
        .with_context(|| format!("invalid ENDPOINT {}", config.endpoint))?;

    tracing::info!("http service listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
