// PayNoti - Web Server
// REST API for payments, notifications and spending analytics

use anyhow::Context;
use paynoti::{api, seed, MemoryStore, PaymentStore, Settings, SqliteStore};
use std::sync::Arc;

fn open_store(settings: &Settings) -> anyhow::Result<Arc<dyn PaymentStore>> {
    match &settings.db_path {
        Some(path) => {
            let store = SqliteStore::open(path)?;
            tracing::info!(path = %path.display(), "using SQLite store");
            Ok(Arc::new(store))
        }
        None if settings.seed_demo => {
            tracing::info!(wallet = seed::DEMO_WALLET, "using in-memory store with demo data");
            Ok(Arc::new(seed::demo_memory_store()))
        }
        None => {
            tracing::info!("using empty in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    paynoti::init_tracing();

    let settings = Settings::from_env()?;
    let store = open_store(&settings)?;
    let app = api::router(store);

    let addr = settings.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(%addr, version = paynoti::VERSION, "api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
