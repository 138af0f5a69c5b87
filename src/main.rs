use burnlink::{
    config::AppConfig,
    store::{self, spawn_sweeper},
    web::{self, AppState},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging first
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "burnlink=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting burnlink v{}", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(AppConfig::load()?);
    info!(
        ttl_secs = config.secrets.ttl_secs,
        max_payload_bytes = config.secrets.max_payload_bytes,
        "Configuration loaded"
    );

    // Lives until shutdown; handed to the router and the sweeper
    let secret_store = store::create_secret_store();

    let sweeper = config
        .secrets
        .sweep_interval()
        .map(|every| spawn_sweeper(secret_store.clone(), every));

    let app = web::create_router(AppState {
        store: secret_store.clone(),
        config: config.clone(),
    });

    let addr = config.web.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Web server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Web server error: {}", e);
    }

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!(
        discarded = secret_store.len(),
        "Shut down; unredeemed secrets discarded"
    );

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
