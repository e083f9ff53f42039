use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};
use wellog::api::{self, app_state::AppState};
use wellog::config::loader::ConfigLoader;
use wellog::observability::{
    AppMetrics, ObservabilityState, create_observability_router, init_tracing,
};
use wellog::services::{CachePolicy, create_activity_service};
use wellog::storage::factory::StorageFactory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config =
        ConfigLoader::load().map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
    ConfigLoader::validate(&config).context("invalid configuration")?;

    let _log_guard = init_tracing(&config.app_name, &config.logging)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    info!(
        "Starting {} ({} environment)...",
        config.app_name, config.environment
    );

    let store = StorageFactory::create_store(&config.database)
        .await
        .context("failed to connect to the primary store")?;
    info!("Primary store initialized ({})", store.backend());

    let cache = StorageFactory::create_cache(&config.cache)
        .await
        .context("failed to connect to the read cache")?;
    info!(
        "Read cache initialized ({}, ttl={}s, invalidate_on_write={})",
        cache.backend(),
        config.cache.ttl_seconds,
        config.cache.invalidate_on_write
    );

    let metrics = Arc::new(AppMetrics::default());
    let observability_state = Arc::new(
        ObservabilityState::new(env!("CARGO_PKG_VERSION").to_string(), metrics.clone())
            .with_backends(store.clone(), cache.clone()),
    );
    observability_state.refresh_health_checks().await;

    let activity_service = create_activity_service(
        store,
        cache,
        CachePolicy::from(&config.cache),
        metrics.clone(),
    );
    let app_state = AppState::new(activity_service, metrics);

    let router = create_observability_router(observability_state)
        .merge(api::create_router(app_state))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout,
        )));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
