//! Commerce API - Main Entry Point

use anyhow::Context;
use commerce_api::{build_router, config::ServerConfig, AppState, Collaborators};
use commerce_guard::InMemoryTenantStore;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Commerce API v{}", env!("CARGO_PKG_VERSION"));

    // Load config
    let config_path = std::env::var("CONFIG_PATH")
        .unwrap_or_else(|_| "/etc/commerce/api.json".into());

    let config = ServerConfig::load(&config_path)
        .unwrap_or_else(|e| {
            tracing::warn!(path = %config_path, error = %e, "Config not found, using defaults");
            ServerConfig::default()
        })
        .apply_env();
    config.validate().context("invalid configuration")?;
    for warning in config.warnings() {
        tracing::warn!("{warning}");
    }

    let tenants = Arc::new(InMemoryTenantStore::new());
    for record in &config.tenants {
        tenants.upsert(record.tenant_id.clone(), record.plan);
    }
    tracing::info!(tenants = tenants.len(), "tenant store seeded");

    let recorder = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install metrics recorder")?;

    let collaborators = Collaborators::in_memory(&config.guard, tenants);
    let state = AppState::new(&config.guard, collaborators)?.with_metrics(recorder);
    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
