use anyhow::Context;

use catalog_api::app::{build_app, build_services};
use catalog_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let services = build_services(&config)
        .await
        .context("failed to initialize product store")?;
    let app = build_app(services);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
