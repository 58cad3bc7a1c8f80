use anyhow::Context;

use inventoryflow_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    inventoryflow_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = inventoryflow_api::app::build_app(&config)
        .await
        .context("failed to open inventory store")?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
