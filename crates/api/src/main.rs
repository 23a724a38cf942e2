use anyhow::Context as _;

use coursehub_api::app;
use coursehub_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    coursehub_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let services = app::services::build_services(&config)
        .await
        .context("failed to initialise stores")?;
    let app = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
