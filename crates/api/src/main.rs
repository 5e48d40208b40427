use anyhow::Context;

use tenantgate_auth::AuthConfig;

const DEFAULT_CONFIG_PATH: &str = "config/tenantgate.yaml";
const DEFAULT_ADDR: &str = "0.0.0.0:10000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tenantgate_observability::init();

    let config_path =
        std::env::var("TENANTGATE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = AuthConfig::load(&config_path)
        .and_then(AuthConfig::with_env_overrides)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    let app = tenantgate_api::app::build_app(&config).context("invalid auth configuration")?;

    let addr = std::env::var("TENANTGATE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
