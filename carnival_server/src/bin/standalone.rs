use carnival_server::{ReplicateClient, ServerConfig, start_server};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    // Bind address, token and model references from env or defaults
    let cfg = ServerConfig::from_env()?;
    let service = Arc::new(ReplicateClient::new(cfg.replicate.clone()));

    let handle = start_server(cfg, service).await?;
    // Park forever
    handle.await.ok();
    Ok(())
}
