use std::env;

use anyhow::{Context, Result};
use vista_api::build_app;
use vista_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("vista_api");

    let bind = env::var("VISTA_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let app = build_app().await?;

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(bind = %bind, "vista navigation api started");

    axum::serve(listener, app).await?;
    Ok(())
}
