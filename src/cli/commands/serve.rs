//! Implementation of the `lesson-assist serve` command.

use anyhow::{anyhow, Result};
use clap::Args;
use std::sync::Arc;

use crate::adapters::http::{AssistantHttpConfig, AssistantHttpServer};
use crate::cli::context::AppContext;
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, config: Config) -> Result<()> {
    let mut http_config = AssistantHttpConfig::from(&config.server);
    if let Some(host) = args.host {
        http_config.host = host;
    }
    if let Some(port) = args.port {
        http_config.port = port;
    }

    let ctx = AppContext::connect(config).await?;
    let assistant = Arc::new(ctx.assistant());
    if let Some(reason) = assistant.unavailable_reason() {
        tracing::warn!(%reason, "serving while the assistant is unavailable");
    }

    let server = AssistantHttpServer::new(assistant, http_config);
    server
        .serve_with_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
            }
        })
        .await
        .map_err(|e| anyhow!("HTTP server failed: {e}"))
}
