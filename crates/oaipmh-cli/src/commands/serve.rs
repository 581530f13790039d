//! Serve command implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::Globals;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "OAI_PROVIDER_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,
}

pub async fn run(args: ServeArgs, globals: &Globals) -> Result<()> {
    let provider = Arc::new(globals.provider().await?);
    info!(
        repository = %provider.config().repository_name,
        formats = provider.registry().all().len(),
        "Provider ready"
    );

    oaipmh_http::serve(args.bind, oaipmh_http::router(provider))
        .await
        .with_context(|| format!("Server on {} failed", args.bind))
}
