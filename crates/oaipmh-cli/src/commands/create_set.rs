//! Create set command implementation.

use anyhow::{Context, Result};
use clap::Args;

use oaipmh_core::SetDescriptor;

use crate::output;

use super::Globals;

#[derive(Args, Debug)]
pub struct CreateSetArgs {
    /// Colon separated set spec (e.g. `maps:europe`)
    pub spec: String,

    /// Human readable set name
    #[arg(long)]
    pub name: String,

    /// Optional description
    #[arg(long)]
    pub description: Option<String>,
}

pub async fn run(args: CreateSetArgs, globals: &Globals) -> Result<()> {
    let provider = globals.provider().await?;

    let descriptor = SetDescriptor {
        set_spec: args.spec,
        set_name: args.name,
        set_description: args.description,
    };

    let path = provider
        .create_set(&descriptor)
        .await
        .with_context(|| format!("Failed to create set '{}'", descriptor.set_spec))?;

    output::success("Set created");
    output::field("setSpec", &descriptor.set_spec);
    output::field("path", &path);

    Ok(())
}
