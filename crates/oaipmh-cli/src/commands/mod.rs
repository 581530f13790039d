//! Subcommand implementations.

pub mod create_set;
pub mod formats;
pub mod ingest;
pub mod request;
pub mod serve;

use std::path::PathBuf;

use anyhow::Result;

use oaipmh_core::OaiProvider;
use oaipmh_file::FileRepository;

use crate::cli::Commands;
use crate::settings;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Globals {
    pub config: Option<PathBuf>,
    pub store: Option<PathBuf>,
}

impl Globals {
    pub async fn provider(&self) -> Result<OaiProvider<FileRepository>> {
        settings::open_provider(self.config.as_deref(), self.store.as_deref()).await
    }
}

pub async fn handle(command: Commands, globals: Globals) -> Result<()> {
    match command {
        Commands::Serve(args) => serve::run(args, &globals).await,
        Commands::Request(args) => request::run(args, &globals).await,
        Commands::Ingest(args) => ingest::run(args, &globals).await,
        Commands::CreateSet(args) => create_set::run(args, &globals).await,
        Commands::Formats(args) => formats::run(args, &globals).await,
    }
}
