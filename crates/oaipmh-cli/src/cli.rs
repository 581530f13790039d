//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{create_set, formats, ingest, request, serve};

/// OAI-PMH data provider over a file-backed repository.
#[derive(Parser, Debug)]
#[command(name = "oai-provider")]
#[command(author, version = env!("OAI_PROVIDER_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Provider configuration file (JSON)
    #[arg(long, global = true, env = "OAI_PROVIDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository store directory
    #[arg(long, global = true, env = "OAI_PROVIDER_STORE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the OAI-PMH endpoint over HTTP
    Serve(serve::ServeArgs),

    /// Answer a single protocol request and print the XML
    Request(request::RequestArgs),

    /// Load resource documents into the store
    Ingest(ingest::IngestArgs),

    /// Create a set
    CreateSet(create_set::CreateSetArgs),

    /// List the configured metadata formats
    Formats(formats::FormatsArgs),
}
