//! Locating configuration and the store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use oaipmh_core::{OaiProvider, ProviderConfig};
use oaipmh_file::FileRepository;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "oai-provider").context("Could not determine config directory")
}

/// Load the provider configuration.
///
/// An explicit path must exist. Otherwise `config.json` in the platform
/// config directory is used if present, and defaults if not.
pub fn load_config(path: Option<&Path>) -> Result<ProviderConfig> {
    if let Some(path) = path {
        return ProviderConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    let default_path = project_dirs()?.config_dir().join("config.json");
    if default_path.exists() {
        debug!(path = %default_path.display(), "Using config file");
        return ProviderConfig::load(&default_path)
            .with_context(|| format!("Failed to load config {}", default_path.display()));
    }

    debug!("Using default configuration");
    Ok(ProviderConfig::default())
}

/// The store root: explicit, or `store` in the platform data directory.
pub fn store_root(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(project_dirs()?.data_dir().join("store")),
    }
}

/// Build an initialised provider over the file store.
pub async fn open_provider(
    config: Option<&Path>,
    store: Option<&Path>,
) -> Result<OaiProvider<FileRepository>> {
    let config = load_config(config)?;
    let root = store_root(store)?;
    debug!(root = %root.display(), "Opening store");

    let provider = OaiProvider::new(FileRepository::new(&root), config)
        .context("Invalid provider configuration")?;
    provider
        .init()
        .await
        .context("Failed to initialise store")?;
    Ok(provider)
}
