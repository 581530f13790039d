//! Ingest command implementation.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Deserialize;

use oaipmh_core::types::{Property, Resource};

use crate::output;

use super::Globals;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// JSON file holding one resource document or an array of them
    pub file: PathBuf,
}

/// A resource as written by hand: everything but the path is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceDocument {
    path: String,
    kind: Option<String>,
    created: Option<DateTime<Utc>>,
    last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    properties: Vec<Property>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Documents {
    Many(Vec<ResourceDocument>),
    One(ResourceDocument),
}

impl ResourceDocument {
    fn into_resource(self, default_kind: &str) -> Resource {
        let mut resource = Resource::new(&self.path, self.kind.as_deref().unwrap_or(default_kind));
        if let Some(created) = self.created {
            resource.created = created;
        }
        resource.last_modified = self.last_modified.unwrap_or(resource.created);
        resource.properties = self.properties;
        resource.content = self.content;
        resource
    }
}

pub async fn run(args: IngestArgs, globals: &Globals) -> Result<()> {
    let provider = globals.provider().await?;

    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let documents = match serde_json::from_str::<Documents>(&content)
        .with_context(|| format!("Invalid resource JSON in {}", args.file.display()))?
    {
        Documents::Many(documents) => documents,
        Documents::One(document) => vec![document],
    };

    if documents.is_empty() {
        bail!("No resources in {}", args.file.display());
    }

    let store = provider.repository().store();
    let record_kind = &provider.config().record_kind;
    let count = documents.len();
    for document in documents {
        let resource = document.into_resource(record_kind);
        store
            .put(&resource)
            .with_context(|| format!("Failed to store {}", resource.path))?;
        output::field("stored", &resource.path);
    }

    output::success(&format!("Ingested {} resource(s)", count));
    Ok(())
}
