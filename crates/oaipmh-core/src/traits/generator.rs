//! Metadata format generator trait.

use async_trait::async_trait;

use crate::Result;
use crate::config::PropertyNames;
use crate::types::{BaseUrl, MetadataFormat, Resource};

use super::Repository;

/// Everything a generator may consult besides the resource itself.
pub struct GenerateContext<'a> {
    pub repository: &'a dyn Repository,
    pub base: &'a BaseUrl,
    pub properties: &'a PropertyNames,
}

/// Produces the metadata payload of a record in one format.
#[async_trait]
pub trait FormatGenerator: Send + Sync {
    /// Render `resource` in `format`.
    ///
    /// `Ok(None)` means there is no payload at the expected location; the
    /// record is still returned, without metadata.
    async fn generate(
        &self,
        resource: &Resource,
        format: &MetadataFormat,
        ctx: &GenerateContext<'_>,
    ) -> Result<Option<String>>;
}
