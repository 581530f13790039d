//! Generator for formats stored as separate payload resources.

use async_trait::async_trait;
use tracing::warn;

use crate::Result;
use crate::traits::{FormatGenerator, GenerateContext};
use crate::types::{MetadataFormat, Resource};

/// Follows a format's selector property to a stored payload.
///
/// The selector value is the path (or URI) of a resource whose `content` is
/// the serialized metadata. A missing link or an empty target yields no
/// metadata rather than an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedPayloadGenerator;

#[async_trait]
impl FormatGenerator for LinkedPayloadGenerator {
    async fn generate(
        &self,
        resource: &Resource,
        format: &MetadataFormat,
        ctx: &GenerateContext<'_>,
    ) -> Result<Option<String>> {
        let Some(selector) = format.selector_property.as_deref() else {
            warn!(prefix = %format.prefix, "Format has no selector property");
            return Ok(None);
        };

        let Some(link) = resource.property(selector) else {
            warn!(
                path = %resource.path,
                prefix = %format.prefix,
                "No metadata link on resource"
            );
            return Ok(None);
        };

        let Some(target) = ctx.base.uri_to_path(link) else {
            warn!(path = %resource.path, %link, "Metadata link points outside the repository");
            return Ok(None);
        };

        match ctx.repository.resource(&target).await? {
            Some(binary) if binary.content.is_some() => Ok(binary.content),
            _ => {
                warn!(path = %resource.path, %target, "No metadata at the expected location");
                Ok(None)
            }
        }
    }
}
