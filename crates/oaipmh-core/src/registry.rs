//! Metadata format registry.

use crate::error::{Error, InvalidInputError};
use crate::types::MetadataFormat;

/// Immutable prefix → format mapping, built once at startup.
///
/// Iteration follows insertion order with `oai_dc` always first.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    formats: Vec<MetadataFormat>,
}

impl FormatRegistry {
    /// Build a registry from configured formats.
    ///
    /// `oai_dc` is added when missing. Duplicate prefixes are rejected.
    pub fn new(configured: impl IntoIterator<Item = MetadataFormat>) -> Result<Self, Error> {
        let mut formats: Vec<MetadataFormat> = Vec::new();

        for format in configured {
            if format.prefix.is_empty() {
                return Err(InvalidInputError::Config {
                    message: "metadata format with empty prefix".to_string(),
                }
                .into());
            }
            if formats.iter().any(|f| f.prefix == format.prefix) {
                return Err(InvalidInputError::Config {
                    message: format!("duplicate metadata format '{}'", format.prefix),
                }
                .into());
            }
            if !format.is_default() && format.selector_property.is_none() {
                return Err(InvalidInputError::Config {
                    message: format!(
                        "metadata format '{}' needs a selector property",
                        format.prefix
                    ),
                }
                .into());
            }
            formats.push(format);
        }

        match formats.iter().position(|f| f.is_default()) {
            Some(0) => {}
            Some(idx) => {
                let dc = formats.remove(idx);
                formats.insert(0, dc);
            }
            None => formats.insert(0, MetadataFormat::oai_dc()),
        }

        Ok(Self { formats })
    }

    /// Look up a format by prefix.
    pub fn get(&self, prefix: &str) -> Option<&MetadataFormat> {
        self.formats.iter().find(|f| f.prefix == prefix)
    }

    /// All formats, `oai_dc` first.
    pub fn all(&self) -> &[MetadataFormat] {
        &self.formats
    }
}
