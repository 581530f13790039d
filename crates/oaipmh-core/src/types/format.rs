//! Metadata format descriptors.

use serde::{Deserialize, Serialize};

/// Prefix of the default Dublin Core format.
pub const OAI_DC_PREFIX: &str = "oai_dc";

/// A metadata format the provider can disseminate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataFormat {
    /// The `metadataPrefix` harvesters use to select this format.
    pub prefix: String,

    /// URL of the XML schema for the format.
    pub schema_url: String,

    /// XML namespace of the format.
    pub namespace: String,

    /// Resource property linking to a stored payload in this format.
    ///
    /// `None` for formats generated directly from resource properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector_property: Option<String>,
}

impl MetadataFormat {
    /// The built-in `oai_dc` format.
    pub fn oai_dc() -> Self {
        Self {
            prefix: OAI_DC_PREFIX.to_string(),
            schema_url: "http://www.openarchives.org/OAI/2.0/oai_dc.xsd".to_string(),
            namespace: "http://www.openarchives.org/OAI/2.0/oai_dc/".to_string(),
            selector_property: None,
        }
    }

    /// Whether this is the default Dublin Core format.
    pub fn is_default(&self) -> bool {
        self.prefix == OAI_DC_PREFIX
    }
}
