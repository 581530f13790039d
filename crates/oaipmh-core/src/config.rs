//! Provider configuration.
//!
//! Loaded once at startup from a JSON document. Every field has a default,
//! so an empty object (or no file at all) yields a working provider.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidInputError};
use crate::registry::FormatRegistry;
use crate::types::{BaseUrl, MetadataFormat};

/// Largest accepted `maxListSize`.
pub const MAX_LIST_SIZE_LIMIT: u64 = 10_000;

/// How the provider decides whether a list page has a continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PagingMode {
    /// Emit a token whenever a page comes back full.
    ///
    /// A result set that is an exact multiple of the page size ends with a
    /// token that leads to `noRecordsMatch`.
    #[default]
    FullPage,
    /// Fetch one extra row and emit a token only if it exists.
    Lookahead,
}

/// Property names linking resources, sets and the sets root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyNames {
    /// On a resource: id of a set it belongs to.
    pub is_part_of_set: String,
    /// On a set: its public spec.
    pub has_set_spec: String,
    /// On a set: its display name.
    pub set_name: String,
    /// On a set: its description.
    pub set_description: String,
    /// On the sets root: link to each child set.
    pub has_sets: String,
    /// On a resource: who created it, used for `dc:creator`.
    pub created_by: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            is_part_of_set: "http://fedora.info/definitions/v4/config#isPartOfOAISet".to_string(),
            has_set_spec: "http://fedora.info/definitions/v4/config#hasOAISetSpec".to_string(),
            set_name: "http://fedora.info/definitions/v4/config#hasOAISetName".to_string(),
            set_description: "http://fedora.info/definitions/v4/config#hasOAISetDescription"
                .to_string(),
            has_sets: "http://fedora.info/definitions/v4/config#hasOAISet".to_string(),
            created_by: "http://fedora.info/definitions/v4/repository#createdBy".to_string(),
        }
    }
}

/// Complete provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// `repositoryName` in the Identify response.
    pub repository_name: String,

    /// `adminEmail` entries in the Identify response.
    pub admin_emails: Vec<String>,

    /// Fixed base URL for resource identifiers.
    ///
    /// When unset, the base is derived from each request's `Host` header
    /// and [`resource_path_prefix`](Self::resource_path_prefix).
    pub public_base_url: Option<String>,

    /// Path under the host where resources are exposed.
    pub resource_path_prefix: String,

    /// Repository path of the container holding set objects.
    pub sets_root_path: String,

    /// Whether set filters and `ListSets` are supported.
    pub sets_enabled: bool,

    /// Maximum number of items per list page.
    pub max_list_size: u64,

    pub paging: PagingMode,

    /// Resource kind harvested by record lists.
    pub record_kind: String,

    /// Resource kind of set objects.
    pub set_kind: String,

    pub properties: PropertyNames,

    /// Formats besides the built-in `oai_dc`.
    pub metadata_formats: Vec<MetadataFormat>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            repository_name: "OAI-PMH Repository".to_string(),
            admin_emails: Vec::new(),
            public_base_url: None,
            resource_path_prefix: "rest".to_string(),
            sets_root_path: "oai/sets".to_string(),
            sets_enabled: true,
            max_list_size: 100,
            paging: PagingMode::FullPage,
            record_kind: "fedora:object".to_string(),
            set_kind: "oai:set".to_string(),
            properties: PropertyNames::default(),
            metadata_formats: Vec::new(),
        }
    }
}

impl ProviderConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json).map_err(|e| InvalidInputError::Config {
            message: e.to_string(),
        })?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| InvalidInputError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json(&content)
    }

    /// Reject values the engine cannot work with.
    pub fn check(&self) -> Result<(), Error> {
        if !(1..=MAX_LIST_SIZE_LIMIT).contains(&self.max_list_size) {
            return Err(InvalidInputError::Config {
                message: format!("maxListSize must be between 1 and {}", MAX_LIST_SIZE_LIMIT),
            }
            .into());
        }
        if let Some(base) = &self.public_base_url {
            BaseUrl::new(base)?;
        }
        self.registry()?;
        Ok(())
    }

    /// Build the format registry described by this configuration.
    pub fn registry(&self) -> Result<FormatRegistry, Error> {
        FormatRegistry::new(self.metadata_formats.iter().cloned())
    }
}
