//! Records, headers, sets and the store-side resource view.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Format a timestamp with the `YYYY-MM-DDThh:mm:ssZ` granularity.
pub fn format_datestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The per-record envelope: identifier, datestamp and set memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// The resource URI.
    pub identifier: String,
    /// Last modification time of the resource.
    pub datestamp: DateTime<Utc>,
    /// Specs of the sets this resource belongs to, in property order.
    pub set_specs: Vec<String>,
}

impl Header {
    /// The datestamp rendered for the wire.
    pub fn datestamp_str(&self) -> String {
        format_datestamp(&self.datestamp)
    }
}

/// A header plus an optional metadata payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub header: Header,
    /// Serialized metadata, embedded verbatim in the response.
    ///
    /// `None` when no payload exists at the expected location.
    pub metadata: Option<String>,
}

/// A set as submitted to `create_set` and listed by `ListSets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDescriptor {
    /// Colon separated hierarchical spec, e.g. `parent:child`.
    #[serde(default)]
    pub set_spec: String,

    /// Human readable name.
    #[serde(default)]
    pub set_name: String,

    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_description: Option<String>,
}

impl SetDescriptor {
    /// Create a descriptor without description.
    pub fn new(set_spec: impl Into<String>, set_name: impl Into<String>) -> Self {
        Self {
            set_spec: set_spec.into(),
            set_name: set_name.into(),
            set_description: None,
        }
    }

    /// The storage id of this set, see [`set_id`].
    pub fn id(&self) -> &str {
        set_id(&self.set_spec)
    }
}

/// Derive a set's storage id: the last segment of its hierarchical spec.
///
/// ```
/// use oaipmh_core::types::set_id;
///
/// assert_eq!(set_id("parent:child"), "child");
/// assert_eq!(set_id("flat"), "flat");
/// ```
pub fn set_id(spec: &str) -> &str {
    match spec.rfind(':') {
        Some(idx) => &spec[idx + 1..],
        None => spec,
    }
}

/// A single outbound property of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub predicate: String,
    pub value: String,
}

impl Property {
    pub fn new(predicate: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            value: value.into(),
        }
    }
}

/// The store's view of an object: identity, timestamps and properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Repository-local path without leading slash.
    pub path: String,

    /// The resource kind (mixin type) used by list queries.
    pub kind: String,

    pub created: DateTime<Utc>,

    pub last_modified: DateTime<Utc>,

    /// Outbound properties in insertion order.
    #[serde(default)]
    pub properties: Vec<Property>,

    /// Stored payload for binary resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Resource {
    /// Create a resource stamped with the current time.
    pub fn new(path: impl AsRef<str>, kind: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            path: normalize_path(path.as_ref()),
            kind: kind.into(),
            created: now,
            last_modified: now,
            properties: Vec::new(),
            content: None,
        }
    }

    /// Builder-style property addition.
    pub fn with_property(mut self, predicate: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(Property::new(predicate, value));
        self
    }

    /// Builder-style modification time.
    pub fn with_last_modified(mut self, time: DateTime<Utc>) -> Self {
        self.last_modified = time;
        self
    }

    /// Builder-style stored payload.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// All values of the given property.
    pub fn property_values<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a str> {
        self.properties
            .iter()
            .filter(move |p| p.predicate == predicate)
            .map(|p| p.value.as_str())
    }

    /// The first value of the given property.
    pub fn property(&self, predicate: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.predicate == predicate)
            .map(|p| p.value.as_str())
    }

    pub fn has_property(&self, predicate: &str) -> bool {
        self.property(predicate).is_some()
    }
}

/// Strip leading and trailing slashes and collapse empty segments.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
