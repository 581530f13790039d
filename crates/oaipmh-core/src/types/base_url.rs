//! Base URL under which repository resources are exposed.

use std::fmt;
use url::Url;

use crate::error::{Error, InvalidInputError};

use super::record::normalize_path;

/// The URL prefix that turns repository paths into public identifiers.
///
/// Derived per request (from configuration or the `Host` header) and passed
/// explicitly to everything that maps between paths and URIs.
///
/// # Example
///
/// ```
/// use oaipmh_core::BaseUrl;
///
/// let base = BaseUrl::new("http://localhost:8080/rest").unwrap();
/// assert_eq!(base.path_to_uri("/objects/a"), "http://localhost:8080/rest/objects/a");
/// assert_eq!(base.uri_to_path("http://localhost:8080/rest/objects/a").as_deref(), Some("objects/a"));
/// assert_eq!(base.uri_to_path("objects/a").as_deref(), Some("objects/a"));
/// assert_eq!(base.uri_to_path("http://elsewhere.org/objects/a"), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Parse a base URL. A trailing slash is added when missing.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let mut url = Url::parse(s).map_err(|e| InvalidInputError::Identifier {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        if url.cannot_be_a_base() {
            return Err(InvalidInputError::Identifier {
                value: s.to_string(),
                reason: "cannot be used as a base URL".to_string(),
            }
            .into());
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self(url))
    }

    /// Build a base from an HTTP authority and a path prefix.
    pub fn from_host(scheme: &str, host: &str, prefix: &str) -> Result<Self, Error> {
        let prefix = normalize_path(prefix);
        if prefix.is_empty() {
            Self::new(format!("{}://{}/", scheme, host))
        } else {
            Self::new(format!("{}://{}/{}/", scheme, host, prefix))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// An absolute URL on the same origin, e.g. the OAI endpoint.
    pub fn on_origin(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.origin().ascii_serialization(),
            normalize_path(path)
        )
    }

    /// Map a repository path to its public URI.
    pub fn path_to_uri(&self, path: &str) -> String {
        format!("{}{}", self.0.as_str(), normalize_path(path))
    }

    /// Map an identifier back to a repository path.
    ///
    /// Accepts a URI under this base or a bare path. Returns `None` for
    /// absolute URIs outside the base, which can never name a local resource.
    pub fn uri_to_path(&self, identifier: &str) -> Option<String> {
        if let Some(rest) = identifier.strip_prefix(self.0.as_str()) {
            return Some(normalize_path(rest));
        }
        if Url::parse(identifier).is_ok() {
            return None;
        }
        Some(normalize_path(identifier))
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
