//! Inbound request parameters.

use serde::Deserialize;

use crate::error::OaiError;

/// The raw OAI-PMH arguments of a single request.
///
/// Every argument is optional at this level; the validator decides which
/// combinations a verb accepts. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OaiRequest {
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub metadata_prefix: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub until: Option<String>,
    #[serde(default)]
    pub set: Option<String>,
    #[serde(default)]
    pub resumption_token: Option<String>,
}

impl OaiRequest {
    /// A request for the given verb with no arguments.
    pub fn verb(verb: impl Into<String>) -> Self {
        Self {
            verb: Some(verb.into()),
            ..Self::default()
        }
    }

    /// A request carrying only a resumption token.
    pub fn resume(token: impl Into<String>) -> Self {
        Self {
            resumption_token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_metadata_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metadata_prefix = Some(prefix.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_until(mut self, until: impl Into<String>) -> Self {
        self.until = Some(until.into());
        self
    }

    pub fn with_set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    /// Collect arguments from decoded query or form pairs.
    ///
    /// Unknown argument names are ignored. A repeated argument is a
    /// `badArgument`.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, OaiError>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut request = Self::default();
        for (name, value) in pairs {
            let name = name.as_ref();
            let slot = match name {
                "verb" => &mut request.verb,
                "identifier" => &mut request.identifier,
                "metadataPrefix" => &mut request.metadata_prefix,
                "from" => &mut request.from,
                "until" => &mut request.until,
                "set" => &mut request.set,
                "resumptionToken" => &mut request.resumption_token,
                _ => continue,
            };
            if slot.is_some() {
                return Err(OaiError::bad_argument(format!(
                    "argument '{}' is repeated",
                    name
                )));
            }
            *slot = Some(value.into());
        }
        Ok(request)
    }

    /// Drop empty-string arguments so they read as absent.
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        Self {
            verb: clean(self.verb),
            identifier: clean(self.identifier),
            metadata_prefix: clean(self.metadata_prefix),
            from: clean(self.from),
            until: clean(self.until),
            set: clean(self.set),
            resumption_token: clean(self.resumption_token),
        }
    }
}
