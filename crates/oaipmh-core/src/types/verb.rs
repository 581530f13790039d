//! OAI-PMH verbs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OaiError;

/// One of the six OAI-PMH requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    Identify,
    ListMetadataFormats,
    GetRecord,
    ListIdentifiers,
    ListSets,
    ListRecords,
}

impl Verb {
    /// All verbs in protocol order.
    pub const ALL: [Verb; 6] = [
        Verb::Identify,
        Verb::ListMetadataFormats,
        Verb::GetRecord,
        Verb::ListIdentifiers,
        Verb::ListSets,
        Verb::ListRecords,
    ];

    /// The verb name as used in the `verb` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Identify => "Identify",
            Verb::ListMetadataFormats => "ListMetadataFormats",
            Verb::GetRecord => "GetRecord",
            Verb::ListIdentifiers => "ListIdentifiers",
            Verb::ListSets => "ListSets",
            Verb::ListRecords => "ListRecords",
        }
    }

    /// Whether the verb returns a paged list that can be resumed.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Verb::ListIdentifiers | Verb::ListSets | Verb::ListRecords
        )
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = OaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| OaiError::bad_verb(format!("Illegal OAI verb '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OaiErrorCode;

    #[test]
    fn parses_every_verb_name() {
        for verb in Verb::ALL {
            assert_eq!(verb.as_str().parse::<Verb>().unwrap(), verb);
        }
    }

    #[test]
    fn verb_names_are_case_sensitive() {
        let err = "listrecords".parse::<Verb>().unwrap_err();
        assert_eq!(err.code, OaiErrorCode::BadVerb);
    }

    #[test]
    fn list_verbs() {
        assert!(Verb::ListRecords.is_list());
        assert!(Verb::ListSets.is_list());
        assert!(!Verb::GetRecord.is_list());
    }
}
