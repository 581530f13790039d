//! Per-verb argument rules.
//!
//! | Verb                | Forbidden                                    | Required                   |
//! |---------------------|----------------------------------------------|----------------------------|
//! | Identify            | identifier, metadataPrefix, from, until, set |                            |
//! | ListMetadataFormats | from, until, set                             |                            |
//! | GetRecord           | from, until, set                             | identifier, metadataPrefix |
//! | ListIdentifiers     | identifier                                   | metadataPrefix             |
//! | ListSets            | identifier                                   |                            |
//! | ListRecords         | identifier                                   | metadataPrefix             |

use crate::error::OaiError;
use crate::request::OaiRequest;
use crate::token::ResumptionToken;
use crate::types::Verb;

/// A request that passed validation, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Identify,
    ListMetadataFormats { identifier: Option<String> },
    GetRecord { identifier: String, metadata_prefix: String },
    /// Any list verb. A fresh request is a query at offset zero.
    List(ResumptionToken),
}

impl Command {
    pub fn verb(&self) -> Verb {
        match self {
            Command::Identify => Verb::Identify,
            Command::ListMetadataFormats { .. } => Verb::ListMetadataFormats,
            Command::GetRecord { .. } => Verb::GetRecord,
            Command::List(query) => query.verb,
        }
    }
}

/// Fail with `badArgument` if any named value is present.
pub fn verify_empty(values: &[(&str, Option<&str>)]) -> Result<(), OaiError> {
    let present: Vec<&str> = values
        .iter()
        .filter(|(_, v)| v.is_some())
        .map(|(name, _)| *name)
        .collect();

    if present.is_empty() {
        Ok(())
    } else {
        Err(OaiError::bad_argument(format!(
            "illegal argument(s) for this verb: {}",
            present.join(", ")
        )))
    }
}

fn require<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, OaiError> {
    value.ok_or_else(|| OaiError::bad_argument(format!("missing required argument '{}'", name)))
}

/// Validate a parameter request (no resumption token) into a command.
///
/// The request should already be [`normalized`](OaiRequest::normalized).
pub fn validate(request: &OaiRequest) -> Result<Command, OaiError> {
    let verb_name = request
        .verb
        .as_deref()
        .ok_or_else(|| OaiError::bad_argument("missing 'verb' argument"))?;
    let verb: Verb = verb_name.parse()?;

    let identifier = request.identifier.as_deref();
    let metadata_prefix = request.metadata_prefix.as_deref();
    let from = request.from.as_deref();
    let until = request.until.as_deref();
    let set = request.set.as_deref();

    match verb {
        Verb::Identify => {
            verify_empty(&[
                ("identifier", identifier),
                ("metadataPrefix", metadata_prefix),
                ("from", from),
                ("until", until),
                ("set", set),
            ])?;
            Ok(Command::Identify)
        }
        Verb::ListMetadataFormats => {
            verify_empty(&[("from", from), ("until", until), ("set", set)])?;
            Ok(Command::ListMetadataFormats {
                identifier: identifier.map(String::from),
            })
        }
        Verb::GetRecord => {
            verify_empty(&[("from", from), ("until", until), ("set", set)])?;
            let identifier = require("identifier", identifier)?;
            let metadata_prefix = require("metadataPrefix", metadata_prefix)?;
            Ok(Command::GetRecord {
                identifier: identifier.to_string(),
                metadata_prefix: metadata_prefix.to_string(),
            })
        }
        Verb::ListIdentifiers | Verb::ListRecords | Verb::ListSets => {
            verify_empty(&[("identifier", identifier)])?;
            let metadata_prefix = if verb == Verb::ListSets {
                metadata_prefix.unwrap_or_default()
            } else {
                require("metadataPrefix", metadata_prefix)?
            };
            Ok(Command::List(ResumptionToken {
                verb,
                metadata_prefix: metadata_prefix.to_string(),
                from: from.map(String::from),
                until: until.map(String::from),
                set: set.map(String::from),
                offset: 0,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OaiErrorCode;

    fn code(request: OaiRequest) -> OaiErrorCode {
        validate(&request.normalized()).unwrap_err().code
    }

    #[test]
    fn verify_empty_names_offenders() {
        let err = verify_empty(&[("from", Some("x")), ("until", None), ("set", Some("s"))])
            .unwrap_err();
        assert_eq!(err.code, OaiErrorCode::BadArgument);
        assert!(err.message.contains("from"));
        assert!(err.message.contains("set"));
        assert!(!err.message.contains("until"));
    }

    #[test]
    fn missing_verb_is_bad_argument() {
        assert_eq!(code(OaiRequest::default()), OaiErrorCode::BadArgument);
    }

    #[test]
    fn unknown_verb_is_bad_verb() {
        assert_eq!(code(OaiRequest::verb("Harvest")), OaiErrorCode::BadVerb);
    }

    #[test]
    fn identify_rejects_every_selector() {
        let base = || OaiRequest::verb("Identify");
        for req in [
            base().with_identifier("x"),
            base().with_metadata_prefix("oai_dc"),
            base().with_from("2014-01-01T00:00:00Z"),
            base().with_until("2014-01-01T00:00:00Z"),
            base().with_set("s"),
        ] {
            assert_eq!(code(req), OaiErrorCode::BadArgument);
        }
        assert_eq!(validate(&base()).unwrap(), Command::Identify);
    }

    #[test]
    fn list_metadata_formats_rules() {
        let base = || OaiRequest::verb("ListMetadataFormats");
        for req in [
            base().with_from("a"),
            base().with_until("a"),
            base().with_set("a"),
        ] {
            assert_eq!(code(req), OaiErrorCode::BadArgument);
        }
        assert_eq!(
            validate(&base().with_identifier("objects/a")).unwrap(),
            Command::ListMetadataFormats {
                identifier: Some("objects/a".to_string())
            }
        );
    }

    #[test]
    fn get_record_rules() {
        let base = || {
            OaiRequest::verb("GetRecord")
                .with_identifier("objects/a")
                .with_metadata_prefix("oai_dc")
        };
        for req in [base().with_from("a"), base().with_until("a"), base().with_set("a")] {
            assert_eq!(code(req), OaiErrorCode::BadArgument);
        }
        assert_eq!(
            code(OaiRequest::verb("GetRecord").with_identifier("x")),
            OaiErrorCode::BadArgument
        );
        assert_eq!(
            code(OaiRequest::verb("GetRecord").with_metadata_prefix("oai_dc")),
            OaiErrorCode::BadArgument
        );
        assert!(matches!(validate(&base()).unwrap(), Command::GetRecord { .. }));
    }

    #[test]
    fn list_verbs_reject_identifier() {
        for verb in ["ListIdentifiers", "ListRecords", "ListSets"] {
            let req = OaiRequest::verb(verb)
                .with_metadata_prefix("oai_dc")
                .with_identifier("x");
            assert_eq!(code(req), OaiErrorCode::BadArgument);
        }
    }

    #[test]
    fn record_lists_require_prefix() {
        assert_eq!(code(OaiRequest::verb("ListRecords")), OaiErrorCode::BadArgument);
        assert_eq!(code(OaiRequest::verb("ListIdentifiers")), OaiErrorCode::BadArgument);
        assert!(validate(&OaiRequest::verb("ListSets")).is_ok());
    }

    #[test]
    fn fresh_list_starts_at_offset_zero() {
        let req = OaiRequest::verb("ListRecords")
            .with_metadata_prefix("oai_dc")
            .with_from("2014-01-01T00:00:00Z")
            .with_set("a:b");
        match validate(&req).unwrap() {
            Command::List(query) => {
                assert_eq!(query.verb, Verb::ListRecords);
                assert_eq!(query.offset, 0);
                assert_eq!(query.set.as_deref(), Some("a:b"));
                assert_eq!(query.until, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
