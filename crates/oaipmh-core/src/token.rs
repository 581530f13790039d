//! Resumption token codec.
//!
//! A token is the complete list query: verb, metadata prefix, date bounds,
//! set and offset. Nothing is kept on the server, so any instance can serve
//! the continuation.
//!
//! Wire form: each field is percent-encoded on its own, the six fields are
//! joined with `:`, and the result is base64 (URL-safe alphabet, no padding).

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::OaiError;
use crate::types::Verb;

const DELIMITER: char = ':';
const FIELD_COUNT: usize = 6;

/// Characters left as-is inside a field. `:` is always escaped.
const FIELD: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A decoded resumption token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumptionToken {
    pub verb: Verb,
    pub metadata_prefix: String,
    pub from: Option<String>,
    pub until: Option<String>,
    pub set: Option<String>,
    pub offset: u64,
}

impl ResumptionToken {
    /// Encode this token into its opaque string form.
    pub fn encode(&self) -> String {
        encode(
            self.verb,
            &self.metadata_prefix,
            self.from.as_deref(),
            self.until.as_deref(),
            self.set.as_deref(),
            self.offset,
        )
    }

    /// Decode a token string.
    pub fn decode(token: &str) -> Result<Self, OaiError> {
        decode(token)
    }

    /// The same query advanced by one page.
    pub fn next_page(&self, page_size: u64) -> Self {
        Self {
            offset: self.offset.saturating_add(page_size),
            ..self.clone()
        }
    }
}

/// Encode a list query as a resumption token.
pub fn encode(
    verb: Verb,
    metadata_prefix: &str,
    from: Option<&str>,
    until: Option<&str>,
    set: Option<&str>,
    offset: u64,
) -> String {
    let offset = offset.to_string();
    let fields = [
        verb.as_str(),
        metadata_prefix,
        from.unwrap_or(""),
        until.unwrap_or(""),
        set.unwrap_or(""),
        offset.as_str(),
    ];

    let joined = fields
        .iter()
        .map(|f| utf8_percent_encode(f, FIELD).to_string())
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string());

    URL_SAFE_NO_PAD.encode(joined.as_bytes())
}

/// Decode a resumption token.
///
/// Every failure, whatever its cause, is reported as `badResumptionToken`.
pub fn decode(token: &str) -> Result<ResumptionToken, OaiError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| OaiError::bad_resumption_token(format!("token is not base64: {}", e)))?;

    let joined = String::from_utf8(bytes)
        .map_err(|_| OaiError::bad_resumption_token("token is not valid UTF-8"))?;

    let raw: Vec<&str> = joined.split(DELIMITER).collect();
    if raw.len() != FIELD_COUNT {
        return Err(OaiError::bad_resumption_token(format!(
            "expected {} token fields, found {}",
            FIELD_COUNT,
            raw.len()
        )));
    }

    let mut fields = Vec::with_capacity(FIELD_COUNT);
    for field in raw {
        let decoded = percent_decode_str(field)
            .decode_utf8()
            .map_err(|_| OaiError::bad_resumption_token("token field is not valid UTF-8"))?;
        fields.push(decoded.into_owned());
    }

    let verb: Verb = fields[0]
        .parse()
        .map_err(|_| OaiError::bad_resumption_token(format!("unknown verb '{}'", fields[0])))?;
    if !verb.is_list() {
        return Err(OaiError::bad_resumption_token(format!(
            "verb '{}' cannot be resumed",
            verb
        )));
    }

    let offset = fields[5]
        .parse::<u64>()
        .map_err(|e| OaiError::bad_resumption_token(format!("invalid offset: {}", e)))?;

    Ok(ResumptionToken {
        verb,
        metadata_prefix: std::mem::take(&mut fields[1]),
        from: non_empty(std::mem::take(&mut fields[2])),
        until: non_empty(std::mem::take(&mut fields[3])),
        set: non_empty(std::mem::take(&mut fields[4])),
        offset,
    })
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
