//! Assembled OAI-PMH responses, ready for rendering.

use chrono::{DateTime, Utc};

use crate::error::OaiError;
use crate::request::OaiRequest;
use crate::types::{Header, MetadataFormat, Record, SetDescriptor, Verb};

/// The protocol version this provider speaks.
pub const PROTOCOL_VERSION: &str = "2.0";

/// Datestamp granularity advertised in Identify.
pub const GRANULARITY: &str = "YYYY-MM-DDThh:mm:ssZ";

/// The `Identify` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identify {
    pub repository_name: String,
    /// The OAI endpoint URL.
    pub base_url: String,
    pub protocol_version: String,
    pub earliest_datestamp: DateTime<Utc>,
    pub deleted_record: String,
    pub granularity: String,
    pub admin_emails: Vec<String>,
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    /// Continuation for the next page, present only if the page was full.
    pub resumption_token: Option<String>,
    /// Offset of the first item of this page.
    pub cursor: u64,
}

/// The verb-specific part of a response, or the errors that replaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Identify(Identify),
    ListMetadataFormats(Vec<MetadataFormat>),
    GetRecord(Record),
    ListIdentifiers(ListPage<Header>),
    ListRecords(ListPage<Record>),
    ListSets(ListPage<SetDescriptor>),
    Errors(Vec<OaiError>),
}

/// The `<request>` echo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEcho {
    /// Endpoint URL the request was addressed to.
    pub url: String,
    pub verb: Option<Verb>,
    pub arguments: OaiRequest,
}

/// A complete response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OaiResponse {
    pub response_date: DateTime<Utc>,
    pub request: RequestEcho,
    pub body: ResponseBody,
}

impl OaiResponse {
    /// Protocol errors carried by this response.
    pub fn errors(&self) -> &[OaiError] {
        match &self.body {
            ResponseBody::Errors(errors) => errors,
            _ => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, ResponseBody::Errors(_))
    }

    /// The continuation token of a list response, if any.
    pub fn resumption_token(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::ListIdentifiers(page) => page.resumption_token.as_deref(),
            ResponseBody::ListRecords(page) => page.resumption_token.as_deref(),
            ResponseBody::ListSets(page) => page.resumption_token.as_deref(),
            _ => None,
        }
    }
}
