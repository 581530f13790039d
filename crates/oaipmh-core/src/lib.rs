//! oaipmh-core - OAI-PMH 2.0 protocol engine.
//!
//! Validates harvesting requests, plans bounded repository queries, pages
//! results with stateless resumption tokens and renders the response XML.
//! Storage is abstracted behind [`Repository`].

pub mod assemble;
pub mod config;
pub mod error;
pub mod generators;
pub mod planner;
pub mod provider;
pub mod registry;
pub mod request;
pub mod response;
pub mod token;
pub mod traits;
pub mod types;
pub mod validate;
pub mod xml;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::{PagingMode, PropertyNames, ProviderConfig};
pub use error::{Error, InvalidInputError, OaiError, OaiErrorCode, RepositoryError};
pub use planner::{Filter, QuerySpec};
pub use provider::{OaiProvider, RequestContext};
pub use registry::FormatRegistry;
pub use request::OaiRequest;
pub use response::{OaiResponse, ResponseBody};
pub use token::ResumptionToken;
pub use traits::{FormatGenerator, GenerateContext, Repository};
pub use types::{
    BaseUrl, Header, MetadataFormat, Property, Record, Resource, SetDescriptor, Verb,
};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
