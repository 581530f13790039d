//! Error types for the OAI-PMH engine.
//!
//! Protocol errors are part of a normal response and are modelled by
//! [`OaiError`]. Everything else (store failures, bad set descriptors,
//! broken configuration) is an [`Error`] that aborts the request.

use std::fmt;
use thiserror::Error;

/// The unified error type for engine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An OAI-PMH protocol error, rendered as an `<error>` element.
    #[error("protocol error: {0}")]
    Protocol(#[from] OaiError),

    /// Failures reported by the underlying repository.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Input validation errors outside the protocol taxonomy.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// OAI-PMH error codes as defined by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OaiErrorCode {
    BadArgument,
    BadVerb,
    BadResumptionToken,
    CannotDisseminateFormat,
    IdDoesNotExist,
    NoRecordsMatch,
    NoSetHierarchy,
}

impl OaiErrorCode {
    /// The code as it appears in the `code` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            OaiErrorCode::BadArgument => "badArgument",
            OaiErrorCode::BadVerb => "badVerb",
            OaiErrorCode::BadResumptionToken => "badResumptionToken",
            OaiErrorCode::CannotDisseminateFormat => "cannotDisseminateFormat",
            OaiErrorCode::IdDoesNotExist => "idDoesNotExist",
            OaiErrorCode::NoRecordsMatch => "noRecordsMatch",
            OaiErrorCode::NoSetHierarchy => "noSetHierarchy",
        }
    }
}

impl fmt::Display for OaiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protocol-level error carried in an OAI-PMH response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OaiError {
    /// The error code.
    pub code: OaiErrorCode,
    /// Human readable explanation.
    pub message: String,
}

impl OaiError {
    /// Create a new protocol error.
    pub fn new(code: OaiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_argument(message: impl Into<String>) -> Self {
        Self::new(OaiErrorCode::BadArgument, message)
    }

    pub fn bad_verb(message: impl Into<String>) -> Self {
        Self::new(OaiErrorCode::BadVerb, message)
    }

    pub fn bad_resumption_token(message: impl Into<String>) -> Self {
        Self::new(OaiErrorCode::BadResumptionToken, message)
    }

    pub fn cannot_disseminate_format(message: impl Into<String>) -> Self {
        Self::new(OaiErrorCode::CannotDisseminateFormat, message)
    }

    pub fn id_does_not_exist(message: impl Into<String>) -> Self {
        Self::new(OaiErrorCode::IdDoesNotExist, message)
    }

    pub fn no_records_match(message: impl Into<String>) -> Self {
        Self::new(OaiErrorCode::NoRecordsMatch, message)
    }

    pub fn no_set_hierarchy(message: impl Into<String>) -> Self {
        Self::new(OaiErrorCode::NoSetHierarchy, message)
    }
}

impl fmt::Display for OaiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code)?;
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for OaiError {}

/// Failures of the backing store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Filesystem or network I/O failed.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// A stored document could not be decoded.
    #[error("corrupt document at '{path}': {reason}")]
    Corrupt { path: String, reason: String },

    /// A resource the engine relies on is missing.
    #[error("missing resource '{path}'")]
    Missing { path: String },
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        RepositoryError::Io {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Repository(RepositoryError::from(err))
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// A set descriptor could not be accepted.
    #[error("invalid set '{spec}': {reason}")]
    SetDescriptor { spec: String, reason: String },

    /// A set with the derived id already exists.
    #[error("set '{id}' already exists")]
    SetExists { id: String },

    /// Sets are switched off in the configuration.
    #[error("sets are not enabled")]
    SetsDisabled,

    /// The configuration is inconsistent.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Invalid identifier or URL.
    #[error("invalid identifier '{value}': {reason}")]
    Identifier { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
