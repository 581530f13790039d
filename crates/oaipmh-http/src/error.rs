//! Mapping of engine failures onto HTTP statuses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use oaipmh_core::error::{Error, InvalidInputError};

/// Error returned by the HTTP handlers.
///
/// Protocol errors never reach this type; they are rendered inside the
/// OAI-PMH envelope with status 200.
#[derive(Debug)]
pub struct ApiError(pub Error);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(InvalidInputError::SetExists { .. }) => StatusCode::CONFLICT,
            Error::InvalidInput(_) | Error::Protocol(_) => StatusCode::BAD_REQUEST,
            Error::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
