//! oaipmh-http - HTTP front end for the OAI-PMH provider.

mod error;
mod routes;
mod server;

pub use error::ApiError;
pub use routes::{OAI_PATH, SETS_PATH, request_context, router};
pub use server::serve;
