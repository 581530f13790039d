//! Core OAI-PMH types.
//!
//! These types are built fresh for every request and dropped after the
//! response is rendered.

mod base_url;
mod format;
mod record;
mod verb;

pub use base_url::BaseUrl;
pub use format::{MetadataFormat, OAI_DC_PREFIX};
pub use record::{
    Header, Property, Record, Resource, SetDescriptor, format_datestamp, normalize_path, set_id,
};
pub use verb::Verb;
