//! Collaborator traits: the object store and metadata generators.

mod generator;
mod repository;

pub use generator::{FormatGenerator, GenerateContext};
pub use repository::Repository;
