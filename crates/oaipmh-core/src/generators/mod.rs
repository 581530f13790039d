//! Built-in metadata generators.

mod dublin_core;
mod linked;

pub use dublin_core::DublinCoreGenerator;
pub use linked::LinkedPayloadGenerator;
