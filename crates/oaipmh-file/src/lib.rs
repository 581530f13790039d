//! oaipmh-file - Filesystem-backed repository.

mod repository;
mod store;

pub use repository::FileRepository;
pub use store::FileStore;
