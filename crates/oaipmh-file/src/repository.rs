//! [`Repository`] over a [`FileStore`].

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use oaipmh_core::Result;
use oaipmh_core::error::{Error, RepositoryError};
use oaipmh_core::planner::QuerySpec;
use oaipmh_core::traits::Repository;
use oaipmh_core::types::{Property, Resource};

use crate::store::FileStore;

/// Filesystem-backed repository.
///
/// Store calls block on file I/O and the write lock, so each one runs on
/// tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct FileRepository {
    store: FileStore,
}

impl FileRepository {
    /// Open (or lazily create) a repository at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            store: FileStore::new(root),
        }
    }

    /// Access the underlying file store.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(FileStore) -> Result<T> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(store))
            .await
            .map_err(|e| {
                Error::Repository(RepositoryError::Io {
                    message: format!("store task failed: {}", e),
                })
            })?
    }
}

#[async_trait]
impl Repository for FileRepository {
    async fn query(&self, spec: &QuerySpec) -> Result<Vec<String>> {
        let spec = spec.clone();
        self.blocking(move |store| store.query(&spec)).await
    }

    async fn resource(&self, path: &str) -> Result<Option<Resource>> {
        let path = path.to_string();
        self.blocking(move |store| store.get(&path)).await
    }

    async fn create_if_absent(&self, resource: &Resource) -> Result<bool> {
        let resource = resource.clone();
        self.blocking(move |store| store.create_if_absent(&resource))
            .await
    }

    async fn add_property(&self, path: &str, property: Property) -> Result<()> {
        let path = path.to_string();
        self.blocking(move |store| store.add_property(&path, &property))
            .await
    }

    async fn earliest_modified(&self, kind: &str) -> Result<Option<DateTime<Utc>>> {
        let kind = kind.to_string();
        self.blocking(move |store| store.earliest_modified(&kind))
            .await
    }
}
