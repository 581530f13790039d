//! Repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::planner::QuerySpec;
use crate::types::{Property, Resource};

/// The object store behind the provider.
///
/// Implementations return query rows in a stable order (by path) so that
/// replaying the same query with a larger offset yields the next page.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Run a bounded list query, returning resource paths.
    async fn query(&self, spec: &QuerySpec) -> Result<Vec<String>>;

    /// Fetch a resource by path.
    async fn resource(&self, path: &str) -> Result<Option<Resource>>;

    /// Check whether a resource exists.
    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.resource(path).await?.is_some())
    }

    /// Persist a resource unless its path is taken.
    ///
    /// Returns `false` when a resource already exists at the path. The check
    /// and the write must be atomic with respect to concurrent callers.
    async fn create_if_absent(&self, resource: &Resource) -> Result<bool>;

    /// Append a property to an existing resource.
    async fn add_property(&self, path: &str, property: Property) -> Result<()>;

    /// Oldest modification time among resources of the given kind.
    async fn earliest_modified(&self, kind: &str) -> Result<Option<DateTime<Utc>>>;
}
