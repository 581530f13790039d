//! In-memory repository for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::error::RepositoryError;
use crate::planner::QuerySpec;
use crate::traits::Repository;
use crate::types::{Property, Resource, normalize_path};

/// A [`Repository`] over a path-ordered map.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    resources: Mutex<BTreeMap<String, Resource>>,
    queries: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Resource>> {
        self.resources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or replace a resource.
    pub fn insert(&self, resource: Resource) {
        self.lock().insert(resource.path.clone(), resource);
    }

    /// Number of list queries executed so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn query(&self, spec: &QuerySpec) -> Result<Vec<String>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let (skip, take) = spec.window();
        Ok(self
            .lock()
            .values()
            .filter(|r| spec.matches(r))
            .skip(skip)
            .take(take)
            .map(|r| r.path.clone())
            .collect())
    }

    async fn resource(&self, path: &str) -> Result<Option<Resource>> {
        Ok(self.lock().get(&normalize_path(path)).cloned())
    }

    async fn create_if_absent(&self, resource: &Resource) -> Result<bool> {
        let mut map = self.lock();
        if map.contains_key(&resource.path) {
            return Ok(false);
        }
        map.insert(resource.path.clone(), resource.clone());
        Ok(true)
    }

    async fn add_property(&self, path: &str, property: Property) -> Result<()> {
        let mut map = self.lock();
        let path = normalize_path(path);
        let resource = map
            .get_mut(&path)
            .ok_or_else(|| RepositoryError::Missing { path: path.clone() })?;
        resource.properties.push(property);
        resource.last_modified = Utc::now();
        Ok(())
    }

    async fn earliest_modified(&self, kind: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .lock()
            .values()
            .filter(|r| r.kind == kind)
            .map(|r| r.last_modified)
            .min())
    }
}
