//! Filesystem storage for resources.
//!
//! Each resource is one JSON document at `resources/<path>.json` under the
//! store root. Writers serialise on an exclusive lock file and replace
//! documents by rename, so readers never see a partial document.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use tracing::{debug, instrument};
use uuid::Uuid;

use oaipmh_core::Result;
use oaipmh_core::error::{Error, InvalidInputError, RepositoryError};
use oaipmh_core::planner::QuerySpec;
use oaipmh_core::types::{Property, Resource, normalize_path};

fn map_io(err: std::io::Error) -> Error {
    Error::Repository(RepositoryError::Io {
        message: format!("IO error: {}", err),
    })
}

fn corrupt(path: &Path, reason: impl ToString) -> Error {
    Error::Repository(RepositoryError::Corrupt {
        path: path.display().to_string(),
        reason: reason.to_string(),
    })
}

/// Holds the store's write lock until dropped.
struct WriteLock(File);

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

/// Filesystem-backed resource storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resources_dir(&self) -> PathBuf {
        self.root.join("resources")
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join("store.lock")
    }

    /// Document location for a repository path, or `None` if the path
    /// cannot name a stored resource.
    fn document_path(&self, path: &str) -> Option<PathBuf> {
        let path = normalize_path(path);
        if path.is_empty() {
            return None;
        }

        let segments: Vec<&str> = path.split('/').collect();
        if segments
            .iter()
            .any(|s| *s == "." || *s == ".." || s.contains('\\'))
        {
            return None;
        }

        let (last, parents) = segments.split_last()?;
        let mut file = self.resources_dir();
        file.extend(parents);
        file.push(format!("{}.json", last));
        Some(file)
    }

    fn require_document_path(&self, path: &str) -> Result<PathBuf> {
        self.document_path(path).ok_or_else(|| {
            Error::InvalidInput(InvalidInputError::Identifier {
                value: path.to_string(),
                reason: "not a storable resource path".to_string(),
            })
        })
    }

    fn write_lock(&self) -> Result<WriteLock> {
        fs::create_dir_all(&self.root).map_err(map_io)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_io)?;
        file.lock_exclusive().map_err(map_io)?;
        Ok(WriteLock(file))
    }

    fn read_document(file: &Path) -> Result<Option<Resource>> {
        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(map_io(e)),
        };
        let resource = serde_json::from_str(&content).map_err(|e| corrupt(file, e))?;
        Ok(Some(resource))
    }

    fn write_document(file: &Path, resource: &Resource) -> Result<()> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let content = serde_json::to_string_pretty(resource).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: e.to_string(),
            })
        })?;

        let temp_path = file.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        fs::write(&temp_path, &content).map_err(map_io)?;
        fs::rename(&temp_path, file).map_err(map_io)?;
        Ok(())
    }

    /// Read a resource by repository path.
    pub fn get(&self, path: &str) -> Result<Option<Resource>> {
        let Some(file) = self.document_path(path) else {
            return Ok(None);
        };

        match Self::read_document(&file)? {
            Some(resource) if resource.path != normalize_path(path) => Err(corrupt(
                &file,
                format!("document names path '{}'", resource.path),
            )),
            resource => Ok(resource),
        }
    }

    /// Insert or replace a resource.
    #[instrument(skip(self, resource), fields(path = %resource.path))]
    pub fn put(&self, resource: &Resource) -> Result<()> {
        let file = self.require_document_path(&resource.path)?;
        let _lock = self.write_lock()?;
        Self::write_document(&file, resource)?;
        debug!("Stored resource");
        Ok(())
    }

    /// Store `resource` only if its path is free.
    #[instrument(skip(self, resource), fields(path = %resource.path))]
    pub fn create_if_absent(&self, resource: &Resource) -> Result<bool> {
        let file = self.require_document_path(&resource.path)?;
        let _lock = self.write_lock()?;
        if file.exists() {
            debug!("Resource already exists");
            return Ok(false);
        }
        Self::write_document(&file, resource)?;
        debug!("Created resource");
        Ok(true)
    }

    /// Append a property and bump the modification time.
    #[instrument(skip(self))]
    pub fn add_property(&self, path: &str, property: &Property) -> Result<()> {
        let file = self.require_document_path(path)?;
        let _lock = self.write_lock()?;
        let mut resource = Self::read_document(&file)?.ok_or_else(|| {
            Error::Repository(RepositoryError::Missing {
                path: normalize_path(path),
            })
        })?;

        resource.properties.push(property.clone());
        resource.last_modified = Utc::now();
        Self::write_document(&file, &resource)?;
        debug!("Added property");
        Ok(())
    }

    /// Every stored resource, ordered by path.
    pub fn scan(&self) -> Result<Vec<Resource>> {
        let mut resources = Vec::new();
        let dir = self.resources_dir();
        if dir.exists() {
            Self::collect(&dir, &mut resources)?;
        }
        resources.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(resources)
    }

    fn collect(dir: &Path, out: &mut Vec<Resource>) -> Result<()> {
        for entry in fs::read_dir(dir).map_err(map_io)? {
            let entry = entry.map_err(map_io)?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(map_io)?;

            if file_type.is_dir() {
                Self::collect(&path, out)?;
            } else if path.extension().is_some_and(|ext| ext == "json") {
                out.extend(Self::read_document(&path)?);
            }
        }
        Ok(())
    }

    /// Evaluate a list query over the stored resources.
    #[instrument(skip(self))]
    pub fn query(&self, spec: &QuerySpec) -> Result<Vec<String>> {
        let (skip, take) = spec.window();
        let rows: Vec<String> = self
            .scan()?
            .into_iter()
            .filter(|r| spec.matches(r))
            .skip(skip)
            .take(take)
            .map(|r| r.path)
            .collect();
        debug!(rows = rows.len(), "Evaluated query");
        Ok(rows)
    }

    pub fn earliest_modified(&self, kind: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .scan()?
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.last_modified)
            .min())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use oaipmh_core::planner::Filter;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn put_then_get() {
        let (_dir, store) = setup();
        let resource = Resource::new("objects/a", "fedora:object").with_property("urn:p", "v");
        store.put(&resource).unwrap();

        assert_eq!(store.get("/objects/a/").unwrap(), Some(resource));
        assert_eq!(store.get("objects/b").unwrap(), None);
    }

    #[test]
    fn nested_paths_coexist_with_parents() {
        let (_dir, store) = setup();
        store.put(&Resource::new("oai/sets", "oai:setsRoot")).unwrap();
        store.put(&Resource::new("oai/sets/a", "oai:set")).unwrap();

        let paths: Vec<_> = store.scan().unwrap().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["oai/sets", "oai/sets/a"]);
    }

    #[test]
    fn rejects_escaping_paths() {
        let (_dir, store) = setup();
        assert_eq!(store.get("../outside").unwrap(), None);
        assert!(store.put(&Resource::new("a/../../b", "k")).is_err());
        assert!(store.put(&Resource::new("", "k")).is_err());
    }

    #[test]
    fn create_if_absent_only_once() {
        let (_dir, store) = setup();
        let resource = Resource::new("oai/sets/a", "oai:set");
        assert!(store.create_if_absent(&resource).unwrap());
        assert!(!store.create_if_absent(&resource).unwrap());
    }

    #[test]
    fn concurrent_create_has_one_winner() {
        let (_dir, store) = setup();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .create_if_absent(&Resource::new("oai/sets/race", "oai:set"))
                        .unwrap()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn add_property_appends_and_touches() {
        let (_dir, store) = setup();
        let old = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        store
            .put(&Resource::new("oai/sets", "oai:setsRoot").with_last_modified(old))
            .unwrap();

        store
            .add_property("oai/sets", &Property::new("urn:hasSet", "oai/sets/a"))
            .unwrap();
        let root = store.get("oai/sets").unwrap().unwrap();
        assert_eq!(root.property("urn:hasSet"), Some("oai/sets/a"));
        assert!(root.last_modified > old);

        let missing = store.add_property("nope", &Property::new("p", "v"));
        assert!(matches!(
            missing,
            Err(Error::Repository(RepositoryError::Missing { .. }))
        ));
    }

    #[test]
    fn query_filters_orders_and_pages() {
        let (_dir, store) = setup();
        for (i, name) in ["c", "a", "d", "b"].iter().enumerate() {
            let time = Utc.with_ymd_and_hms(2024, 1, 1 + i as u32, 0, 0, 0).unwrap();
            store
                .put(
                    &Resource::new(format!("objects/{}", name), "fedora:object")
                        .with_last_modified(time),
                )
                .unwrap();
        }
        store.put(&Resource::new("oai/sets", "oai:setsRoot")).unwrap();

        let spec = QuerySpec {
            filters: vec![Filter::KindEquals("fedora:object".to_string())],
            limit: 2,
            offset: 1,
        };
        assert_eq!(store.query(&spec).unwrap(), vec!["objects/b", "objects/c"]);

        let earliest = store.earliest_modified("fedora:object").unwrap();
        assert_eq!(earliest, Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(store.earliest_modified("nothing").unwrap(), None);
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let (dir, store) = setup();
        let file = dir.path().join("resources").join("bad.json");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "{not json").unwrap();

        assert!(matches!(
            store.get("bad"),
            Err(Error::Repository(RepositoryError::Corrupt { .. }))
        ));
        assert!(store.scan().is_err());
    }
}
