//! Read-only record store.
//!
//! The store is populated once from a [`RecordProvider`] and never mutated
//! afterwards, so it can be shared across request handlers behind an `Arc`
//! without locking.

pub mod generator;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::model::types::Record;

pub use generator::{CatalogGenerator, Dataset};

/// Errors raised while populating the store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse records from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate record id: {0}")]
    DuplicateId(String),
}

/// Source of the full record set, consumed once at startup.
pub trait RecordProvider {
    fn load(&self) -> Result<Vec<Record>, StoreError>;

    /// Short label used in startup logs.
    fn describe(&self) -> String;
}

/// Loads records from a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordProvider for JsonFileProvider {
    fn load(&self) -> Result<Vec<Record>, StoreError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

/// Ordered, immutable collection of records.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<[Record]>,
}

impl RecordStore {
    /// Build a store, rejecting duplicate identifiers.
    pub fn new(records: Vec<Record>) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(StoreError::DuplicateId(record.id.clone()));
            }
        }
        Ok(Self {
            records: records.into(),
        })
    }

    pub fn from_provider(provider: &dyn RecordProvider) -> Result<Self, StoreError> {
        let store = Self::new(provider.load()?)?;
        info!(
            source = %provider.describe(),
            records = store.len(),
            "record store loaded"
        );
        Ok(store)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn rejects_duplicate_ids() {
        let now = Utc::now();
        let err = RecordStore::new(vec![
            Record::new("a", "One", "Books", now),
            Record::new("a", "Two", "Books", now),
        ])
        .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn json_provider_round_trips_store_order() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(
            file,
            r#"[
                {{"id":"p2","name":"Beta","description":"","category":"Toys","price":20,"createdAt":"2024-01-02T00:00:00Z"}},
                {{"id":"p1","name":"Alpha","description":"","category":"Toys","price":10,"createdAt":"2024-01-01T00:00:00Z"}}
            ]"#
        )?;
        let store = RecordStore::from_provider(&JsonFileProvider::new(file.path()))?;
        let ids: Vec<_> = store.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
        Ok(())
    }

    #[test]
    fn json_provider_reports_missing_file() {
        let provider = JsonFileProvider::new("/nonexistent/catalog.json");
        assert!(matches!(provider.load(), Err(StoreError::Io { .. })));
    }
}
