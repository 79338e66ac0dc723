use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use catalog_search::model::types::Record;
use catalog_search::search::SearchEngine;
use catalog_search::store::{CatalogGenerator, Dataset, RecordStore};
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Fixed generator anchor so fixtures are identical across runs.
#[allow(dead_code)]
pub fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Deterministic generated product catalog.
#[allow(dead_code)]
pub fn product_catalog(count: usize, seed: u64) -> Vec<Record> {
    CatalogGenerator::new(Dataset::Products, count, seed)
        .with_anchor(anchor())
        .generate()
}

#[allow(dead_code)]
pub fn engine_over(records: Vec<Record>) -> Arc<SearchEngine> {
    Arc::new(SearchEngine::new(RecordStore::new(records).expect("unique ids")))
}

/// Record with a price, the shape most pipeline examples need.
#[allow(dead_code)]
pub fn priced(id: &str, name: &str, price: f64) -> Record {
    Record::new(id, name, "General", anchor()).with_price(price)
}

/// Catalog JSON written to a temporary directory.
#[allow(dead_code)]
pub struct CatalogFile {
    pub dir: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl CatalogFile {
    pub fn write(records: &[Record]) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        let body = serde_json::to_string(records).expect("serialize catalog");
        std::fs::write(&path, body).expect("write catalog");
        Self { dir, path }
    }
}
