//! Filter → sort → paginate pipeline plus facet summary.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::types::Record;
use crate::search::facets::{self, Facets};
use crate::search::filter::filter_records;
use crate::search::paginate::{Pagination, page_slice};
use crate::search::query::SearchSpecification;
use crate::search::sort::sort_records;
use crate::store::RecordStore;

/// One page of results with pagination metadata and, optionally, facets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub results: Vec<Record>,
    pub pagination: Pagination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Facets>,
}

#[derive(Debug, Clone)]
pub struct SearchEngine {
    store: RecordStore,
    include_facets: bool,
}

impl SearchEngine {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            include_facets: true,
        }
    }

    /// Skip the facet block (plain result feeds).
    pub fn without_facets(mut self) -> Self {
        self.include_facets = false;
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn execute(&self, spec: &SearchSpecification) -> SearchResult {
        let started = Instant::now();
        let records = self.store.records();

        let mut matched = filter_records(records, spec);
        sort_records(&mut matched, spec.sort_by, spec.sort_order);

        let pagination = Pagination::compute(matched.len(), spec.page, spec.limit);
        let results: Vec<Record> = page_slice(&matched, spec.page, spec.limit)
            .iter()
            .map(|r| (*r).clone())
            .collect();
        let filters = self.include_facets.then(|| facets::summarize(records));

        debug!(
            query = %spec.query,
            page = spec.page,
            limit = spec.limit,
            total_count = pagination.total_count,
            returned = results.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "search_executed"
        );

        SearchResult {
            results,
            pagination,
            filters,
        }
    }
}
