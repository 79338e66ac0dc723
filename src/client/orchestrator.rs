//! Query orchestrator: the client-side request lifecycle as a plain state machine.
//!
//! ```text
//!   change ──► Debouncing ──(deadline)──► InFlight ──(response)──► Idle
//!     ▲            │  ▲                       │
//!     └────────────┘  └──────── change ───────┘
//! ```
//!
//! The orchestrator owns the current [`SearchSpecification`] and a generation
//! counter. It never sleeps or performs I/O: callers feed it the current time
//! and transport outcomes, and it hands back [`IssuedRequest`]s to send. That
//! keeps it usable from any event loop and testable without one.
//!
//! Guarantees:
//! - trailing-edge debounce: only the last change in a burst issues a request;
//! - issuing a request cancels the previous one;
//! - only the response for the newest generation may touch display state,
//!   and only while the specification it was issued for is still current;
//! - load-more only extends results that belong to the current specification;
//! - after [`QueryOrchestrator::teardown`] nothing changes.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::client::cancel::{CancellationHandle, CancellationToken, Generation, cancellation_pair};
use crate::client::transport::TransportError;
use crate::model::types::Record;
use crate::search::facets::Facets;
use crate::search::paginate::Pagination;
use crate::search::{SearchResult, SearchSpecification, SortKey, SortOrder};

/// UI sentinel meaning "no category/brand filter".
pub const ALL_SENTINEL: &str = "all";

/// How results of successive pages are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ScrollMode {
    /// Each response replaces the visible page. Page changes are debounced.
    #[default]
    Paged,
    /// Later pages append to earlier ones. Load-more skips the debounce.
    Infinite,
}

impl std::str::FromStr for ScrollMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paged" | "pages" => Ok(Self::Paged),
            "infinite" | "scroll" => Ok(Self::Infinite),
            other => Err(format!("unknown scroll mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Debouncing,
    InFlight,
}

/// A user-driven mutation of the specification.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecChange {
    Query(String),
    Category(String),
    Brand(String),
    PriceRange { min: u64, max: u64 },
    Sort { key: SortKey, order: SortOrder },
    Page(usize),
    /// Clear category/brand, widen price to the known facet range, sort by name.
    ResetFilters,
}

/// A request the caller must send through its transport.
#[derive(Debug)]
pub struct IssuedRequest {
    pub generation: Generation,
    pub spec: SearchSpecification,
    pub cancel: CancellationToken,
}

/// What happened to a transport outcome handed to [`QueryOrchestrator::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Merged into display state.
    Applied,
    /// Belonged to a superseded request; dropped.
    Stale,
    /// The active request was cancelled; dropped silently.
    Cancelled,
    /// The active request failed; error recorded for display.
    Failed,
    /// Arrived after teardown; dropped.
    Ignored,
}

/// What a view renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub results: Vec<Record>,
    pub pagination: Option<Pagination>,
    pub facets: Facets,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
struct InFlight {
    generation: Generation,
    spec: SearchSpecification,
    handle: CancellationHandle,
}

/// The listing behind the visible results: its specification with the page
/// ignored, and the last page merged into it.
#[derive(Debug)]
struct Shown {
    listing: SearchSpecification,
    page: usize,
}

fn listing_of(spec: &SearchSpecification) -> SearchSpecification {
    spec.clone().with_page(1)
}

#[derive(Debug)]
pub struct QueryOrchestrator {
    spec: SearchSpecification,
    mode: ScrollMode,
    debounce: Duration,
    deadline: Option<Instant>,
    generation: Generation,
    in_flight: Option<InFlight>,
    display: DisplayState,
    shown: Option<Shown>,
    torn_down: bool,
}

impl QueryOrchestrator {
    pub fn new(spec: SearchSpecification, mode: ScrollMode, debounce: Duration) -> Self {
        Self {
            spec,
            mode,
            debounce,
            deadline: None,
            generation: Generation::initial(),
            in_flight: None,
            display: DisplayState::default(),
            shown: None,
            torn_down: false,
        }
    }

    pub fn spec(&self) -> &SearchSpecification {
        &self.spec
    }

    pub fn mode(&self) -> ScrollMode {
        self.mode
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn phase(&self) -> Phase {
        if self.deadline.is_some() {
            Phase::Debouncing
        } else if self.in_flight.is_some() {
            Phase::InFlight
        } else {
            Phase::Idle
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// When [`QueryOrchestrator::poll`] should next be called, if at all.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Generation of the request whose response would currently be accepted.
    pub fn active_generation(&self) -> Option<Generation> {
        self.in_flight.as_ref().map(|f| f.generation)
    }

    /// Re-arm the debounce without changing the specification (initial load, retry).
    pub fn refresh(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        self.arm(now);
    }

    /// Issue a request for the current specification without waiting (initial load).
    pub fn issue_now(&mut self) -> Option<IssuedRequest> {
        if self.torn_down {
            return None;
        }
        self.deadline = None;
        Some(self.issue())
    }

    /// Apply a change and (re)start the debounce timer. Returns `false` when
    /// the change left the specification as it was.
    pub fn apply(&mut self, now: Instant, change: SpecChange) -> bool {
        if self.torn_down {
            return false;
        }
        let mut next = self.spec.clone();
        match change {
            SpecChange::Query(query) => {
                next.query = query;
                next.page = 1;
            }
            SpecChange::Category(category) => {
                next.category = strip_sentinel(category);
                next.page = 1;
            }
            SpecChange::Brand(brand) => {
                next.brand = strip_sentinel(brand);
                next.page = 1;
            }
            SpecChange::PriceRange { min, max } => {
                next = next.with_price_range(min, max);
                next.page = 1;
            }
            SpecChange::Sort { key, order } => {
                next.sort_by = key;
                next.sort_order = order;
                next.page = 1;
            }
            SpecChange::Page(page) => {
                next.page = page.max(1);
            }
            SpecChange::ResetFilters => {
                next.category.clear();
                next.brand.clear();
                let range = self.display.facets.price_range;
                if range.max > 0.0 {
                    next = next.with_price_range(range.min.floor() as u64, range.max.ceil() as u64);
                } else {
                    let defaults = SearchSpecification::default();
                    next = next.with_price_range(defaults.min_price, defaults.max_price);
                }
                next.sort_by = SortKey::Name;
                next.sort_order = SortOrder::Asc;
                next.page = 1;
            }
        }

        if next == self.spec {
            return false;
        }
        self.spec = next;
        self.arm(now);
        true
    }

    /// Explicit request for the next page.
    ///
    /// Infinite scroll issues immediately (no debounce) unless a request or a
    /// debounce is already pending or there is nothing more to load. Paged
    /// mode treats it as an ordinary debounced page change. Either way the
    /// visible results must belong to the current specification.
    pub fn load_more(&mut self, now: Instant) -> Option<IssuedRequest> {
        if self.torn_down || !self.shows_current_listing() {
            return None;
        }
        let next_page = self.display.pagination.and_then(|p| p.next_page)?;
        match self.mode {
            ScrollMode::Paged => {
                self.apply(now, SpecChange::Page(next_page));
                None
            }
            ScrollMode::Infinite => {
                if self.deadline.is_some() || self.in_flight.is_some() {
                    return None;
                }
                self.spec.page = next_page;
                Some(self.issue())
            }
        }
    }

    /// Fire the debounce if it has expired.
    pub fn poll(&mut self, now: Instant) -> Option<IssuedRequest> {
        if self.torn_down {
            return None;
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(self.issue())
            }
            _ => None,
        }
    }

    /// Feed back the outcome of a previously issued request.
    pub fn complete(
        &mut self,
        generation: Generation,
        outcome: Result<SearchResult, TransportError>,
    ) -> Completion {
        if self.torn_down {
            return Completion::Ignored;
        }
        let is_active = self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == generation);
        if !is_active {
            debug!(generation = %generation, "dropping stale response");
            return Completion::Stale;
        }
        let Some(finished) = self.in_flight.take() else {
            return Completion::Stale;
        };
        self.display.loading = false;

        if matches!(&outcome, Err(err) if err.is_cancellation()) {
            debug!(generation = %generation, "request cancelled");
            return Completion::Cancelled;
        }
        // A newer change is still debouncing.
        if finished.spec != self.spec {
            debug!(generation = %generation, "dropping response for outdated specification");
            return Completion::Stale;
        }

        match outcome {
            Ok(result) => {
                self.merge(&finished.spec, result);
                Completion::Applied
            }
            Err(err) => {
                warn!(generation = %generation, error = %err, "search request failed");
                self.display.error = Some(err.user_message());
                if !self.shows_current_listing() {
                    self.display.pagination = None;
                }
                Completion::Failed
            }
        }
    }

    /// Cancel everything pending and freeze state.
    pub fn teardown(&mut self) {
        if let Some(flight) = self.in_flight.take() {
            flight.handle.cancel();
        }
        self.deadline = None;
        self.display.loading = false;
        self.torn_down = true;
    }

    fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    fn issue(&mut self) -> IssuedRequest {
        if let Some(previous) = self.in_flight.take() {
            debug!(generation = %previous.generation, "cancelling superseded request");
            previous.handle.cancel();
        }
        self.generation = self.generation.next();
        let (token, handle) = cancellation_pair();
        self.in_flight = Some(InFlight {
            generation: self.generation,
            spec: self.spec.clone(),
            handle,
        });
        self.display.loading = true;
        debug!(
            generation = %self.generation,
            query = %self.spec.query,
            page = self.spec.page,
            "issuing search request"
        );
        IssuedRequest {
            generation: self.generation,
            spec: self.spec.clone(),
            cancel: token,
        }
    }

    fn shows_current_listing(&self) -> bool {
        self.shown
            .as_ref()
            .is_some_and(|shown| shown.listing == listing_of(&self.spec))
    }

    fn merge(&mut self, spec: &SearchSpecification, result: SearchResult) {
        let listing = listing_of(spec);
        let append = self.mode == ScrollMode::Infinite
            && self
                .shown
                .as_ref()
                .is_some_and(|shown| shown.listing == listing && spec.page == shown.page + 1);
        if append {
            self.display.results.extend(result.results);
        } else {
            self.display.results = result.results;
        }
        self.shown = Some(Shown {
            listing,
            page: spec.page,
        });
        self.display.pagination = Some(result.pagination);
        if let Some(facets) = result.filters {
            self.display.facets = facets;
        }
        self.display.error = None;
    }
}

fn strip_sentinel(value: String) -> String {
    if value.eq_ignore_ascii_case(ALL_SENTINEL) {
        String::new()
    } else {
        value
    }
}
