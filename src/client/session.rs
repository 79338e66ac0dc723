//! Async driver that runs a [`QueryOrchestrator`] against a [`SearchTransport`].
//!
//! The session owns the orchestrator on a single task. UI input arrives on an
//! mpsc channel, transport calls run as spawned tasks in a `JoinSet`, and every
//! state change is published on a `watch` channel for the view to render.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use crate::client::cancel::Generation;
use crate::client::orchestrator::{
    Completion, DisplayState, IssuedRequest, Phase, QueryOrchestrator, SpecChange,
};
use crate::client::transport::{SearchTransport, TransportError};
use crate::search::{SearchResult, SearchSpecification};

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Change(SpecChange),
    LoadMore,
    /// Re-run the current specification after the debounce.
    Refresh,
    Shutdown,
}

/// What the view sees after each event.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub spec: SearchSpecification,
    pub phase: Phase,
    pub display: DisplayState,
    /// UI events handled so far.
    pub processed: u64,
}

impl Snapshot {
    fn of(orchestrator: &QueryOrchestrator, processed: u64) -> Self {
        Self {
            spec: orchestrator.spec().clone(),
            phase: orchestrator.phase(),
            display: orchestrator.display().clone(),
            processed,
        }
    }
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub issued: u64,
    pub applied: u64,
    pub stale: u64,
    pub cancelled: u64,
    pub failed: u64,
}

impl SessionStats {
    fn record(&mut self, completion: Completion) {
        match completion {
            Completion::Applied => self.applied += 1,
            Completion::Stale => self.stale += 1,
            Completion::Cancelled => self.cancelled += 1,
            Completion::Failed => self.failed += 1,
            Completion::Ignored => {}
        }
    }
}

pub struct SessionHandle {
    events: mpsc::Sender<UiEvent>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<SessionStats>,
}

impl SessionHandle {
    /// Returns `false` once the session has stopped.
    pub async fn send(&self, event: UiEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn current(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Tear the session down and wait for it to finish.
    pub async fn shutdown(self) -> Result<SessionStats, JoinError> {
        let _ = self.events.send(UiEvent::Shutdown).await;
        self.task.await
    }
}

/// Spawn a session that immediately loads the orchestrator's current specification.
pub fn spawn_session<T: SearchTransport>(
    orchestrator: QueryOrchestrator,
    transport: Arc<T>,
) -> SessionHandle {
    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::of(&orchestrator, 0));
    let task = tokio::spawn(run(orchestrator, transport, events_rx, snapshot_tx));
    SessionHandle {
        events: events_tx,
        snapshots: snapshot_rx,
        task,
    }
}

type Outcome = (Generation, Result<SearchResult, TransportError>);

async fn run<T: SearchTransport>(
    mut orchestrator: QueryOrchestrator,
    transport: Arc<T>,
    mut events: mpsc::Receiver<UiEvent>,
    snapshots: watch::Sender<Snapshot>,
) -> SessionStats {
    let mut stats = SessionStats::default();
    let mut processed = 0u64;
    let mut tasks: JoinSet<Outcome> = JoinSet::new();

    if let Some(request) = orchestrator.issue_now() {
        dispatch(&mut tasks, &transport, request, &mut stats);
    }
    snapshots.send_replace(Snapshot::of(&orchestrator, processed));

    loop {
        let deadline = orchestrator.next_deadline();
        tokio::select! {
            event = events.recv() => {
                let now = Instant::now();
                processed += 1;
                match event {
                    None | Some(UiEvent::Shutdown) => break,
                    Some(UiEvent::Change(change)) => {
                        orchestrator.apply(now, change);
                    }
                    Some(UiEvent::Refresh) => orchestrator.refresh(now),
                    Some(UiEvent::LoadMore) => {
                        if let Some(request) = orchestrator.load_more(now) {
                            dispatch(&mut tasks, &transport, request, &mut stats);
                        }
                    }
                }
            }
            _ = wait_until(deadline) => {
                if let Some(request) = orchestrator.poll(Instant::now()) {
                    dispatch(&mut tasks, &transport, request, &mut stats);
                }
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                match joined {
                    Ok((generation, outcome)) => {
                        stats.record(orchestrator.complete(generation, outcome));
                    }
                    Err(err) if err.is_cancelled() => {}
                    Err(err) => warn!(error = %err, "search task panicked"),
                }
            }
        }
        snapshots.send_replace(Snapshot::of(&orchestrator, processed));
    }

    orchestrator.teardown();
    tasks.abort_all();
    snapshots.send_replace(Snapshot::of(&orchestrator, processed));
    debug!(?stats, "query session ended");
    stats
}

fn dispatch<T: SearchTransport>(
    tasks: &mut JoinSet<Outcome>,
    transport: &Arc<T>,
    request: IssuedRequest,
    stats: &mut SessionStats,
) {
    stats.issued += 1;
    let transport = Arc::clone(transport);
    let IssuedRequest {
        generation,
        spec,
        cancel,
    } = request;
    tasks.spawn(async move { (generation, transport.search(spec, cancel).await) });
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::orchestrator::ScrollMode;
    use crate::client::transport::LocalTransport;
    use crate::search::SearchEngine;
    use crate::store::{CatalogGenerator, Dataset, RecordStore};
    use std::time::Duration;

    fn transport() -> Arc<LocalTransport> {
        let records = CatalogGenerator::new(Dataset::Products, 40, 7).generate();
        let store = RecordStore::new(records).unwrap();
        Arc::new(LocalTransport::new(Arc::new(SearchEngine::new(store))))
    }

    #[tokio::test(start_paused = true)]
    async fn initial_load_populates_display() {
        let orchestrator = QueryOrchestrator::new(
            SearchSpecification::default().with_limit(12),
            ScrollMode::Paged,
            Duration::from_millis(300),
        );
        let handle = spawn_session(orchestrator, transport());
        let mut rx = handle.snapshots();
        let snapshot = rx
            .wait_for(|s| s.phase == Phase::Idle && !s.display.results.is_empty())
            .await
            .unwrap()
            .clone();
        assert_eq!(snapshot.display.results.len(), 12);
        assert_eq!(snapshot.display.pagination.unwrap().total_count, 40);

        let stats = handle.shutdown().await.unwrap();
        assert_eq!(stats.issued, 1);
        assert_eq!(stats.applied, 1);
    }
}
