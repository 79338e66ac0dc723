//! Query client: debounce, cancel, and apply search responses in order.
//!
//! - [`orchestrator`]: synchronous state machine deciding when to issue and what to keep
//! - [`session`]: tokio driver wiring the orchestrator to a transport and a view
//! - [`transport`]: HTTP and in-process search transports
//! - [`cancel`]: cancellation tokens and request generations

pub mod cancel;
pub mod orchestrator;
pub mod session;
pub mod transport;

pub use cancel::{CancellationHandle, CancellationToken, Generation, cancellation_pair};
pub use orchestrator::{
    Completion, DisplayState, IssuedRequest, Phase, QueryOrchestrator, ScrollMode, SpecChange,
};
pub use session::{SessionHandle, SessionStats, Snapshot, UiEvent, spawn_session};
pub use transport::{HttpTransport, LocalTransport, SearchTransport, TransportError};
