//! Request cancellation and generation tracking.
//!
//! `CancellationToken` / `CancellationHandle` pair: the token travels with the
//! transport call, the handle stays with the orchestrator. Cancellation is
//! cooperative; a transport that ignores it is still safe because every
//! response is also checked against the request [`Generation`].

use tokio_util::sync::CancellationToken as Inner;

/// Observed by the transport to abort a superseded request. It cannot cancel.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Inner,
}

/// Held by the orchestrator to cancel an in-flight request.
#[derive(Debug)]
pub struct CancellationHandle {
    inner: Inner,
}

pub fn cancellation_pair() -> (CancellationToken, CancellationHandle) {
    let inner = Inner::new();
    (
        CancellationToken {
            inner: inner.clone(),
        },
        CancellationHandle { inner },
    )
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Resolves once the paired handle cancels. Returns immediately if it already has.
    pub async fn cancelled(&self) {
        self.inner.cancelled().await
    }
}

impl CancellationHandle {
    /// Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

/// Correlation token for one issued request. Strictly increasing per orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const fn initial() -> Self {
        Self(0)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn token_observes_handle() {
        let (token, handle) = cancellation_pair();
        assert!(!token.is_cancelled());
        handle.cancel();
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_future_wakes_waiter() {
        let (token, handle) = cancellation_pair();
        let waiter = tokio::spawn(async move { token.cancelled().await });
        tokio::task::yield_now().await;
        handle.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter woke")
            .expect("task completed");
    }

    #[tokio::test]
    async fn cancelled_future_resolves_after_the_fact() {
        let (token, handle) = cancellation_pair();
        handle.cancel();
        tokio::time::timeout(Duration::from_millis(50), token.cancelled())
            .await
            .expect("already cancelled");
    }

    #[tokio::test]
    async fn clones_share_cancellation() {
        let (token, handle) = cancellation_pair();
        let copy = token.clone();
        drop(token);
        handle.cancel();
        assert!(copy.is_cancelled());
        tokio::time::timeout(Duration::from_millis(50), copy.cancelled())
            .await
            .expect("clone observes cancel");
    }

    #[test]
    fn generations_increase() {
        let g0 = Generation::initial();
        let g1 = g0.next();
        assert!(g1 > g0);
        assert_eq!(g1.next().get(), 2);
    }
}
