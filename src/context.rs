//! Run context - cooperative cancellation and deadline
//!
//! Both are checked between units only, never inside one, so a unit's
//! transaction is always either committed whole or not started.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared flag flipped by a signal handler or an embedding caller
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// The underlying flag, for `signal_hook::flag::register`
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Why a run stopped before processing every unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interruption {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for Interruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interruption::Cancelled => write!(f, "cancelled"),
            Interruption::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub cancel: CancellationToken,
    pub deadline: Option<Instant>,
}

impl RunContext {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel, deadline: None }
    }

    /// Stop the run once `timeout` has elapsed from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Cancellation wins over the deadline when both apply
    pub fn check(&self) -> Option<Interruption> {
        if self.cancel.is_cancelled() {
            return Some(Interruption::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interruption::DeadlineExceeded),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_runs() {
        assert_eq!(RunContext::default().check(), None);
        let ctx = RunContext::default().with_timeout(Duration::from_secs(3600));
        assert_eq!(ctx.check(), None);
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancellationToken::new();
        let ctx = RunContext::new(token.clone());
        token.cancel();
        assert_eq!(ctx.check(), Some(Interruption::Cancelled));
    }

    #[test]
    fn test_elapsed_deadline() {
        let ctx = RunContext::default().with_timeout(Duration::ZERO);
        assert_eq!(ctx.check(), Some(Interruption::DeadlineExceeded));

        ctx.cancel.cancel();
        assert_eq!(ctx.check(), Some(Interruption::Cancelled));
    }
}
