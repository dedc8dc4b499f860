//! Cooperative cancellation.
//!
//! Combinatorial searches check a [`CancellationToken`] at fixed checkpoints: every iteration of
//! a fixed-point loop, every node visited by a deep search, and every branch attempted by
//! associative matching. A triggered token turns the next checkpoint into a
//! [`Cancelled`](crate::error::Cancelled) error, which unwinds the whole computation.

use crate::error::{Cancelled, Error};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// A cancellation flag with an optional deadline.
///
/// Clones share the same flag, so the token handed to a [`Context`](crate::context::Context) can
/// be cancelled from another thread through a clone kept by the caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Creates a token that is never triggered unless [`CancellationToken::cancel`] is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that triggers once `timeout` has elapsed from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Triggers the token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns true if the token was cancelled explicitly or its deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline_passed()
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }

    /// Returns an error if the token has been triggered.
    pub fn checkpoint(&self) -> Result<(), Error> {
        if self.flag.load(Ordering::Relaxed) {
            tracing::debug!("computation cancelled");
            return Err(Cancelled { deadline_passed: false }.into());
        }
        if self.deadline_passed() {
            tracing::debug!("computation ran past its deadline");
            return Err(Cancelled { deadline_passed: true }.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(token.checkpoint().is_ok());

        handle.cancel();
        assert!(token.is_cancelled());
        assert_eq!(
            token.checkpoint(),
            Err(Error::from(Cancelled { deadline_passed: false })),
        );
    }

    #[test]
    fn elapsed_deadline() {
        let token = CancellationToken::with_timeout(Duration::ZERO);
        let error = token.checkpoint().unwrap_err();
        assert!(error.is_cancelled());
        assert_eq!(error, Cancelled { deadline_passed: true }.into());
    }

    #[test]
    fn cancel_from_another_thread() {
        let token = CancellationToken::new();
        let handle = token.clone();
        std::thread::spawn(move || handle.cancel()).join().unwrap();
        assert!(token.checkpoint().is_err());
    }
}
