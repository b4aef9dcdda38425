//! Single-shot lockout timer on the tokio runtime.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A scheduled lockout expiry.
///
/// Dropping the timer aborts the scheduled task, so at most one expiry per
/// state machine is ever pending.
#[derive(Debug)]
pub(crate) struct LockoutTimer {
    ends_at: Instant,
    generation: u64,
    handle: JoinHandle<()>,
}

impl LockoutTimer {
    /// Schedule `on_expire(generation)` to run after `duration`.
    ///
    /// Must be called from within a tokio runtime. Callers pass an already
    /// clamped duration; one that overflows the clock fires immediately.
    pub(crate) fn start<F>(duration: Duration, generation: u64, on_expire: F) -> Self
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let now = Instant::now();
        let ends_at = now.checked_add(duration).unwrap_or(now);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(ends_at).await;
            on_expire(generation);
        });
        Self {
            ends_at,
            generation,
            handle,
        }
    }

    pub(crate) const fn generation(&self) -> u64 {
        self.generation
    }

    /// Time left until expiry; zero once the deadline has passed.
    pub(crate) fn remaining(&self) -> Duration {
        self.ends_at.saturating_duration_since(Instant::now())
    }

    pub(crate) fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for LockoutTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
