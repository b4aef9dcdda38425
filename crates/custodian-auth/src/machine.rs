//! Authentication-attempt state machine.
//!
//! ```text
//! NotAuthenticated ──► Authenticating ──┬─ match ─────────────► Authenticated
//!        ▲                              ├─ mismatch ──────────► Failed
//!        │                              ├─ mismatch (budget) ─► LockedOut
//!        │                              ├─ sensor unusable ───► NotAvailable
//!        ├──────────────────────────────┴─ cancelled
//!        └──────── lockout expiry / reset_lockout() ◄── LockedOut
//! ```
//!
//! State changes are published on a `watch` channel; [`AuthenticationStateMachine::state`]
//! gives a snapshot for polling callers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use custodian_crypto_core::{AuditEvent, AuditLog};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::prompt::{BiometricPrompt, PromptError};
use crate::state::AuthAttemptState;
use crate::timer::LockoutTimer;

/// Reason attached to `LockedOut` while a lockout is still running.
const LOCKOUT_ACTIVE_REASON: &str = "too many failed attempts, try again later";

/// Drives biometric attempts, counts failures and enforces the lockout.
///
/// One instance per protected resource, owned by the application root.
pub struct AuthenticationStateMachine<P> {
    prompt: P,
    shared: Arc<Shared>,
}

/// State reachable from the lockout timer task (which holds it weakly).
struct Shared {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<AuthAttemptState>,
    audit: Arc<AuditLog>,
}

#[derive(Default)]
struct Inner {
    state: AuthAttemptState,
    retry_count: u32,
    lockout: Option<LockoutTimer>,
    next_generation: u64,
    /// Set from `begin_attempt` until the attempt concludes or is dropped.
    /// Independent of `state`, which a reset may overwrite mid-prompt.
    prompt_in_flight: bool,
}

/// How a single prompt ended.
enum Verdict {
    Matched,
    Rejected(String),
    Cancelled,
    Unavailable(String),
}

impl Verdict {
    fn from_prompt(result: Result<bool, PromptError>) -> Self {
        match result {
            Ok(true) => Self::Matched,
            Ok(false) => Self::Rejected("biometric did not match".into()),
            Err(err) => match AuthError::from(err) {
                AuthError::UserCancelled => Self::Cancelled,
                AuthError::BiometricUnavailable(reason) => Self::Unavailable(reason),
                other => Self::Rejected(other.to_string()),
            },
        }
    }
}

impl<P: BiometricPrompt> AuthenticationStateMachine<P> {
    /// Create a machine in `NotAuthenticated` with a zero retry count.
    pub fn new(prompt: P, audit: Arc<AuditLog>) -> Self {
        let (state_tx, _) = watch::channel(AuthAttemptState::NotAuthenticated);
        Self {
            prompt,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::default()),
                state_tx,
                audit,
            }),
        }
    }

    /// Run one authentication attempt and return the resulting state.
    ///
    /// While a lockout is running the prompt is not shown and `LockedOut`
    /// is returned with the remaining time. Cancelling `cancel` while the
    /// prompt is up ends the attempt as `NotAuthenticated` without counting
    /// it as a failure. Dropping the returned future has the same effect.
    ///
    /// Must be awaited on a tokio runtime (the lockout timer is a task).
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidConfig` if `config` does not validate
    /// - `AuthError::AuthenticationInProgress` if another attempt is outstanding
    pub async fn authenticate(
        &self,
        config: &AuthConfig,
        cancel: &CancellationToken,
    ) -> Result<AuthAttemptState, AuthError> {
        config.validate()?;
        if let Some(locked) = self.shared.begin_attempt()? {
            return Ok(locked);
        }
        let attempt = AttemptGuard {
            shared: &self.shared,
            armed: true,
        };

        let availability = self.prompt.is_available();
        if !availability.available {
            let reason = availability
                .reason
                .unwrap_or_else(|| PromptError::NotAvailable.to_string());
            return Ok(attempt.finish(config, Verdict::Unavailable(reason)));
        }

        let verdict = tokio::select! {
            biased;
            () = cancel.cancelled() => Verdict::Cancelled,
            result = self.prompt.evaluate(&config.prompt_reason) => Verdict::from_prompt(result),
        };
        Ok(attempt.finish(config, verdict))
    }

    /// Cancel any lockout, zero the retry count and return to `NotAuthenticated`.
    pub fn reset_lockout(&self) {
        let mut inner = self.shared.lock();
        self.shared.end_lockout(&mut inner);
        tracing::info!("lockout reset");
    }

    #[must_use]
    pub fn state(&self) -> AuthAttemptState {
        self.shared.lock().state.clone()
    }

    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.shared.lock().retry_count
    }

    /// Time left on the running lockout, if any.
    #[must_use]
    pub fn lockout_remaining(&self) -> Option<Duration> {
        self.shared
            .lock()
            .lockout
            .as_ref()
            .map(LockoutTimer::remaining)
            .filter(|remaining| !remaining.is_zero())
    }

    /// Receive every state transition from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthAttemptState> {
        self.shared.state_tx.subscribe()
    }

    #[must_use]
    pub fn audit_log(&self) -> &Arc<AuditLog> {
        &self.shared.audit
    }

    #[must_use]
    pub const fn prompt(&self) -> &P {
        &self.prompt
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &mut Inner, state: AuthAttemptState) {
        tracing::debug!(?state, retry_count = inner.retry_count, "auth state transition");
        inner.state = state.clone();
        self.state_tx.send_replace(state);
    }

    /// Gate an attempt: refuse during a lockout, otherwise enter `Authenticating`.
    ///
    /// Returns `Some(LockedOut)` when the prompt must not be shown.
    fn begin_attempt(&self) -> Result<Option<AuthAttemptState>, AuthError> {
        let mut inner = self.lock();
        if inner.prompt_in_flight {
            return Err(AuthError::AuthenticationInProgress);
        }

        if let Some(remaining) = inner.lockout.as_ref().map(LockoutTimer::remaining) {
            if remaining.is_zero() {
                // Deadline passed but the timer task has not run yet.
                self.end_lockout(&mut inner);
            } else {
                let remaining_seconds = ceil_secs(remaining);
                let state = AuthAttemptState::LockedOut {
                    reason: LOCKOUT_ACTIVE_REASON.to_owned(),
                    remaining_seconds,
                };
                self.publish(&mut inner, state.clone());
                drop(inner);
                self.audit.record(AuditEvent::AccessDenied {
                    reason: format!("locked out for {remaining_seconds}s"),
                });
                return Ok(Some(state));
            }
        }

        inner.prompt_in_flight = true;
        self.publish(&mut inner, AuthAttemptState::Authenticating);
        Ok(None)
    }

    fn conclude(self: &Arc<Self>, config: &AuthConfig, verdict: Verdict) -> AuthAttemptState {
        let mut inner = self.lock();
        inner.prompt_in_flight = false;
        let mut events = Vec::new();

        let state = match verdict {
            Verdict::Matched => {
                inner.retry_count = 0;
                events.push(AuditEvent::BiometricAuth { success: true });
                AuthAttemptState::Authenticated
            }
            Verdict::Cancelled => AuthAttemptState::NotAuthenticated,
            Verdict::Unavailable(reason) => AuthAttemptState::NotAvailable { reason },
            Verdict::Rejected(cause) => {
                inner.retry_count = inner.retry_count.saturating_add(1);
                events.push(AuditEvent::BiometricAuth { success: false });
                tracing::info!(retry_count = inner.retry_count, %cause, "biometric attempt failed");

                if inner.retry_count >= config.max_retry_attempts {
                    let duration = config.lockout_duration();
                    self.start_lockout(&mut inner, duration);
                    let reason = format!("too many failed attempts ({})", inner.retry_count);
                    events.push(AuditEvent::AccessDenied {
                        reason: reason.clone(),
                    });
                    AuthAttemptState::LockedOut {
                        reason,
                        remaining_seconds: ceil_secs(duration),
                    }
                } else {
                    let attempts_remaining =
                        config.max_retry_attempts.saturating_sub(inner.retry_count);
                    AuthAttemptState::Failed {
                        reason: format!("{attempts_remaining} attempts remaining"),
                        attempts_remaining,
                    }
                }
            }
        };

        self.publish(&mut inner, state.clone());
        drop(inner);
        for event in events {
            self.audit.record(event);
        }
        state
    }

    fn start_lockout(self: &Arc<Self>, inner: &mut Inner, duration: Duration) {
        if let Some(previous) = inner.lockout.take() {
            previous.cancel();
        }
        inner.next_generation = inner.next_generation.wrapping_add(1);

        let weak = Arc::downgrade(self);
        inner.lockout = Some(LockoutTimer::start(
            duration,
            inner.next_generation,
            move |generation| {
                if let Some(shared) = weak.upgrade() {
                    shared.lockout_elapsed(generation);
                }
            },
        ));
        tracing::warn!(duration_secs = duration.as_secs(), "lockout started");
    }

    fn lockout_elapsed(&self, generation: u64) {
        let mut inner = self.lock();
        let current = inner
            .lockout
            .as_ref()
            .is_some_and(|timer| timer.generation() == generation);
        if !current {
            tracing::debug!(generation, "stale lockout expiry ignored");
            return;
        }
        self.end_lockout(&mut inner);
        tracing::info!("lockout expired");
    }

    fn end_lockout(&self, inner: &mut Inner) {
        if let Some(timer) = inner.lockout.take() {
            timer.cancel();
        }
        inner.retry_count = 0;
        self.publish(inner, AuthAttemptState::NotAuthenticated);
    }
}

/// Reverts `Authenticating` to `NotAuthenticated` if the attempt future is
/// dropped before the prompt resolves.
struct AttemptGuard<'a> {
    shared: &'a Arc<Shared>,
    armed: bool,
}

impl AttemptGuard<'_> {
    fn finish(mut self, config: &AuthConfig, verdict: Verdict) -> AuthAttemptState {
        self.armed = false;
        self.shared.conclude(config, verdict)
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.shared.lock();
        inner.prompt_in_flight = false;
        if inner.state == AuthAttemptState::Authenticating {
            tracing::debug!("authentication attempt abandoned");
            self.shared
                .publish(&mut inner, AuthAttemptState::NotAuthenticated);
        }
    }
}

/// Whole seconds, rounded up.
fn ceil_secs(duration: Duration) -> u64 {
    duration
        .as_secs()
        .saturating_add(u64::from(duration.subsec_nanos() > 0))
}
