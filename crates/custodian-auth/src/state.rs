//! Observable state of an authentication attempt.

use serde::Serialize;

use crate::error::AuthError;

/// Observable state of the authentication state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AuthAttemptState {
    #[default]
    NotAuthenticated,
    Authenticating,
    Authenticated,
    #[serde(rename_all = "camelCase")]
    Failed {
        reason: String,
        attempts_remaining: u32,
    },
    NotAvailable {
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    LockedOut {
        reason: String,
        remaining_seconds: u64,
    },
}

impl AuthAttemptState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    #[must_use]
    pub const fn is_locked_out(&self) -> bool {
        matches!(self, Self::LockedOut { .. })
    }

    /// Convert the state into a `Result` for callers gating on it with `?`.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] matching every state except `Authenticated`.
    pub fn require_authenticated(&self) -> Result<(), AuthError> {
        match self {
            Self::Authenticated => Ok(()),
            Self::NotAuthenticated => Err(AuthError::NotAuthenticated),
            Self::Authenticating => Err(AuthError::AuthenticationInProgress),
            Self::Failed { reason, .. } => Err(AuthError::BiometricAuthFailed(reason.clone())),
            Self::NotAvailable { reason } => Err(AuthError::BiometricUnavailable(reason.clone())),
            Self::LockedOut {
                remaining_seconds, ..
            } => Err(AuthError::LockedOut {
                remaining_seconds: *remaining_seconds,
            }),
        }
    }
}
