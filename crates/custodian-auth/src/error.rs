use thiserror::Error;

use crate::prompt::PromptError;

/// Errors surfaced by the authentication layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The biometric sensor cannot be used (hardware absent, not enrolled,
    /// no device passcode).
    #[error("biometric authentication unavailable: {0}")]
    BiometricUnavailable(String),

    /// The prompt resolved but the user was not recognized.
    #[error("biometric authentication failed: {0}")]
    BiometricAuthFailed(String),

    /// Too many failed attempts; retry after the lockout elapses.
    #[error("locked out for {remaining_seconds}s")]
    LockedOut {
        /// Whole seconds until the lockout ends, rounded up.
        remaining_seconds: u64,
    },

    /// The prompt was dismissed by the user, the app or the system.
    #[error("authentication cancelled")]
    UserCancelled,

    /// No successful authentication has happened yet.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A prompt is already outstanding on this state machine.
    #[error("an authentication attempt is already in progress")]
    AuthenticationInProgress,

    /// The supplied [`AuthConfig`](crate::AuthConfig) is unusable.
    #[error("invalid auth config: {0}")]
    InvalidConfig(String),
}

impl From<PromptError> for AuthError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::UserCancelled
            | PromptError::AppCancelled
            | PromptError::SystemCancelled => Self::UserCancelled,
            PromptError::NotAvailable
            | PromptError::NotEnrolled
            | PromptError::PasscodeNotSet
            | PromptError::BiometryLockedBySystem => Self::BiometricUnavailable(err.to_string()),
            PromptError::Failed(_) => Self::BiometricAuthFailed(err.to_string()),
        }
    }
}
