//! Authentication settings, stored as plain JSON alongside the engine config.

use std::path::Path;
use std::time::Duration;

use custodian_crypto_core::config::{load_json_or_default, save_json_atomic};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Longest lockout the machine will schedule (one year).
pub const MAX_LOCKOUT_SECS: u64 = 31_536_000;

/// Retry and lockout policy for the state machine.
///
/// All fields have defaults, so a partial or missing file still loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// Failed attempts tolerated before the lockout starts.
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    /// Capped at [`MAX_LOCKOUT_SECS`] when applied.
    #[serde(default = "default_lockout_duration_secs")]
    pub lockout_duration_secs: u64,
    /// User-facing explanation shown in the biometric prompt.
    #[serde(default = "default_prompt_reason")]
    pub prompt_reason: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: default_max_retry_attempts(),
            lockout_duration_secs: default_lockout_duration_secs(),
            prompt_reason: default_prompt_reason(),
        }
    }
}

const fn default_max_retry_attempts() -> u32 {
    3
}

const fn default_lockout_duration_secs() -> u64 {
    30
}

fn default_prompt_reason() -> String {
    "Authenticate to access your credentials".to_owned()
}

impl AuthConfig {
    /// The lockout length actually applied, clamped to [`MAX_LOCKOUT_SECS`].
    #[must_use]
    pub const fn lockout_duration(&self) -> Duration {
        let secs = if self.lockout_duration_secs > MAX_LOCKOUT_SECS {
            MAX_LOCKOUT_SECS
        } else {
            self.lockout_duration_secs
        };
        Duration::from_secs(secs)
    }

    /// # Errors
    ///
    /// Returns `AuthError::InvalidConfig` when `max_retry_attempts` is 0.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.max_retry_attempts == 0 {
            return Err(AuthError::InvalidConfig(
                "maxRetryAttempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Load from `path`, falling back to defaults when the file is missing
    /// or invalid.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        load_json_or_default(path)
    }

    /// Persist to `path` atomically.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the write or rename fails.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        save_json_atomic(self, path)
    }
}
