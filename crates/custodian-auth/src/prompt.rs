//! Biometric prompt abstraction (Face ID, Touch ID, fingerprint, face unlock).
//!
//! The state machine only sees the [`BiometricPrompt`] trait. Platform
//! bindings live in the host application; [`NullBiometricPrompt`] is the
//! fallback when the host has none.
//!
//! ```text
//! BiometricPrompt (trait)
//! ├── <host platform binding>  (LocalAuthentication / BiometricPrompt API)
//! └── NullBiometricPrompt      (always unavailable, fallback)
//! ```

use std::fmt;
use std::future::Future;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Ways a biometric evaluation can end without a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    /// User dismissed the prompt.
    UserCancelled,
    /// The application withdrew the prompt.
    AppCancelled,
    /// The OS interrupted the prompt (app backgrounded, incoming call).
    SystemCancelled,
    /// No biometric hardware, or it is disabled.
    NotAvailable,
    /// Hardware present but no biometry enrolled.
    NotEnrolled,
    /// Device has no passcode, so biometry cannot be used.
    PasscodeNotSet,
    /// The OS itself locked biometry after too many mismatches.
    BiometryLockedBySystem,
    /// Platform-specific failure.
    Failed(String),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserCancelled => write!(f, "cancelled by user"),
            Self::AppCancelled => write!(f, "cancelled by application"),
            Self::SystemCancelled => write!(f, "cancelled by system"),
            Self::NotAvailable => write!(f, "biometric hardware not available"),
            Self::NotEnrolled => write!(f, "no biometry enrolled"),
            Self::PasscodeNotSet => write!(f, "device passcode not set"),
            Self::BiometryLockedBySystem => write!(f, "biometry locked by the system"),
            Self::Failed(msg) => write!(f, "biometric prompt failed: {msg}"),
        }
    }
}

impl std::error::Error for PromptError {}

// ---------------------------------------------------------------------------
// Capability detection result
// ---------------------------------------------------------------------------

/// Kind of biometric sensor on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BiometryType {
    None,
    FaceId,
    TouchId,
    OpticId,
    Fingerprint,
    Face,
}

impl BiometryType {
    /// Human-readable sensor name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::FaceId => "Face ID",
            Self::TouchId => "Touch ID",
            Self::OpticId => "Optic ID",
            Self::Fingerprint => "Fingerprint",
            Self::Face => "Face Unlock",
        }
    }
}

/// Result of biometric capability detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricAvailability {
    pub biometry_type: BiometryType,
    pub available: bool,
    /// Why the sensor cannot be used; `None` when `available`.
    pub reason: Option<String>,
}

impl BiometricAvailability {
    /// A usable sensor of the given type.
    #[must_use]
    pub const fn available(biometry_type: BiometryType) -> Self {
        Self {
            biometry_type,
            available: true,
            reason: None,
        }
    }

    /// No usable sensor, with the platform's explanation.
    #[must_use]
    pub fn unavailable(biometry_type: BiometryType, reason: &PromptError) -> Self {
        Self {
            biometry_type,
            available: false,
            reason: Some(reason.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt trait
// ---------------------------------------------------------------------------

/// Platform biometric prompt.
///
/// `evaluate` shows the native prompt and resolves once the user responds:
/// `Ok(true)` on a match, `Ok(false)` on a mismatch, `Err` when the prompt
/// ended without a verdict.
pub trait BiometricPrompt: Send + Sync {
    /// Check whether biometric evaluation can run right now.
    fn is_available(&self) -> BiometricAvailability;

    /// Show the prompt with `reason` as the user-facing explanation.
    fn evaluate(&self, reason: &str) -> impl Future<Output = Result<bool, PromptError>> + Send;
}

impl<T: BiometricPrompt> BiometricPrompt for std::sync::Arc<T> {
    fn is_available(&self) -> BiometricAvailability {
        (**self).is_available()
    }

    fn evaluate(&self, reason: &str) -> impl Future<Output = Result<bool, PromptError>> + Send {
        (**self).evaluate(reason)
    }
}

// ---------------------------------------------------------------------------
// Null prompt (fallback)
// ---------------------------------------------------------------------------

/// Fallback prompt when the host has no biometric binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBiometricPrompt;

impl BiometricPrompt for NullBiometricPrompt {
    fn is_available(&self) -> BiometricAvailability {
        BiometricAvailability::unavailable(BiometryType::None, &PromptError::NotAvailable)
    }

    async fn evaluate(&self, _reason: &str) -> Result<bool, PromptError> {
        Err(PromptError::NotAvailable)
    }
}

/// Fallback prompt for hosts that have not registered a platform binding.
#[must_use]
pub const fn create_prompt() -> NullBiometricPrompt {
    NullBiometricPrompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_prompt_is_not_available() {
        let availability = create_prompt().is_available();
        assert!(!availability.available);
        assert_eq!(availability.biometry_type, BiometryType::None);
        assert_eq!(
            availability.reason.as_deref(),
            Some("biometric hardware not available")
        );
    }

    #[tokio::test]
    async fn null_prompt_evaluate_returns_not_available() {
        let result = NullBiometricPrompt.evaluate("unlock").await;
        assert_eq!(result, Err(PromptError::NotAvailable));
    }

    #[test]
    fn prompt_error_display() {
        assert_eq!(PromptError::UserCancelled.to_string(), "cancelled by user");
        assert_eq!(
            PromptError::Failed("x".into()).to_string(),
            "biometric prompt failed: x"
        );
    }

    #[test]
    fn availability_serializes_camel_case() {
        let json =
            serde_json::to_value(BiometricAvailability::available(BiometryType::FaceId)).unwrap();
        assert_eq!(json["biometryType"], "faceId");
        assert_eq!(json["available"], true);
        assert!(json["reason"].is_null());
    }

    #[test]
    fn display_names() {
        assert_eq!(BiometryType::TouchId.display_name(), "Touch ID");
        assert_eq!(BiometryType::Face.display_name(), "Face Unlock");
    }
}
