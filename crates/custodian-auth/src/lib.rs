//! `custodian-auth`: biometric authentication attempts with bounded retries
//! and a timed lockout.
//!
//! The [`AuthenticationStateMachine`] is independent of the encryption
//! path: callers observe its state (via [`AuthenticationStateMachine::subscribe`]
//! or [`AuthenticationStateMachine::state`]) and only unlock encryption once
//! it reports [`AuthAttemptState::Authenticated`].

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod config;
pub mod error;
pub mod machine;
pub mod prompt;
pub mod state;
mod timer;

pub use config::AuthConfig;
pub use error::AuthError;
pub use machine::AuthenticationStateMachine;
pub use prompt::{
    create_prompt, BiometricAvailability, BiometricPrompt, BiometryType, NullBiometricPrompt,
    PromptError,
};
pub use state::AuthAttemptState;
pub use tokio_util::sync::CancellationToken;
