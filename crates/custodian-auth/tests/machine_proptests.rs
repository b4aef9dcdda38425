//! Property tests: retry accounting over arbitrary attempt sequences.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use custodian_auth::{
    AuthAttemptState, AuthConfig, AuthenticationStateMachine, BiometricAvailability,
    BiometricPrompt, BiometryType, CancellationToken, PromptError,
};
use custodian_crypto_core::AuditLog;
use proptest::prelude::*;

/// Answers each prompt with whatever outcome was queued last.
struct Oracle {
    next: Mutex<Option<Result<bool, PromptError>>>,
    calls: AtomicUsize,
}

impl BiometricPrompt for Oracle {
    fn is_available(&self) -> BiometricAvailability {
        BiometricAvailability::available(BiometryType::TouchId)
    }

    async fn evaluate(&self, _reason: &str) -> Result<bool, PromptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.next.lock().unwrap().take();
        next.unwrap_or(Ok(false))
    }
}

fn outcome() -> impl Strategy<Value = Result<bool, PromptError>> {
    prop_oneof![
        Just(Ok(true)),
        Just(Ok(false)),
        Just(Err(PromptError::UserCancelled)),
        Just(Err(PromptError::SystemCancelled)),
        Just(Err(PromptError::Failed("sensor".into()))),
    ]
}

proptest! {
    #[test]
    fn retry_count_follows_model(
        max in 1u32..5,
        outcomes in proptest::collection::vec(outcome(), 1..20),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();

        runtime.block_on(async {
            let oracle = Arc::new(Oracle {
                next: Mutex::new(None),
                calls: AtomicUsize::new(0),
            });
            let machine =
                AuthenticationStateMachine::new(Arc::clone(&oracle), Arc::new(AuditLog::new()));
            let config = AuthConfig {
                max_retry_attempts: max,
                ..AuthConfig::default()
            };
            let token = CancellationToken::new();

            let mut retries = 0u32;
            let mut locked = false;
            for outcome in outcomes {
                let calls_before = oracle.calls.load(Ordering::SeqCst);
                *oracle.next.lock().unwrap() = Some(outcome.clone());
                let state = machine.authenticate(&config, &token).await.unwrap();
                let prompted = oracle.calls.load(Ordering::SeqCst) > calls_before;

                if locked {
                    prop_assert!(state.is_locked_out());
                    prop_assert!(!prompted);
                    continue;
                }
                prop_assert!(prompted);
                match outcome {
                    Ok(true) => {
                        retries = 0;
                        prop_assert_eq!(&state, &AuthAttemptState::Authenticated);
                    }
                    Ok(false) | Err(PromptError::Failed(_)) => {
                        retries += 1;
                        if retries >= max {
                            locked = true;
                            prop_assert!(state.is_locked_out());
                        } else {
                            let is_failed = matches!(
                                state,
                                AuthAttemptState::Failed { attempts_remaining, .. }
                                    if attempts_remaining == max - retries
                            );
                            prop_assert!(is_failed, "unexpected state {:?}", state);
                        }
                    }
                    Err(_) => prop_assert_eq!(&state, &AuthAttemptState::NotAuthenticated),
                }
                prop_assert_eq!(machine.retry_count(), retries);
                prop_assert!(machine.retry_count() <= max);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
