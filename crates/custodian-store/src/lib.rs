//! `custodian-store`: persistence of [`SecureRecord`]s in an opaque
//! platform key-value store.
//!
//! The platform store (keychain, keystore) is reached through
//! [`SecureStore`]; [`GuardedStore`] adds shared/exclusive locking and
//! [`RecordRepository`] maps named records onto store entries.
//!
//! [`SecureRecord`]: custodian_crypto_core::SecureRecord

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod guarded;
pub mod repository;
pub mod store;

pub use error::{RepositoryError, StoreError};
pub use guarded::GuardedStore;
pub use repository::RecordRepository;
pub use store::{InMemorySecureStore, SecureStore};
