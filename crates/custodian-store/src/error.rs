//! Errors raised by stores and the record repository.

use custodian_crypto_core::CryptoError;
use thiserror::Error;

/// Errors reported by a [`SecureStore`](crate::SecureStore) backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The platform store refused or failed the operation.
    #[error("secure store backend error: {0}")]
    Backend(String),

    /// A thread panicked while holding the store lock.
    #[error("secure store lock poisoned")]
    Poisoned,
}

/// Errors from [`RecordRepository`](crate::RecordRepository).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Store-level failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Encryption, decryption or record (de)serialization failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// No record is stored under this name.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Record names must be non-empty.
    #[error("invalid record name: {0:?}")]
    InvalidName(String),
}
