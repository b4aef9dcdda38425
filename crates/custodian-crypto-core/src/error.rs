//! Cryptographic error types for `custodian-crypto-core`.

use thiserror::Error;

use crate::algorithm::AlgorithmTag;

/// Errors produced by key management and the encryption engine.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The key spec's `expires_at` lies in the past.
    #[error("key expired: {key_id}")]
    KeyExpired {
        /// Identifier of the expired key.
        key_id: String,
    },

    /// No cached key material exists for this key identifier.
    #[error("key not found: {key_id}")]
    KeyNotFound {
        /// Identifier that was looked up.
        key_id: String,
    },

    /// The CSPRNG failed while generating key material.
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Integrity hash mismatch or AEAD authentication failure.
    ///
    /// Covers both the keyed hash check and tag verification; the caller
    /// never learns which layer rejected the record.
    #[error("integrity check failed: record has been tampered with")]
    IntegrityCheckFailed,

    /// The algorithm is declared but has no cipher behind it.
    #[error("algorithm not implemented: {0}")]
    AlgorithmNotImplemented(AlgorithmTag),

    /// The operation cannot be performed by this key source.
    #[error("operation not supported: {0}")]
    OperationNotSupported(String),

    /// Key spec is inconsistent (wrong key size for the algorithm, etc.).
    #[error("invalid key spec: {0}")]
    InvalidKeySpec(String),

    /// Low-level cipher failure while sealing.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Secure memory allocation or lock failure.
    #[error("secure memory error: {0}")]
    SecureMemory(String),

    /// Record (de)serialization failure.
    #[error("record format error: {0}")]
    RecordFormat(String),
}
