//! `custodian-crypto-core`: key management and authenticated encryption.
//!
//! Zero network, zero async. The application root builds one
//! [`KeyManager`], one [`AuditLog`] and one [`EncryptionEngine`] and hands
//! them out by reference or `Arc`.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod algorithm;
pub mod key_spec;
pub mod keys;

pub mod aead;
pub mod integrity;

pub mod audit;
pub mod config;
pub mod engine;
pub mod record;

pub use aead::{AeadLayer, HybridCipher, RingAead, SealedLayer, SealedParts};
pub use algorithm::AlgorithmTag;
pub use audit::{AuditEntry, AuditEvent, AuditEventKind, AuditLog};
pub use config::EngineConfig;
pub use engine::EncryptionEngine;
pub use error::CryptoError;
pub use key_spec::KeySpec;
pub use keys::{KeyManager, KeySource};
pub use memory::SecretBuffer;
pub use record::SecureRecord;

/// Current time as seconds since the Unix epoch.
#[must_use]
pub fn current_epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
