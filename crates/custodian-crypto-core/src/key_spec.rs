//! Key specifications: identity, algorithm and expiry of a key.

use serde::{Deserialize, Serialize};

use crate::algorithm::AlgorithmTag;
use crate::error::CryptoError;

/// Description of a symmetric key. Identity is [`id`](Self::id).
///
/// Built once with [`KeySpec::new`] and the `with_*` methods; there are no
/// setters afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySpec {
    id: String,
    algorithm: AlgorithmTag,
    key_size_bits: u32,
    #[serde(default)]
    requires_biometric: bool,
    #[serde(default)]
    use_hardware_backed_store: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<u64>,
}

impl KeySpec {
    /// Create a spec with the algorithm's native key size, no biometric
    /// requirement, software storage and no expiry.
    pub fn new(id: impl Into<String>, algorithm: AlgorithmTag) -> Self {
        Self {
            id: id.into(),
            algorithm,
            key_size_bits: algorithm.key_size_bits(),
            requires_biometric: false,
            use_hardware_backed_store: false,
            expires_at: None,
        }
    }

    /// Override the declared key size.
    #[must_use]
    pub const fn with_key_size_bits(mut self, bits: u32) -> Self {
        self.key_size_bits = bits;
        self
    }

    /// Mark the key as requiring a biometric gate before use.
    #[must_use]
    pub const fn with_biometric(mut self, required: bool) -> Self {
        self.requires_biometric = required;
        self
    }

    /// Request a hardware-backed key store.
    #[must_use]
    pub const fn with_hardware_backed_store(mut self, hardware: bool) -> Self {
        self.use_hardware_backed_store = hardware;
        self
    }

    /// Set an expiry as Unix seconds.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: u64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn algorithm(&self) -> AlgorithmTag {
        self.algorithm
    }

    #[must_use]
    pub const fn key_size_bits(&self) -> u32 {
        self.key_size_bits
    }

    #[must_use]
    pub const fn requires_biometric(&self) -> bool {
        self.requires_biometric
    }

    #[must_use]
    pub const fn use_hardware_backed_store(&self) -> bool {
        self.use_hardware_backed_store
    }

    #[must_use]
    pub const fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    /// Key length in bytes (`key_size_bits / 8`).
    #[must_use]
    pub const fn key_len(&self) -> usize {
        (self.key_size_bits / 8) as usize
    }

    /// `true` when `expires_at` is strictly before `now_secs`.
    #[must_use]
    pub fn is_expired_at(&self, now_secs: u64) -> bool {
        self.expires_at.is_some_and(|at| at < now_secs)
    }

    /// Check the declared key size against the algorithm.
    ///
    /// # Errors
    ///
    /// - `CryptoError::AlgorithmNotImplemented` for the CBC placeholder
    /// - `CryptoError::InvalidKeySpec` if the id is empty or the size does
    ///   not match the algorithm
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.id.is_empty() {
            return Err(CryptoError::InvalidKeySpec("key id must not be empty".into()));
        }
        if !self.algorithm.is_implemented() {
            return Err(CryptoError::AlgorithmNotImplemented(self.algorithm));
        }
        let expected = self.algorithm.key_size_bits();
        if self.key_size_bits != expected {
            return Err(CryptoError::InvalidKeySpec(format!(
                "{} requires a {expected}-bit key, spec declares {} bits",
                self.algorithm, self.key_size_bits
            )));
        }
        Ok(())
    }
}
