//! Encryption engine: seals payloads into [`SecureRecord`]s and opens them.
//!
//! # Encrypt pipeline
//!
//! 1. Expiry check (before any key lookup or cipher work)
//! 2. Key spec validation
//! 3. Key bytes from the [`KeySource`]
//! 4. Algorithm dispatch (AES-256-GCM, ChaCha20-Poly1305, Hybrid)
//! 5. Integrity hash over the final ciphertext and the full key
//!
//! # Decrypt pipeline
//!
//! 1. Expiry check
//! 2. Key bytes from the [`KeySource`] (existing keys only)
//! 3. Integrity hash check, strictly before any cipher operation
//! 4. Algorithm dispatch; Hybrid opens the outer layer first

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::aead::{AeadLayer, HybridCipher, RingAead, SealedLayer, SealedParts};
use crate::algorithm::AlgorithmTag;
use crate::audit::{AuditEvent, AuditLog};
use crate::config::EngineConfig;
use crate::current_epoch_secs;
use crate::error::CryptoError;
use crate::integrity;
use crate::key_spec::KeySpec;
use crate::keys::{KeyManager, KeySource};
use crate::memory::SecretBuffer;
use crate::record::{
    SecureRecord, META_FORMAT_VERSION, META_HARDWARE_BACKED, META_KEY_ID, META_KEY_SIZE_BITS,
    META_REQUIRES_BIOMETRIC, RECORD_FORMAT_VERSION,
};

/// Authenticated encryption over a pluggable key source.
///
/// Constructed once by the application root and shared by reference or
/// `Arc`; it holds no global state.
pub struct EncryptionEngine<K = KeyManager> {
    keys: K,
    config: EngineConfig,
    audit: Arc<AuditLog>,
    aes: RingAead,
    chacha: RingAead,
    hybrid: HybridCipher<RingAead, RingAead>,
}

impl<K: KeySource> EncryptionEngine<K> {
    pub fn new(keys: K, audit: Arc<AuditLog>, config: EngineConfig) -> Self {
        Self {
            keys,
            config,
            audit,
            aes: RingAead::aes_256_gcm(),
            chacha: RingAead::chacha20_poly1305(),
            hybrid: HybridCipher::standard(),
        }
    }

    /// The key source backing this engine.
    pub const fn keys(&self) -> &K {
        &self.keys
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn audit_log(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// Seal `plaintext` under the key described by `spec`.
    ///
    /// # Errors
    ///
    /// - `CryptoError::KeyExpired` if `spec` has expired (no key lookup happens)
    /// - `CryptoError::AlgorithmNotImplemented` for the CBC placeholder
    /// - `CryptoError::InvalidKeySpec` if the key size does not fit the algorithm
    /// - any error from the key source or the cipher
    pub fn encrypt(&self, plaintext: &[u8], spec: &KeySpec) -> Result<SecureRecord, CryptoError> {
        self.check_expiry(spec)?;
        spec.validate()?;

        let key = self.keys.get_or_create_key(spec)?;
        let sealed = self.seal(spec.algorithm(), plaintext, key.expose())?;
        let integrity_hash = integrity::hash(&sealed.ciphertext, key.expose()).to_vec();

        let record = SecureRecord::new(
            sealed,
            spec.algorithm(),
            current_epoch_secs(),
            record_metadata(spec),
            integrity_hash,
        );

        self.audit.record(AuditEvent::Encryption {
            key_id: spec.id().to_owned(),
            algorithm: spec.algorithm(),
        });
        Ok(record)
    }

    /// Verify and open `record` with the key described by `spec`.
    ///
    /// # Errors
    ///
    /// - `CryptoError::KeyExpired` if `spec` has expired (no key lookup happens)
    /// - `CryptoError::AlgorithmNotImplemented` for a CBC record
    /// - `CryptoError::InvalidKeySpec` if `spec` names another algorithm
    /// - `CryptoError::KeyNotFound` if the key source has no key for `spec`
    /// - `CryptoError::IntegrityCheckFailed` on a hash mismatch, malformed
    ///   nonce/tag, or failed AEAD tag
    pub fn decrypt(
        &self,
        record: &SecureRecord,
        spec: &KeySpec,
    ) -> Result<SecretBuffer, CryptoError> {
        self.check_expiry(spec)?;

        let algorithm = record.algorithm();
        if !algorithm.is_implemented() {
            return Err(CryptoError::AlgorithmNotImplemented(algorithm));
        }
        if spec.algorithm() != algorithm {
            return Err(CryptoError::InvalidKeySpec(format!(
                "record was sealed with {algorithm}, key {} is {}",
                spec.id(),
                spec.algorithm()
            )));
        }

        let key = self.keys.get_key(spec)?;

        if self.config.tamper_detection
            && !integrity::verify(record.ciphertext(), key.expose(), record.integrity_hash())
        {
            return Err(self.tampered(spec, "integrity hash mismatch"));
        }

        let plaintext = match self.open(algorithm, &record.sealed_parts(), key.expose()) {
            Ok(plaintext) => plaintext,
            Err(CryptoError::IntegrityCheckFailed) => {
                return Err(self.tampered(spec, "authentication tag mismatch"));
            }
            Err(e) => return Err(e),
        };

        self.audit.record(AuditEvent::Decryption {
            key_id: spec.id().to_owned(),
            algorithm,
        });
        Ok(plaintext)
    }

    fn check_expiry(&self, spec: &KeySpec) -> Result<(), CryptoError> {
        if spec.is_expired_at(current_epoch_secs()) {
            self.audit.record(AuditEvent::KeyExpired {
                key_id: spec.id().to_owned(),
            });
            return Err(CryptoError::KeyExpired {
                key_id: spec.id().to_owned(),
            });
        }
        Ok(())
    }

    fn tampered(&self, spec: &KeySpec, detail: &str) -> CryptoError {
        tracing::warn!(key_id = %spec.id(), "{detail}");
        self.audit.record(AuditEvent::TamperDetected);
        CryptoError::IntegrityCheckFailed
    }

    fn seal(
        &self,
        algorithm: AlgorithmTag,
        plaintext: &[u8],
        key: &[u8],
    ) -> Result<SealedParts, CryptoError> {
        match algorithm {
            AlgorithmTag::Aes256Gcm => self.aes.seal(plaintext, key).map(SealedParts::from),
            AlgorithmTag::ChaCha20Poly1305 => {
                self.chacha.seal(plaintext, key).map(SealedParts::from)
            }
            AlgorithmTag::Hybrid => self.hybrid.seal(plaintext, key),
            AlgorithmTag::Aes256Cbc => Err(CryptoError::AlgorithmNotImplemented(algorithm)),
        }
    }

    fn open(
        &self,
        algorithm: AlgorithmTag,
        sealed: &SealedParts,
        key: &[u8],
    ) -> Result<SecretBuffer, CryptoError> {
        match algorithm {
            AlgorithmTag::Aes256Gcm => self.aes.open(&single_layer(sealed)?, key),
            AlgorithmTag::ChaCha20Poly1305 => self.chacha.open(&single_layer(sealed)?, key),
            AlgorithmTag::Hybrid => self.hybrid.open(sealed, key),
            AlgorithmTag::Aes256Cbc => Err(CryptoError::AlgorithmNotImplemented(algorithm)),
        }
    }
}

fn single_layer(sealed: &SealedParts) -> Result<SealedLayer, CryptoError> {
    SealedLayer::from_parts(&sealed.nonce, &sealed.ciphertext, &sealed.tag)
}

fn record_metadata(spec: &KeySpec) -> BTreeMap<String, String> {
    BTreeMap::from([
        (META_KEY_ID.to_owned(), spec.id().to_owned()),
        (META_KEY_SIZE_BITS.to_owned(), spec.key_size_bits().to_string()),
        (
            META_REQUIRES_BIOMETRIC.to_owned(),
            spec.requires_biometric().to_string(),
        ),
        (
            META_HARDWARE_BACKED.to_owned(),
            spec.use_hardware_backed_store().to_string(),
        ),
        (META_FORMAT_VERSION.to_owned(), RECORD_FORMAT_VERSION.to_string()),
    ])
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
