//! AEAD layer strategies and the layered hybrid cipher.
//!
//! This module provides:
//! - [`AeadLayer`]: one authenticated-encryption layer (seal/open)
//! - [`RingAead`]: AES-256-GCM and ChaCha20-Poly1305 via `ring`
//! - [`HybridCipher`]: an inner layer wrapped in an outer layer
//!
//! # Hybrid layout
//!
//! ```text
//! plaintext ──AES-256-GCM(k[0..32])──► c1 ──ChaCha20-Poly1305(k[32..64])──► c2
//!
//! nonce = aes_nonce (12) || chacha_nonce (12)
//! tag   = aes_tag   (16) || chacha_tag   (16)
//! ```
//!
//! Only the inner ciphertext is fed to the outer layer; the inner tag
//! travels in the first half of the combined tag.

use rand::rngs::OsRng;
use rand::RngCore;
use ring::aead;
use zeroize::Zeroize;

use crate::algorithm::{
    HYBRID_KEY_LEN, HYBRID_NONCE_LEN, HYBRID_TAG_LEN, LAYER_KEY_LEN, LAYER_NONCE_LEN,
    LAYER_TAG_LEN,
};
use crate::error::CryptoError;
use crate::memory::SecretBuffer;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Output of a single AEAD layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedLayer {
    /// 96-bit random nonce, unique per seal.
    pub nonce: [u8; LAYER_NONCE_LEN],
    /// Same length as the layer's input.
    pub ciphertext: Vec<u8>,
    /// 128-bit authentication tag.
    pub tag: [u8; LAYER_TAG_LEN],
}

/// Algorithm-independent sealed output as stored in a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedParts {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

impl SealedLayer {
    /// Rebuild a layer from record fields.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::IntegrityCheckFailed` if the nonce or tag has
    /// the wrong length; a malformed record is treated as a tampered one.
    pub fn from_parts(nonce: &[u8], ciphertext: &[u8], tag: &[u8]) -> Result<Self, CryptoError> {
        let nonce: [u8; LAYER_NONCE_LEN] = nonce
            .try_into()
            .map_err(|_| CryptoError::IntegrityCheckFailed)?;
        let tag: [u8; LAYER_TAG_LEN] = tag
            .try_into()
            .map_err(|_| CryptoError::IntegrityCheckFailed)?;
        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
            tag,
        })
    }
}

impl From<SealedLayer> for SealedParts {
    fn from(layer: SealedLayer) -> Self {
        Self {
            nonce: layer.nonce.to_vec(),
            ciphertext: layer.ciphertext,
            tag: layer.tag.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Layer strategy
// ---------------------------------------------------------------------------

/// A single authenticated-encryption layer with a 256-bit key.
pub trait AeadLayer: Send + Sync {
    /// Encrypt `plaintext` under `key` with a fresh random nonce.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encryption` on a bad key length or cipher failure.
    fn seal(&self, plaintext: &[u8], key: &[u8]) -> Result<SealedLayer, CryptoError>;

    /// Authenticate and decrypt `sealed` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::IntegrityCheckFailed` if the tag does not verify.
    fn open(&self, sealed: &SealedLayer, key: &[u8]) -> Result<SecretBuffer, CryptoError>;
}

/// `ring`-backed AEAD layer.
#[derive(Clone, Copy)]
pub struct RingAead {
    algorithm: &'static aead::Algorithm,
}

impl RingAead {
    #[must_use]
    pub fn aes_256_gcm() -> Self {
        Self {
            algorithm: &aead::AES_256_GCM,
        }
    }

    #[must_use]
    pub fn chacha20_poly1305() -> Self {
        Self {
            algorithm: &aead::CHACHA20_POLY1305,
        }
    }

    fn key(&self, key: &[u8]) -> Result<aead::LessSafeKey, CryptoError> {
        if key.len() != LAYER_KEY_LEN {
            return Err(CryptoError::Encryption(format!(
                "invalid key length: {} bytes (expected {LAYER_KEY_LEN})",
                key.len()
            )));
        }
        let unbound = aead::UnboundKey::new(self.algorithm, key)
            .map_err(|_| CryptoError::Encryption("failed to create AEAD key".into()))?;
        Ok(aead::LessSafeKey::new(unbound))
    }
}

impl std::fmt::Debug for RingAead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RingAead").field(self.algorithm).finish()
    }
}

impl AeadLayer for RingAead {
    fn seal(&self, plaintext: &[u8], key: &[u8]) -> Result<SealedLayer, CryptoError> {
        let key = self.key(key)?;

        let mut nonce_bytes = [0u8; LAYER_NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|e| CryptoError::Encryption(format!("nonce generation failed: {e}")))?;
        let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

        // Encrypt in place; the plaintext copy becomes the ciphertext.
        let mut in_out = plaintext.to_vec();
        let Ok(tag) = key.seal_in_place_separate_tag(nonce, aead::Aad::empty(), &mut in_out)
        else {
            in_out.zeroize();
            return Err(CryptoError::Encryption("AEAD seal failed".into()));
        };

        let mut tag_bytes = [0u8; LAYER_TAG_LEN];
        tag_bytes.copy_from_slice(tag.as_ref());

        Ok(SealedLayer {
            nonce: nonce_bytes,
            ciphertext: in_out,
            tag: tag_bytes,
        })
    }

    fn open(&self, sealed: &SealedLayer, key: &[u8]) -> Result<SecretBuffer, CryptoError> {
        let key = self.key(key)?;
        let nonce = aead::Nonce::assume_unique_for_key(sealed.nonce);

        let mut ct_tag = Vec::with_capacity(sealed.ciphertext.len().saturating_add(LAYER_TAG_LEN));
        ct_tag.extend_from_slice(&sealed.ciphertext);
        ct_tag.extend_from_slice(&sealed.tag);

        let result = match key.open_in_place(nonce, aead::Aad::empty(), &mut ct_tag) {
            Ok(plaintext) => Ok(SecretBuffer::new(plaintext)),
            Err(_) => Err(CryptoError::IntegrityCheckFailed),
        };
        ct_tag.zeroize();
        result
    }
}

// ---------------------------------------------------------------------------
// Hybrid composition
// ---------------------------------------------------------------------------

/// Two sequential AEAD layers under independent key halves.
#[derive(Debug, Clone)]
pub struct HybridCipher<I, O> {
    inner: I,
    outer: O,
}

impl HybridCipher<RingAead, RingAead> {
    /// AES-256-GCM inside, ChaCha20-Poly1305 outside.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(RingAead::aes_256_gcm(), RingAead::chacha20_poly1305())
    }
}

impl<I: AeadLayer, O: AeadLayer> HybridCipher<I, O> {
    #[must_use]
    pub const fn new(inner: I, outer: O) -> Self {
        Self { inner, outer }
    }

    /// Seal with the inner layer, then seal the inner ciphertext with the
    /// outer layer.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encryption` if `key` is not 64 bytes or a
    /// layer fails.
    pub fn seal(&self, plaintext: &[u8], key: &[u8]) -> Result<SealedParts, CryptoError> {
        let (inner_key, outer_key) = split_key(key)?;
        let inner = self.inner.seal(plaintext, inner_key)?;
        let outer = self.outer.seal(&inner.ciphertext, outer_key)?;

        let mut nonce = Vec::with_capacity(HYBRID_NONCE_LEN);
        nonce.extend_from_slice(&inner.nonce);
        nonce.extend_from_slice(&outer.nonce);

        let mut tag = Vec::with_capacity(HYBRID_TAG_LEN);
        tag.extend_from_slice(&inner.tag);
        tag.extend_from_slice(&outer.tag);

        Ok(SealedParts {
            nonce,
            ciphertext: outer.ciphertext,
            tag,
        })
    }

    /// Open the outer layer, then the inner layer.
    ///
    /// The inner layer is never touched if the outer tag fails.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Encryption` if `key` is not 64 bytes
    /// - `CryptoError::IntegrityCheckFailed` on malformed nonce/tag or a
    ///   failed tag in either layer
    pub fn open(&self, sealed: &SealedParts, key: &[u8]) -> Result<SecretBuffer, CryptoError> {
        let (inner_key, outer_key) = split_key(key)?;
        if sealed.nonce.len() != HYBRID_NONCE_LEN || sealed.tag.len() != HYBRID_TAG_LEN {
            return Err(CryptoError::IntegrityCheckFailed);
        }
        let (inner_nonce, outer_nonce) = sealed.nonce.split_at(LAYER_NONCE_LEN);
        let (inner_tag, outer_tag) = sealed.tag.split_at(LAYER_TAG_LEN);

        let outer = SealedLayer::from_parts(outer_nonce, &sealed.ciphertext, outer_tag)?;
        let inner_ciphertext = self.outer.open(&outer, outer_key)?;

        let inner = SealedLayer::from_parts(inner_nonce, inner_ciphertext.expose(), inner_tag)?;
        self.inner.open(&inner, inner_key)
    }
}

fn split_key(key: &[u8]) -> Result<(&[u8], &[u8]), CryptoError> {
    if key.len() != HYBRID_KEY_LEN {
        return Err(CryptoError::Encryption(format!(
            "invalid hybrid key length: {} bytes (expected {HYBRID_KEY_LEN})",
            key.len()
        )));
    }
    Ok(key.split_at(LAYER_KEY_LEN))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
