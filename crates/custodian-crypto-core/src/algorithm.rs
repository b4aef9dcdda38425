//! Algorithm tags carried by key specs and secure records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// AEAD key length in bytes (256 bits) for a single layer.
pub const LAYER_KEY_LEN: usize = 32;

/// AEAD nonce length in bytes (96 bits) for a single layer.
pub const LAYER_NONCE_LEN: usize = 12;

/// AEAD tag length in bytes (128 bits) for a single layer.
pub const LAYER_TAG_LEN: usize = 16;

/// Hybrid combined key length (two 256-bit halves).
pub const HYBRID_KEY_LEN: usize = 64;

/// Hybrid nonce length: `aes_nonce || chacha_nonce`.
pub const HYBRID_NONCE_LEN: usize = 24;

/// Hybrid tag length: `aes_tag || chacha_tag`.
pub const HYBRID_TAG_LEN: usize = 32;

/// Encryption algorithm selector.
///
/// Serialized with the canonical names (`"AEAD-AES-256-GCM"`, ...) so
/// stored records stay readable across implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmTag {
    /// AES-256-GCM, 96-bit nonce, 128-bit tag.
    #[serde(rename = "AEAD-AES-256-GCM")]
    Aes256Gcm,
    /// Reserved name; no cipher is wired to it.
    #[serde(rename = "AEAD-AES-256-CBC")]
    Aes256Cbc,
    /// ChaCha20-Poly1305, 96-bit nonce, 128-bit tag.
    #[serde(rename = "AEAD-ChaCha20-Poly1305")]
    ChaCha20Poly1305,
    /// AES-256-GCM inner layer wrapped in a ChaCha20-Poly1305 outer layer.
    #[serde(rename = "Hybrid")]
    Hybrid,
}

impl AlgorithmTag {
    /// Canonical wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aes256Gcm => "AEAD-AES-256-GCM",
            Self::Aes256Cbc => "AEAD-AES-256-CBC",
            Self::ChaCha20Poly1305 => "AEAD-ChaCha20-Poly1305",
            Self::Hybrid => "Hybrid",
        }
    }

    /// Whether a cipher is available for this tag.
    #[must_use]
    pub const fn is_implemented(self) -> bool {
        !matches!(self, Self::Aes256Cbc)
    }

    /// Required key length in bytes.
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::Hybrid => HYBRID_KEY_LEN,
            _ => LAYER_KEY_LEN,
        }
    }

    /// Required key size in bits.
    #[must_use]
    pub const fn key_size_bits(self) -> u32 {
        match self {
            Self::Hybrid => 512,
            _ => 256,
        }
    }

    /// Total nonce length stored in a record.
    #[must_use]
    pub const fn nonce_len(self) -> usize {
        match self {
            Self::Hybrid => HYBRID_NONCE_LEN,
            Self::Aes256Cbc => 0,
            _ => LAYER_NONCE_LEN,
        }
    }

    /// Total tag length stored in a record.
    #[must_use]
    pub const fn tag_len(self) -> usize {
        match self {
            Self::Hybrid => HYBRID_TAG_LEN,
            Self::Aes256Cbc => 0,
            _ => LAYER_TAG_LEN,
        }
    }
}

impl fmt::Display for AlgorithmTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
