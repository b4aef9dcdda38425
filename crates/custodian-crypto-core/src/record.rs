//! Self-describing encrypted record produced by the engine.
//!
//! Serialized as a JSON object whose field names match the record model
//! (`ciphertext`, `nonce`, `tag`, `algorithm`, `createdAt`, `metadata`,
//! `integrityHash`). Byte fields are standard base64.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aead::SealedParts;
use crate::algorithm::AlgorithmTag;
use crate::error::CryptoError;

/// Metadata key: id of the key that sealed the record.
pub const META_KEY_ID: &str = "keyId";
/// Metadata key: declared key size in bits.
pub const META_KEY_SIZE_BITS: &str = "keySizeBits";
/// Metadata key: whether the key is biometric-gated.
pub const META_REQUIRES_BIOMETRIC: &str = "requiresBiometric";
/// Metadata key: whether a hardware-backed store was requested.
pub const META_HARDWARE_BACKED: &str = "hardwareBacked";
/// Metadata key: record layout version.
pub const META_FORMAT_VERSION: &str = "formatVersion";

/// Current record layout version.
pub const RECORD_FORMAT_VERSION: u32 = 1;

/// Encrypted payload plus everything needed to open it again (except the key).
///
/// Immutable: fields are only readable. New records come out of
/// [`EncryptionEngine::encrypt`](crate::engine::EncryptionEngine::encrypt)
/// or from deserializing a stored record.
#[must_use = "encrypted records must be stored or transmitted"]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureRecord {
    #[serde(with = "base64_bytes")]
    ciphertext: Vec<u8>,
    #[serde(with = "base64_bytes")]
    nonce: Vec<u8>,
    #[serde(with = "base64_bytes")]
    tag: Vec<u8>,
    algorithm: AlgorithmTag,
    created_at: u64,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    #[serde(with = "base64_bytes")]
    integrity_hash: Vec<u8>,
}

impl SecureRecord {
    pub(crate) fn new(
        sealed: SealedParts,
        algorithm: AlgorithmTag,
        created_at: u64,
        metadata: BTreeMap<String, String>,
        integrity_hash: Vec<u8>,
    ) -> Self {
        Self {
            ciphertext: sealed.ciphertext,
            nonce: sealed.nonce,
            tag: sealed.tag,
            algorithm,
            created_at,
            metadata,
            integrity_hash,
        }
    }

    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    #[must_use]
    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    #[must_use]
    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    #[must_use]
    pub const fn algorithm(&self) -> AlgorithmTag {
        self.algorithm
    }

    /// Unix seconds at which the record was sealed.
    #[must_use]
    pub const fn created_at(&self) -> u64 {
        self.created_at
    }

    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    #[must_use]
    pub fn integrity_hash(&self) -> &[u8] {
        &self.integrity_hash
    }

    /// Id of the key that sealed this record, if recorded.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.metadata.get(META_KEY_ID).map(String::as_str)
    }

    pub(crate) fn sealed_parts(&self) -> SealedParts {
        SealedParts {
            nonce: self.nonce.clone(),
            ciphertext: self.ciphertext.clone(),
            tag: self.tag.clone(),
        }
    }

    /// Serialize to the JSON object handed to the secure store.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::RecordFormat` if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, CryptoError> {
        serde_json::to_vec(self).map_err(|e| CryptoError::RecordFormat(e.to_string()))
    }

    /// Parse a record previously produced by [`to_json`](Self::to_json).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::RecordFormat` on malformed JSON, unknown
    /// algorithm names or invalid base64.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CryptoError> {
        serde_json::from_slice(bytes).map_err(|e| CryptoError::RecordFormat(e.to_string()))
    }

    /// Copy with the sealed fields replaced.
    #[cfg(test)]
    pub(crate) fn with_parts(&self, nonce: Vec<u8>, ciphertext: Vec<u8>, tag: Vec<u8>) -> Self {
        Self {
            nonce,
            ciphertext,
            tag,
            ..self.clone()
        }
    }
}

mod base64_bytes {
    use data_encoding::BASE64;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SecureRecord {
        let mut metadata = BTreeMap::new();
        metadata.insert(META_KEY_ID.to_owned(), "k1".to_owned());
        SecureRecord::new(
            SealedParts {
                nonce: vec![1; 12],
                ciphertext: vec![2; 5],
                tag: vec![3; 16],
            },
            AlgorithmTag::Aes256Gcm,
            1_700_000_000,
            metadata,
            vec![4; 32],
        )
    }

    #[test]
    fn json_preserves_field_names() {
        let json: serde_json::Value = serde_json::from_slice(&sample().to_json().unwrap()).unwrap();
        for field in [
            "ciphertext",
            "nonce",
            "tag",
            "algorithm",
            "createdAt",
            "metadata",
            "integrityHash",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(json["algorithm"], "AEAD-AES-256-GCM");
        assert_eq!(json["nonce"], "AQEBAQEBAQEBAQEB");
        assert_eq!(json["metadata"]["keyId"], "k1");
    }

    #[test]
    fn json_roundtrip() {
        let record = sample();
        let restored = SecureRecord::from_json(&record.to_json().unwrap()).unwrap();
        assert_eq!(restored, record);
        assert_eq!(restored.key_id(), Some("k1"));
    }

    #[test]
    fn from_json_rejects_bad_base64() {
        let mut json: serde_json::Value =
            serde_json::from_slice(&sample().to_json().unwrap()).unwrap();
        json["tag"] = serde_json::Value::String("not base64!!".into());
        let bytes = serde_json::to_vec(&json).unwrap();
        assert!(matches!(
            SecureRecord::from_json(&bytes),
            Err(CryptoError::RecordFormat(_))
        ));
    }

    #[test]
    fn from_json_rejects_unknown_algorithm() {
        let mut json: serde_json::Value =
            serde_json::from_slice(&sample().to_json().unwrap()).unwrap();
        json["algorithm"] = serde_json::Value::String("ROT13".into());
        let bytes = serde_json::to_vec(&json).unwrap();
        assert!(SecureRecord::from_json(&bytes).is_err());
    }
}
