//! Tampered or malformed records are refused before any plaintext exists.

use std::collections::HashSet;
use std::sync::Arc;

use custodian_crypto_core::{
    AlgorithmTag, AuditEvent, AuditEventKind, AuditLog, CryptoError, EncryptionEngine,
    EngineConfig, KeyManager, KeySpec, SecureRecord,
};

fn engine() -> EncryptionEngine {
    EncryptionEngine::new(
        KeyManager::new(),
        Arc::new(AuditLog::new()),
        EngineConfig::default(),
    )
}

/// Rewrite one field of the record's JSON form.
fn edit(record: &SecureRecord, field: &str, value: serde_json::Value) -> SecureRecord {
    let mut json: serde_json::Value = serde_json::from_slice(&record.to_json().unwrap()).unwrap();
    json[field] = value;
    SecureRecord::from_json(&serde_json::to_vec(&json).unwrap()).unwrap()
}

fn b64(bytes: &[u8]) -> serde_json::Value {
    serde_json::Value::String(data_encoding::BASE64.encode(bytes))
}

#[test]
fn ciphertext_does_not_contain_plaintext() {
    let engine = engine();
    let plaintext = b"correct horse battery staple";
    for algorithm in [
        AlgorithmTag::Aes256Gcm,
        AlgorithmTag::ChaCha20Poly1305,
        AlgorithmTag::Hybrid,
    ] {
        let spec = KeySpec::new("leak", algorithm);
        let record = engine.encrypt(plaintext, &spec).unwrap();
        assert!(
            !record
                .ciphertext()
                .windows(8)
                .any(|w| plaintext.windows(8).any(|p| p == w)),
            "{algorithm} ciphertext contains plaintext"
        );
    }
}

#[test]
fn rapid_encryptions_never_reuse_a_nonce() {
    let engine = engine();
    for algorithm in [
        AlgorithmTag::Aes256Gcm,
        AlgorithmTag::ChaCha20Poly1305,
        AlgorithmTag::Hybrid,
    ] {
        let spec = KeySpec::new(format!("nonce-{algorithm}"), algorithm);
        let nonces: HashSet<Vec<u8>> = (0..1_000)
            .map(|_| engine.encrypt(b"same", &spec).unwrap().nonce().to_vec())
            .collect();
        assert_eq!(nonces.len(), 1_000, "{algorithm} reused a nonce");
    }
}

#[test]
fn truncated_ciphertext_is_rejected() {
    let engine = engine();
    let spec = KeySpec::new("trunc", AlgorithmTag::Aes256Gcm);
    let record = engine.encrypt(b"sixteen bytes!!!", &spec).unwrap();
    let truncated = edit(&record, "ciphertext", b64(&record.ciphertext()[..8]));

    assert!(matches!(
        engine.decrypt(&truncated, &spec),
        Err(CryptoError::IntegrityCheckFailed)
    ));
}

#[test]
fn short_hybrid_nonce_is_rejected() {
    let engine = engine();
    let spec = KeySpec::new("short", AlgorithmTag::Hybrid);
    let record = engine.encrypt(b"payload", &spec).unwrap();
    let malformed = edit(&record, "nonce", b64(&record.nonce()[..12]));

    assert!(matches!(
        engine.decrypt(&malformed, &spec),
        Err(CryptoError::IntegrityCheckFailed)
    ));
}

#[test]
fn tampering_is_audited_and_never_decrypted() {
    let engine = engine();
    let spec = KeySpec::new("audit", AlgorithmTag::ChaCha20Poly1305);
    let record = engine.encrypt(b"payload", &spec).unwrap();

    let mut ciphertext = record.ciphertext().to_vec();
    ciphertext[0] ^= 0x80;
    let tampered = edit(&record, "ciphertext", b64(&ciphertext));
    assert!(engine.decrypt(&tampered, &spec).is_err());

    let mut tag = record.tag().to_vec();
    tag[15] ^= 0x01;
    let tampered = edit(&record, "tag", b64(&tag));
    assert!(engine.decrypt(&tampered, &spec).is_err());

    let log = engine.audit_log();
    assert_eq!(log.count(AuditEventKind::TamperDetected), 2);
    assert_eq!(log.count(AuditEventKind::Decryption), 0);
    assert_eq!(
        log.events().last(),
        Some(&AuditEvent::TamperDetected)
    );
}

#[test]
fn record_from_another_key_fails_integrity() {
    let engine = engine();
    let sealed_with = KeySpec::new("alice", AlgorithmTag::Aes256Gcm);
    let opened_with = KeySpec::new("bob", AlgorithmTag::Aes256Gcm);
    let record = engine.encrypt(b"for alice", &sealed_with).unwrap();
    engine.encrypt(b"seed bob's key", &opened_with).unwrap();

    assert!(matches!(
        engine.decrypt(&record, &opened_with),
        Err(CryptoError::IntegrityCheckFailed)
    ));
}
