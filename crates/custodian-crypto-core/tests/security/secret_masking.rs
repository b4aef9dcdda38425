//! Secret-bearing values never print their bytes.

use std::sync::Arc;

use custodian_crypto_core::{
    AlgorithmTag, AuditLog, EncryptionEngine, EngineConfig, KeyManager, KeySource, KeySpec,
    SecretBuffer,
};

#[test]
fn secret_buffer_debug_and_display_are_masked() {
    let buf = SecretBuffer::new(b"hunter2");
    assert_eq!(format!("{buf:?}"), "SecretBuffer(***)");
    assert_eq!(format!("{buf}"), "SecretBuffer(***)");
}

#[test]
fn decrypted_plaintext_debug_is_masked() {
    let engine = EncryptionEngine::new(
        KeyManager::new(),
        Arc::new(AuditLog::new()),
        EngineConfig::default(),
    );
    let spec = KeySpec::new("mask", AlgorithmTag::Aes256Gcm);
    let record = engine.encrypt(b"hunter2", &spec).unwrap();
    let plaintext = engine.decrypt(&record, &spec).unwrap();
    assert!(!format!("{plaintext:?}").contains("hunter2"));
}

#[test]
fn key_manager_debug_hides_key_bytes() {
    let manager = KeyManager::new();
    let spec = KeySpec::new("k", AlgorithmTag::Aes256Gcm);
    manager.import_key(&spec, &[0xAB; 32]).unwrap();
    let debug = format!("{manager:?}");
    assert!(!debug.contains("171"), "raw key byte printed: {debug}");
    assert!(!debug.to_lowercase().contains("ab, ab"));
    assert_eq!(manager.get_key(&spec).unwrap().expose(), &[0xAB; 32]);
}
