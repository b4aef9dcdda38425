//! Smoke tests that key generation draws from a functioning CSPRNG.
//!
//! Thresholds sit well below the expected Shannon entropy for the sample
//! size so natural variance never trips them, while all-zero or repeating
//! output does.

use std::collections::HashSet;

use custodian_crypto_core::{AlgorithmTag, KeyManager, KeySource, KeySpec, SecretBuffer};

#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut freq = [0u64; 256];
    for &b in data {
        freq[b as usize] = freq[b as usize].saturating_add(1);
    }
    let len = data.len() as f64;
    freq.iter()
        .filter(|&&f| f > 0)
        .map(|&f| {
            let p = f as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// 64 KB sample: expected entropy ~7.997 bits/byte.
#[test]
fn random_buffer_64kb_entropy() {
    let buf = SecretBuffer::random(65_536).unwrap();
    let entropy = shannon_entropy(buf.expose());
    assert!(entropy > 7.99, "entropy too low: {entropy:.4}");
}

/// Concatenated hybrid keys (64 bytes each, 256 keys): expected ~7.99.
#[test]
fn generated_keys_have_high_entropy() {
    let manager = KeyManager::new();
    let mut pool = Vec::new();
    for i in 0..256 {
        let spec = KeySpec::new(format!("key-{i}"), AlgorithmTag::Hybrid);
        pool.extend_from_slice(manager.get_or_create_key(&spec).unwrap().expose());
    }
    let entropy = shannon_entropy(&pool);
    assert!(entropy > 7.9, "entropy too low: {entropy:.4}");
}

#[test]
fn distinct_ids_get_distinct_keys() {
    let manager = KeyManager::new();
    let keys: HashSet<Vec<u8>> = (0..100)
        .map(|i| {
            let spec = KeySpec::new(format!("id-{i}"), AlgorithmTag::Aes256Gcm);
            manager.get_or_create_key(&spec).unwrap().expose().to_vec()
        })
        .collect();
    assert_eq!(keys.len(), 100);
}
