//! Tamper-evidence hashes over ciphertext.
//!
//! `hash(ciphertext, key) = SHA-256(ciphertext || key)`. Verification is a
//! constant-time comparison so a mismatch position cannot be recovered
//! from timing.

use ring::digest;
use subtle::ConstantTimeEq;

/// Integrity hash length in bytes (SHA-256).
pub const INTEGRITY_HASH_LEN: usize = 32;

/// Compute `SHA-256(ciphertext || key)`.
#[must_use]
pub fn hash(ciphertext: &[u8], key: &[u8]) -> [u8; INTEGRITY_HASH_LEN] {
    let mut ctx = digest::Context::new(&digest::SHA256);
    ctx.update(ciphertext);
    ctx.update(key);
    let digest = ctx.finish();

    let mut out = [0u8; INTEGRITY_HASH_LEN];
    out.copy_from_slice(digest.as_ref());
    out
}

/// Recompute the hash and compare it against `expected` in constant time.
///
/// A stored hash of the wrong length never verifies.
#[must_use]
pub fn verify(ciphertext: &[u8], key: &[u8], expected: &[u8]) -> bool {
    let actual = hash(ciphertext, key);
    // Length is public (always 32), so the early exit leaks nothing.
    if expected.len() != INTEGRITY_HASH_LEN {
        return false;
    }
    actual.as_slice().ct_eq(expected).into()
}
