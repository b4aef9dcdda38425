//! Zeroize-on-drop containers for key material and decrypted payloads.
//!
//! [`SecretBuffer`] wraps [`SecretSlice<u8>`] and masks its contents in
//! `Debug`/`Display`, so a key or plaintext that lands in a log line or a
//! panic message shows up as `SecretBuffer(***)`.

use crate::error::CryptoError;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use zeroize::Zeroize;

/// Variable-length buffer for sensitive data, zeroized on drop.
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
}

impl SecretBuffer {
    /// Copy `data` into a new secret allocation.
    ///
    /// The caller should zeroize the source afterwards.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self {
            inner: data.to_vec().into(),
        }
    }

    /// Take ownership of `data` without an intermediate copy.
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { inner: data.into() }
    }

    /// Create a buffer of `len` bytes from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyGenerationFailed` if the CSPRNG fails.
    pub fn random(len: usize) -> Result<Self, CryptoError> {
        let mut bytes = vec![0u8; len];
        if let Err(e) = OsRng.try_fill_bytes(&mut bytes) {
            bytes.zeroize();
            return Err(CryptoError::KeyGenerationFailed(format!(
                "CSPRNG fill failed: {e}"
            )));
        }
        Ok(Self::from_vec(bytes))
    }

    /// Expose the underlying bytes for a cryptographic operation.
    ///
    /// Keep the borrow short: use the slice within a single expression
    /// rather than binding it to a long-lived variable.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Returns the number of bytes in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    /// Returns `true` if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make an independent copy. Both copies are zeroized on drop.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}
