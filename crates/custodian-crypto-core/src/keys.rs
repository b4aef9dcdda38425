//! Symmetric key generation and the process-lifetime key cache.
//!
//! [`KeyManager`] maps `KeySpec::id` to raw key bytes. Keys live for the
//! lifetime of the manager and are never persisted. A caller that needs
//! durable keys derives them from durable material and hands them over
//! with [`KeyManager::import_key`].
//!
//! The engine talks to key material only through [`KeySource`], which is
//! what lets tests observe (or refuse) key lookups.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, RwLock};

use crate::error::CryptoError;
use crate::key_spec::KeySpec;
use crate::memory::SecretBuffer;

/// Provider of key bytes for the encryption engine.
pub trait KeySource: Send + Sync {
    /// Return the key for `spec`, generating and caching it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError`] if the spec is invalid, the key cannot be
    /// exported, or generation fails.
    fn get_or_create_key(&self, spec: &KeySpec) -> Result<SecretBuffer, CryptoError>;

    /// Return an existing key for `spec`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyNotFound` if no key is cached for the id.
    fn get_key(&self, spec: &KeySpec) -> Result<SecretBuffer, CryptoError>;
}

impl<T: KeySource + ?Sized> KeySource for Arc<T> {
    fn get_or_create_key(&self, spec: &KeySpec) -> Result<SecretBuffer, CryptoError> {
        (**self).get_or_create_key(spec)
    }

    fn get_key(&self, spec: &KeySpec) -> Result<SecretBuffer, CryptoError> {
        (**self).get_key(spec)
    }
}

/// In-process key cache backed by the OS CSPRNG.
///
/// Synchronized with an `RwLock`: lookups run in parallel, creation takes
/// the write lock and re-checks the entry, so concurrent callers racing on
/// the same id all observe the same bytes.
#[derive(Debug, Default)]
pub struct KeyManager {
    cache: RwLock<HashMap<String, SecretBuffer>>,
}

impl KeyManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert caller-supplied key material, replacing any cached key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeySpec` if `bytes` does not have the
    /// algorithm's key length, or the spec itself is invalid.
    pub fn import_key(&self, spec: &KeySpec, bytes: &[u8]) -> Result<(), CryptoError> {
        check_exportable(spec)?;
        spec.validate()?;
        if bytes.len() != spec.key_len() {
            return Err(CryptoError::InvalidKeySpec(format!(
                "imported key is {} bytes, {} requires {}",
                bytes.len(),
                spec.algorithm(),
                spec.key_len()
            )));
        }
        let mut cache = self.write()?;
        cache.insert(spec.id().to_owned(), SecretBuffer::new(bytes));
        drop(cache);
        tracing::debug!(key_id = %spec.id(), "key imported");
        Ok(())
    }

    /// Drop a cached key. Returns `true` if one was present.
    ///
    /// The removed bytes are zeroized.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the cache lock is poisoned.
    pub fn remove_key(&self, key_id: &str) -> Result<bool, CryptoError> {
        Ok(self.write()?.remove(key_id).is_some())
    }

    /// Drop every cached key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the cache lock is poisoned.
    pub fn clear(&self) -> Result<(), CryptoError> {
        self.write()?.clear();
        Ok(())
    }

    /// Whether a key is cached for `key_id`.
    #[must_use]
    pub fn contains(&self, key_id: &str) -> bool {
        self.cache
            .read()
            .is_ok_and(|cache| cache.contains_key(key_id))
    }

    /// Number of cached keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.read().map_or(0, |cache| cache.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, SecretBuffer>>, CryptoError> {
        self.cache
            .read()
            .map_err(|_| CryptoError::SecureMemory("key cache lock poisoned".into()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, SecretBuffer>>, CryptoError> {
        self.cache
            .write()
            .map_err(|_| CryptoError::SecureMemory("key cache lock poisoned".into()))
    }
}

impl KeySource for KeyManager {
    fn get_or_create_key(&self, spec: &KeySpec) -> Result<SecretBuffer, CryptoError> {
        check_exportable(spec)?;
        spec.validate()?;

        {
            let cache = self.read()?;
            if let Some(key) = cache.get(spec.id()) {
                return checked_copy(spec, key);
            }
        }

        let mut cache = self.write()?;
        match cache.entry(spec.id().to_owned()) {
            // Another caller created it between our read and write locks.
            Entry::Occupied(entry) => checked_copy(spec, entry.get()),
            Entry::Vacant(entry) => {
                let key = SecretBuffer::random(spec.key_len())?;
                let copy = key.duplicate();
                entry.insert(key);
                tracing::debug!(
                    key_id = %spec.id(),
                    algorithm = %spec.algorithm(),
                    "generated new key"
                );
                Ok(copy)
            }
        }
    }

    fn get_key(&self, spec: &KeySpec) -> Result<SecretBuffer, CryptoError> {
        check_exportable(spec)?;
        let cache = self.read()?;
        let key = cache.get(spec.id()).ok_or_else(|| CryptoError::KeyNotFound {
            key_id: spec.id().to_owned(),
        })?;
        checked_copy(spec, key)
    }
}

/// Hardware-backed keys never leave their secure element, so a software
/// cache cannot hand out their bytes.
fn check_exportable(spec: &KeySpec) -> Result<(), CryptoError> {
    if spec.use_hardware_backed_store() {
        return Err(CryptoError::OperationNotSupported(format!(
            "key {} is hardware-backed; raw key material is not exportable",
            spec.id()
        )));
    }
    Ok(())
}

fn checked_copy(spec: &KeySpec, key: &SecretBuffer) -> Result<SecretBuffer, CryptoError> {
    let expected = spec.algorithm().key_len();
    if key.len() != expected {
        return Err(CryptoError::InvalidKeySpec(format!(
            "cached key {} is {} bytes, {} requires {expected}",
            spec.id(),
            key.len(),
            spec.algorithm()
        )));
    }
    Ok(key.duplicate())
}
