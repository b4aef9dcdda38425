//! Shared/exclusive access to a [`SecureStore`].

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::StoreError;
use crate::store::SecureStore;

/// Wraps a store in an `RwLock`: `get`/`exists` run in parallel, `put`/`delete`
/// are exclusive.
///
/// Guards are released on every return path, including errors.
#[derive(Debug, Default)]
pub struct GuardedStore<S> {
    inner: RwLock<S>,
}

impl<S: SecureStore> GuardedStore<S> {
    pub const fn new(store: S) -> Self {
        Self {
            inner: RwLock::new(store),
        }
    }

    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the lock is poisoned, or the
    /// backend's error.
    pub fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.write()?.put(key, value)
    }

    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the lock is poisoned, or the
    /// backend's error.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.read()?.get(key)
    }

    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the lock is poisoned, or the
    /// backend's error.
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.write()?.delete(key)
    }

    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the lock is poisoned, or the
    /// backend's error.
    pub fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.read()?.exists(key)
    }

    /// Unwrap the underlying store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the lock is poisoned.
    pub fn into_inner(self) -> Result<S, StoreError> {
        self.inner.into_inner().map_err(|_| StoreError::Poisoned)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, S>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, S>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}
