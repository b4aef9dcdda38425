//! Platform secure-store interface and an in-memory implementation.

use std::collections::HashMap;

use crate::error::StoreError;

/// Opaque key-value store backed by the platform (keychain, keystore).
///
/// Reads take `&self` and may run concurrently; writes take `&mut self`.
/// Wrap an implementation in [`GuardedStore`](crate::GuardedStore) to
/// share it between threads.
pub trait SecureStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the platform store rejects the write.
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Read the value under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the read fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Remove `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the delete fails.
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the lookup fails.
    fn exists(&self, key: &str) -> Result<bool, StoreError>;
}

/// Process-local store for tests and hosts without a platform store.
#[derive(Debug, Default)]
pub struct InMemorySecureStore {
    entries: HashMap<String, Vec<u8>>,
}

impl InMemorySecureStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SecureStore for InMemorySecureStore {
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete() {
        let mut store = InMemorySecureStore::new();
        store.put("a", b"one").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some(&b"one"[..]));
        assert!(store.exists("a").unwrap());

        store.put("a", b"two").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some(&b"two"[..]));
        assert_eq!(store.len(), 1);

        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert!(!store.exists("a").unwrap());
    }

    #[test]
    fn delete_missing_is_ok() {
        let mut store = InMemorySecureStore::new();
        assert!(store.delete("nope").is_ok());
        assert!(store.is_empty());
    }
}
