//! Named [`SecureRecord`]s on top of a [`GuardedStore`].
//!
//! Records are serialized with [`SecureRecord::to_json`] and stored under
//! `"{namespace}.{name}"`.

use std::sync::Arc;

use custodian_crypto_core::{EncryptionEngine, KeySource, KeySpec, SecretBuffer, SecureRecord};

use crate::error::RepositoryError;
use crate::guarded::GuardedStore;
use crate::store::SecureStore;

/// Load/save/clear of encrypted records in one namespace of a shared store.
#[derive(Debug)]
pub struct RecordRepository<S> {
    store: Arc<GuardedStore<S>>,
    namespace: String,
}

impl<S> Clone for RecordRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            namespace: self.namespace.clone(),
        }
    }
}

impl<S: SecureStore> RecordRepository<S> {
    pub fn new(store: Arc<GuardedStore<S>>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Persist `record` under `name`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidName` for an empty name, or the
    /// serialization/store error.
    pub fn save(&self, name: &str, record: &SecureRecord) -> Result<(), RepositoryError> {
        let key = self.storage_key(name)?;
        let bytes = record.to_json()?;
        self.store.put(&key, &bytes)?;
        tracing::debug!(%key, algorithm = %record.algorithm(), "record saved");
        Ok(())
    }

    /// Read the record stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Crypto` if the stored bytes are not a valid
    /// record, or the store error.
    pub fn load(&self, name: &str) -> Result<Option<SecureRecord>, RepositoryError> {
        let key = self.storage_key(name)?;
        let Some(bytes) = self.store.get(&key)? else {
            return Ok(None);
        };
        let record = SecureRecord::from_json(&bytes).inspect_err(|e| {
            tracing::warn!(%key, "stored record is unreadable: {e}");
        })?;
        Ok(Some(record))
    }

    /// Delete the record stored under `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub fn clear(&self, name: &str) -> Result<(), RepositoryError> {
        let key = self.storage_key(name)?;
        self.store.delete(&key)?;
        tracing::debug!(%key, "record cleared");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the store error.
    pub fn exists(&self, name: &str) -> Result<bool, RepositoryError> {
        let key = self.storage_key(name)?;
        Ok(self.store.exists(&key)?)
    }

    /// Encrypt `plaintext` with `engine` and persist the record under `name`.
    ///
    /// # Errors
    ///
    /// Returns the engine's error (nothing is written), or the store error.
    pub fn seal_and_save<K: KeySource>(
        &self,
        engine: &EncryptionEngine<K>,
        name: &str,
        plaintext: &[u8],
        spec: &KeySpec,
    ) -> Result<SecureRecord, RepositoryError> {
        let record = engine.encrypt(plaintext, spec)?;
        self.save(name, &record)?;
        Ok(record)
    }

    /// Load the record under `name` and decrypt it with `engine`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing is stored under
    /// `name`, otherwise the store or engine error.
    pub fn load_and_open<K: KeySource>(
        &self,
        engine: &EncryptionEngine<K>,
        name: &str,
        spec: &KeySpec,
    ) -> Result<SecretBuffer, RepositoryError> {
        let record = self
            .load(name)?
            .ok_or_else(|| RepositoryError::NotFound(name.to_owned()))?;
        Ok(engine.decrypt(&record, spec)?)
    }

    fn storage_key(&self, name: &str) -> Result<String, RepositoryError> {
        if name.is_empty() {
            return Err(RepositoryError::InvalidName(name.to_owned()));
        }
        Ok(format!("{}.{name}", self.namespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySecureStore;
    use custodian_crypto_core::{AlgorithmTag, AuditLog, CryptoError, EngineConfig, KeyManager};

    fn fixture() -> (
        RecordRepository<InMemorySecureStore>,
        Arc<GuardedStore<InMemorySecureStore>>,
        EncryptionEngine,
    ) {
        let store = Arc::new(GuardedStore::new(InMemorySecureStore::new()));
        let repo = RecordRepository::new(Arc::clone(&store), "com.custodian.records");
        let engine = EncryptionEngine::new(
            KeyManager::new(),
            Arc::new(AuditLog::new()),
            EngineConfig::default(),
        );
        (repo, store, engine)
    }

    #[test]
    fn seal_save_load_open() {
        let (repo, store, engine) = fixture();
        let spec = KeySpec::new("k1", AlgorithmTag::Aes256Gcm);

        let record = repo
            .seal_and_save(&engine, "token", b"hello", &spec)
            .unwrap();
        assert!(store.exists("com.custodian.records.token").unwrap());
        assert_eq!(repo.load("token").unwrap(), Some(record));

        let plaintext = repo.load_and_open(&engine, "token", &spec).unwrap();
        assert_eq!(plaintext.expose(), b"hello");
    }

    #[test]
    fn stored_bytes_are_the_json_record() {
        let (repo, store, engine) = fixture();
        let spec = KeySpec::new("k1", AlgorithmTag::ChaCha20Poly1305);
        let record = repo.seal_and_save(&engine, "a", b"x", &spec).unwrap();

        let raw = store.get("com.custodian.records.a").unwrap().unwrap();
        assert_eq!(raw, record.to_json().unwrap());
    }

    #[test]
    fn missing_record() {
        let (repo, _store, engine) = fixture();
        let spec = KeySpec::new("k1", AlgorithmTag::Aes256Gcm);
        assert_eq!(repo.load("absent").unwrap(), None);
        assert!(!repo.exists("absent").unwrap());
        assert!(matches!(
            repo.load_and_open(&engine, "absent", &spec),
            Err(RepositoryError::NotFound(name)) if name == "absent"
        ));
    }

    #[test]
    fn clear_removes_record() {
        let (repo, _store, engine) = fixture();
        let spec = KeySpec::new("k1", AlgorithmTag::Hybrid);
        repo.seal_and_save(&engine, "gone", b"bye", &spec).unwrap();
        assert!(repo.exists("gone").unwrap());

        repo.clear("gone").unwrap();
        assert!(!repo.exists("gone").unwrap());
        repo.clear("gone").unwrap();
    }

    #[test]
    fn corrupt_entry_is_a_format_error() {
        let (repo, store, _engine) = fixture();
        store.put("com.custodian.records.bad", b"{not json").unwrap();
        assert!(matches!(
            repo.load("bad"),
            Err(RepositoryError::Crypto(CryptoError::RecordFormat(_)))
        ));
    }

    #[test]
    fn failed_seal_writes_nothing() {
        let (repo, store, engine) = fixture();
        let spec = KeySpec::new("k1", AlgorithmTag::Aes256Cbc);
        assert!(matches!(
            repo.seal_and_save(&engine, "cbc", b"x", &spec),
            Err(RepositoryError::Crypto(CryptoError::AlgorithmNotImplemented(_)))
        ));
        assert!(!store.exists("com.custodian.records.cbc").unwrap());
    }

    #[test]
    fn empty_name_is_rejected() {
        let (repo, _store, _engine) = fixture();
        assert!(matches!(
            repo.exists(""),
            Err(RepositoryError::InvalidName(_))
        ));
    }

    #[test]
    fn namespaces_do_not_collide() {
        let (repo, store, engine) = fixture();
        let other = RecordRepository::new(Arc::clone(&store), "com.custodian.other");
        let spec = KeySpec::new("k1", AlgorithmTag::Aes256Gcm);
        repo.seal_and_save(&engine, "same", b"1", &spec).unwrap();

        assert!(!other.exists("same").unwrap());
        assert_eq!(other.namespace(), "com.custodian.other");
    }
}
