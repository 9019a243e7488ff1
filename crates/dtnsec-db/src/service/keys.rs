//! # Symmetric Key Store Operations
//!
//! CRUD over named key blobs. Names are unique and immutable; content is
//! replaced in place by update. The rule -> key relation is a weak
//! reference, so removal is never blocked by rules that still name the
//! key - the advisory scan exists for caller-side warnings only.

use std::path::Path;

use crate::domain::entities::{validate_key_name, KeyRecord};
use crate::domain::errors::SecDbError;
use crate::ports::outbound::{ElementId, KeyMaterialLoader, TransactionalStore, TxnToken};
use crate::service::{decode, encode, SecDb};

impl<S: TransactionalStore, L: KeyMaterialLoader> SecDb<S, L> {
    /// Add a named key.
    pub fn add_key(&mut self, name: &str, bytes: &[u8]) -> Result<(), SecDbError> {
        validate_key_name(name)?;
        if bytes.len() > self.config.max_key_size {
            return Err(SecDbError::KeyTooLarge {
                size: bytes.len(),
                max: self.config.max_key_size,
            });
        }

        let txn = self.store.begin()?;
        let outcome = (|| -> Result<(), SecDbError> {
            if self.find_key_elt(txn, name)?.is_some() {
                return Err(SecDbError::DuplicateKey {
                    name: name.to_string(),
                });
            }
            let record = KeyRecord {
                name: name.to_string(),
                bytes: bytes.to_vec(),
            };
            self.store
                .list_append(txn, self.catalog.keys, &encode(&record)?)?;
            Ok(())
        })();
        self.finish(txn, outcome)?;

        tracing::debug!("[dtnsec] key added: {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    /// Add a named key whose material is read from `path`.
    ///
    /// The file is read before the transaction opens; the stored record
    /// keeps only the bytes, never the path.
    pub fn add_key_from_file(&mut self, name: &str, path: &Path) -> Result<(), SecDbError> {
        let bytes = self.loader.read_all_bytes(path)?;
        self.add_key(name, &bytes)
    }

    /// Replace a key's material in place.
    pub fn update_key(&mut self, name: &str, bytes: &[u8]) -> Result<(), SecDbError> {
        validate_key_name(name)?;
        if bytes.len() > self.config.max_key_size {
            return Err(SecDbError::KeyTooLarge {
                size: bytes.len(),
                max: self.config.max_key_size,
            });
        }

        let txn = self.store.begin()?;
        let outcome = (|| -> Result<(), SecDbError> {
            let (elt, mut record) =
                self.find_key_elt(txn, name)?
                    .ok_or_else(|| SecDbError::KeyNotFound {
                        name: name.to_string(),
                    })?;
            record.bytes = bytes.to_vec();
            self.store.list_update(txn, elt, &encode(&record)?)?;
            Ok(())
        })();
        self.finish(txn, outcome)?;

        tracing::debug!("[dtnsec] key updated: {} ({} bytes)", name, bytes.len());
        Ok(())
    }

    /// Replace a key's material with the content of a file.
    pub fn update_key_from_file(&mut self, name: &str, path: &Path) -> Result<(), SecDbError> {
        let bytes = self.loader.read_all_bytes(path)?;
        self.update_key(name, &bytes)
    }

    /// Remove a key by name. Logs a warning (and proceeds) if a rule still
    /// names the key.
    pub fn remove_key(&mut self, name: &str) -> Result<(), SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<(), SecDbError> {
            let (elt, _) = self
                .find_key_elt(txn, name)?
                .ok_or_else(|| SecDbError::KeyNotFound {
                    name: name.to_string(),
                })?;
            if self.key_referenced_in_txn(txn, name)? {
                tracing::warn!(
                    "[dtnsec] removing key {} while rules still reference it",
                    name
                );
            }
            self.store.list_remove(txn, elt)?;
            Ok(())
        })();
        self.finish(txn, outcome)?;

        tracing::debug!("[dtnsec] key removed: {}", name);
        Ok(())
    }

    /// Fetch a key's material by exact name.
    pub fn get_key(&self, name: &str) -> Result<Option<Vec<u8>>, SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<Option<Vec<u8>>, SecDbError> {
            Ok(self.find_key_elt(txn, name)?.map(|(_, r)| r.bytes))
        })();
        self.finish(txn, outcome)
    }

    /// Whether a key with this name exists.
    pub fn key_exists(&self, name: &str) -> Result<bool, SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<bool, SecDbError> { Ok(self.find_key_elt(txn, name)?.is_some()) })();
        self.finish(txn, outcome)
    }

    /// Names of all stored keys, in insertion order.
    pub fn list_keys(&self) -> Result<Vec<String>, SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<Vec<String>, SecDbError> {
            let mut names = Vec::new();
            for (_, bytes) in self.store.list_elements(txn, self.catalog.keys)? {
                let record: KeyRecord = decode(&bytes)?;
                names.push(record.name);
            }
            Ok(names)
        })();
        self.finish(txn, outcome)
    }

    /// Advisory scan across every rule store's key-name field.
    pub fn is_key_referenced_by_any_rule(&self, name: &str) -> Result<bool, SecDbError> {
        let txn = self.store.begin()?;
        let outcome = self.key_referenced_in_txn(txn, name);
        self.finish(txn, outcome)
    }

    /// Locate a key record by exact name within a transaction.
    fn find_key_elt(
        &self,
        txn: TxnToken,
        name: &str,
    ) -> Result<Option<(ElementId, KeyRecord)>, SecDbError> {
        for (elt, bytes) in self.store.list_elements(txn, self.catalog.keys)? {
            let record: KeyRecord = decode(&bytes)?;
            if record.name == name {
                return Ok(Some((elt, record)));
            }
        }
        Ok(None)
    }
}
