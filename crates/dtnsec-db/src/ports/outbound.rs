//! # Outbound Ports (Driven Ports / SPI)
//!
//! Dependencies the security database requires the host application to
//! provide: a transactional list store and a key-material file loader.
//!
//! Production: `FileTxnStore` / `FsKeyMaterialLoader` (adapters module)
//! Testing: `InMemoryTxnStore` (adapters module)

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque handle of a transaction in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxnToken(pub u64);

/// Identifier of a persistent list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListId(pub u64);

/// Identifier of an element within a persistent list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Errors from the transactional store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// I/O failure in the underlying store.
    #[error("store I/O failure: {message}")]
    Io { message: String },

    /// The transaction could not be committed; it has been aborted and no
    /// staged write is visible.
    #[error("commit failed: {message}")]
    CommitFailed { message: String },

    /// The given transaction token does not name a transaction in progress.
    #[error("no such transaction in progress")]
    NoTransaction,

    /// The given list does not exist.
    #[error("unknown list {0:?}")]
    UnknownList(ListId),

    /// The given element does not exist (or was removed in this transaction).
    #[error("unknown element {0:?}")]
    UnknownElement(ElementId),
}

/// Abstract interface to the shared transactional store.
///
/// ## Contract
///
/// - Every read and write happens inside a transaction; transactions never
///   block other readers
/// - Writes staged in a transaction are invisible to other transactions
///   until `commit`, and a transaction's own reads observe its staged
///   writes
/// - A failed `commit` aborts the transaction: either every staged write
///   becomes visible atomically, or none does
/// - Writers are serialized against the whole store (single-writer-lock);
///   no finer-grained locking is attempted by this library
pub trait TransactionalStore: Send + Sync {
    /// Open a transaction.
    fn begin(&self) -> Result<TxnToken, StoreError>;

    /// Atomically publish every write staged in `txn`.
    fn commit(&self, txn: TxnToken) -> Result<(), StoreError>;

    /// Discard every write staged in `txn`.
    fn abort(&self, txn: TxnToken);

    /// Create a new empty list.
    fn list_create(&self, txn: TxnToken) -> Result<ListId, StoreError>;

    /// Append an element to the end of a list.
    fn list_append(&self, txn: TxnToken, list: ListId, bytes: &[u8])
        -> Result<ElementId, StoreError>;

    /// Replace an element's content in place.
    fn list_update(&self, txn: TxnToken, elt: ElementId, bytes: &[u8]) -> Result<(), StoreError>;

    /// Remove an element from its list.
    fn list_remove(&self, txn: TxnToken, elt: ElementId) -> Result<(), StoreError>;

    /// Snapshot a list's elements in insertion order.
    fn list_elements(
        &self,
        txn: TxnToken,
        list: ListId,
    ) -> Result<Vec<(ElementId, Vec<u8>)>, StoreError>;

    /// Read one element's content.
    fn element_read(&self, txn: TxnToken, elt: ElementId) -> Result<Vec<u8>, StoreError>;

    /// Bind a named catalog entry (used for the database root record).
    fn catalog_put(&self, txn: TxnToken, name: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Look up a named catalog entry.
    fn catalog_get(&self, txn: TxnToken, name: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Errors from the key-material loader.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
}

/// Abstract interface for materializing key content from a named file.
///
/// Used only by the symmetric key store's add/update-from-file operations.
/// The stored record never retains the path, only the bytes; the read
/// happens before the surrounding transaction opens.
pub trait KeyMaterialLoader: Send + Sync {
    /// Read the entire content of the file at `path`.
    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>, LoadError>;
}
