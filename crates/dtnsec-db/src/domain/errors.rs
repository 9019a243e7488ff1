//! # Domain Errors
//!
//! Error taxonomy for the security database.
//!
//! ## Design Principles
//!
//! - Validation errors are detected before a transaction is opened where
//!   possible and always surfaced as `Result` values
//! - A failed mutation leaves the database exactly as it was (the in-flight
//!   transaction is aborted)
//! - `StorageFailure` is fatal to the operation, not to the process, and is
//!   never retried internally

use thiserror::Error;

use crate::domain::entities::EffectiveTime;
use crate::ports::outbound::{LoadError, StoreError};

/// Errors that can occur during security database operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecDbError {
    /// EID expression is empty or exceeds the maximum length.
    #[error("invalid EID length: {len} bytes (1..=255 required)")]
    InvalidEidLength { len: usize },

    /// A rule endpoint must cover a whole node (end in the wildcard marker).
    #[error("rule endpoint must cover a whole node (trailing '~'): {eid}")]
    RuleMustCoverWholeNode { eid: String },

    /// Key name is empty or exceeds the maximum length.
    #[error("invalid key name length: {len} bytes (1..=31 required)")]
    InvalidKeyName { len: usize },

    /// Key material exceeds the configured size limit.
    #[error("key material too large: {size} bytes, max {max} bytes")]
    KeyTooLarge { size: usize, max: usize },

    /// Ciphersuite and key name must be supplied together or not at all.
    #[error("ciphersuite and key name must both be present or both absent")]
    InconsistentCiphersuiteKeyPair,

    /// A key with this name already exists.
    #[error("key already exists: {name}")]
    DuplicateKey { name: String },

    /// A rule with a literally equal endpoint tuple already exists.
    #[error("an identical rule already exists")]
    DuplicateRule,

    /// A peer key already occupies this `(node, effective_time)` slot.
    #[error("asymmetric key slot occupied: node {node_nbr}, effective {effective_time}")]
    DuplicateKeySlot {
        node_nbr: u64,
        effective_time: EffectiveTime,
    },

    /// An own key already occupies this effective time.
    #[error("own key slot occupied: effective {effective_time}")]
    DuplicateOwnKeySlot { effective_time: EffectiveTime },

    /// No key with this name exists.
    #[error("key not found: {name}")]
    KeyNotFound { name: String },

    /// No rule with the given endpoint tuple (or engine id) exists.
    #[error("rule not found")]
    RuleNotFound,

    /// No peer key record at the given slot.
    #[error("asymmetric key not found: node {node_nbr}, effective {effective_time}")]
    AsymKeyNotFound {
        node_nbr: u64,
        effective_time: EffectiveTime,
    },

    /// No own key record at the given effective time.
    #[error("own key not found: effective {effective_time}")]
    OwnKeyNotFound { effective_time: EffectiveTime },

    /// `initialize` was called but a database already exists in storage.
    #[error("security database already initialized in this store")]
    AlreadyInitialized,

    /// `attach` was called but no database exists in storage.
    #[error("no security database in this store (initialize first)")]
    NotInitialized,

    /// The underlying transactional store failed; the transaction was aborted.
    #[error("storage failure: {message}")]
    StorageFailure { message: String },

    /// A persisted record could not be encoded or decoded.
    #[error("serialization failure: {message}")]
    Serialization { message: String },

    /// Key material could not be read from the named file.
    #[error("key material unreadable: {message}")]
    KeyMaterial { message: String },
}

impl From<StoreError> for SecDbError {
    fn from(err: StoreError) -> Self {
        SecDbError::StorageFailure {
            message: err.to_string(),
        }
    }
}

impl From<LoadError> for SecDbError {
    fn from(err: LoadError) -> Self {
        SecDbError::KeyMaterial {
            message: err.to_string(),
        }
    }
}
