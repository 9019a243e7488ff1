//! # Domain Entities
//!
//! Persisted record shapes for keys and security rules.
//!
//! All records are owned by value; rules reference keys by name only (a weak
//! reference - removing a key still named by a live rule is not blocked).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::eid::EidExpression;
use crate::domain::errors::SecDbError;

/// Maximum length of a key name in bytes.
pub const MAX_KEY_NAME_LEN: usize = 31;

/// Reserved NULL ciphersuite number for LTP rules (no protection).
pub const LTP_NULL_CIPHERSUITE: u8 = 255;

/// The timestamp at which a key becomes authoritative for its owner.
///
/// Ordered by `(seconds, count)` ascending; the counter disambiguates keys
/// asserted within the same second.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EffectiveTime {
    /// Seconds since the epoch.
    pub seconds: u64,
    /// Disambiguation counter within a second.
    pub count: u32,
}

impl EffectiveTime {
    /// The earliest representable time.
    pub const ZERO: EffectiveTime = EffectiveTime::new(0, 0);

    /// Create an effective time from seconds and counter.
    pub const fn new(seconds: u64, count: u32) -> Self {
        Self { seconds, count }
    }
}

impl fmt::Display for EffectiveTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.seconds, self.count)
    }
}

/// A named symmetric key.
///
/// Invariant: the name is unique across the key store at all times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Unique name, 1..=31 bytes. Immutable after creation.
    pub name: String,
    /// Owned key material.
    pub bytes: Vec<u8>,
}

/// Validate a symmetric key name (1..=31 bytes).
pub fn validate_key_name(name: &str) -> Result<(), SecDbError> {
    if name.is_empty() || name.len() > MAX_KEY_NAME_LEN {
        return Err(SecDbError::InvalidKeyName { len: name.len() });
    }
    Ok(())
}

/// A peer node's public key, effective from a point in time.
///
/// Invariant: no two records share the same `(node_nbr, effective_time)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerPublicKeyRecord {
    /// Node number of the key's owner.
    pub node_nbr: u64,
    /// Time from which this key is authoritative.
    pub effective_time: EffectiveTime,
    /// Time at which the key was asserted to this node.
    pub assertion_time: EffectiveTime,
    /// Owned key material.
    pub bytes: Vec<u8>,
}

/// The local node's own public or private key (two separate stores,
/// identical shape).
///
/// Invariant: no two records in the same store share `effective_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnKeyRecord {
    /// Time from which this key is authoritative.
    pub effective_time: EffectiveTime,
    /// Owned key material.
    pub bytes: Vec<u8>,
}

/// Bundle Authentication Block rule.
///
/// Symmetric with respect to local node role: `sender` and `receiver` are
/// unordered relative to which one is the local node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BabRule {
    /// Sending endpoint expression (whole-node wildcard).
    pub sender: EidExpression,
    /// Receiving endpoint expression (whole-node wildcard).
    pub receiver: EidExpression,
    /// Named ciphersuite; never interpreted by the database.
    pub ciphersuite: Option<String>,
    /// Name of the symmetric key to use (weak reference).
    pub key_name: Option<String>,
}

/// Block Integrity Block rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibRule {
    /// Security-source endpoint expression (whole-node wildcard).
    pub security_src: EidExpression,
    /// Destination endpoint expression (whole-node wildcard).
    pub dest: EidExpression,
    /// Protected block type; 0 means "any".
    pub block_type: u16,
    /// Named ciphersuite; never interpreted by the database.
    pub ciphersuite: Option<String>,
    /// Name of the symmetric key to use (weak reference).
    pub key_name: Option<String>,
}

/// Block Confidentiality Block rule. Same shape as [`BibRule`], kept in a
/// separate store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BcbRule {
    /// Security-source endpoint expression (whole-node wildcard).
    pub security_src: EidExpression,
    /// Destination endpoint expression (whole-node wildcard).
    pub dest: EidExpression,
    /// Protected block type; 0 means "any".
    pub block_type: u16,
    /// Named ciphersuite; never interpreted by the database.
    pub ciphersuite: Option<String>,
    /// Name of the symmetric key to use (weak reference).
    pub key_name: Option<String>,
}

/// LTP segment signing/authentication rule, keyed solely by engine id.
///
/// One store for transmit-signing, one for receive-authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LtpAuthRule {
    /// LTP engine the rule applies to.
    pub engine_id: u64,
    /// Ciphersuite number; [`LTP_NULL_CIPHERSUITE`] means no protection.
    pub ciphersuite_nbr: u8,
    /// Name of the key to use (weak reference); absent iff NULL ciphersuite.
    pub key_name: Option<String>,
}

/// Configuration for the security database.
#[derive(Debug, Clone)]
pub struct SecDbConfig {
    /// Maximum accepted size of symmetric key material in bytes.
    pub max_key_size: usize,
}

impl Default for SecDbConfig {
    fn default() -> Self {
        Self {
            max_key_size: 4096,
        }
    }
}
