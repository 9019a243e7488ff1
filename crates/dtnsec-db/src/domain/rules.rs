//! # Rule Matching Logic
//!
//! The generic rule shape shared by the BAB/BIB/BCB stores and the pure
//! predicates the service layer evaluates while scanning a rule list.
//!
//! ## Precedence Invariants
//!
//! - `add` rejects only a *literally equal* endpoint tuple; two overlapping
//!   but textually different wildcard rules may coexist
//! - `find` returns the first stored rule matching the query in insertion
//!   order - first-match-wins, not most-specific-wins

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::eid::EidExpression;
use crate::domain::entities::{BabRule, BcbRule, BibRule, LTP_NULL_CIPHERSUITE};
use crate::domain::errors::SecDbError;

/// A security rule scoped by a pair of EID expressions and an optional
/// block-type discriminator.
///
/// Implemented by [`BabRule`] (block type fixed at 0), [`BibRule`] and
/// [`BcbRule`]; the generic store engine in the service layer is written
/// against this trait.
pub trait SecurityRule: Clone + Serialize + DeserializeOwned {
    /// Rule kind label used in log events.
    const KIND: &'static str;

    /// The security-source endpoint expression.
    fn security_src(&self) -> &EidExpression;

    /// The destination endpoint expression.
    fn dest(&self) -> &EidExpression;

    /// The block-type discriminator; 0 means "any".
    fn block_type(&self) -> u16 {
        0
    }

    /// The named ciphersuite, if protection is configured.
    fn ciphersuite(&self) -> Option<&str>;

    /// The named key, if protection is configured.
    fn key_name(&self) -> Option<&str>;

    /// Replace the ciphersuite/key fields in place. Endpoints are immutable.
    fn set_protection(&mut self, ciphersuite: Option<String>, key_name: Option<String>);
}

impl SecurityRule for BabRule {
    const KIND: &'static str = "bab";

    fn security_src(&self) -> &EidExpression {
        &self.sender
    }

    fn dest(&self) -> &EidExpression {
        &self.receiver
    }

    fn ciphersuite(&self) -> Option<&str> {
        self.ciphersuite.as_deref()
    }

    fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    fn set_protection(&mut self, ciphersuite: Option<String>, key_name: Option<String>) {
        self.ciphersuite = ciphersuite;
        self.key_name = key_name;
    }
}

impl SecurityRule for BibRule {
    const KIND: &'static str = "bib";

    fn security_src(&self) -> &EidExpression {
        &self.security_src
    }

    fn dest(&self) -> &EidExpression {
        &self.dest
    }

    fn block_type(&self) -> u16 {
        self.block_type
    }

    fn ciphersuite(&self) -> Option<&str> {
        self.ciphersuite.as_deref()
    }

    fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    fn set_protection(&mut self, ciphersuite: Option<String>, key_name: Option<String>) {
        self.ciphersuite = ciphersuite;
        self.key_name = key_name;
    }
}

impl SecurityRule for BcbRule {
    const KIND: &'static str = "bcb";

    fn security_src(&self) -> &EidExpression {
        &self.security_src
    }

    fn dest(&self) -> &EidExpression {
        &self.dest
    }

    fn block_type(&self) -> u16 {
        self.block_type
    }

    fn ciphersuite(&self) -> Option<&str> {
        self.ciphersuite.as_deref()
    }

    fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    fn set_protection(&mut self, ciphersuite: Option<String>, key_name: Option<String>) {
        self.ciphersuite = ciphersuite;
        self.key_name = key_name;
    }
}

/// Whether `rule` has a literally equal endpoint tuple.
///
/// Duplicate rejection and update/remove targeting use byte-for-byte
/// equality of the canonical strings, never wildcard overlap.
pub fn is_exact_duplicate<R: SecurityRule>(
    rule: &R,
    src: &EidExpression,
    dest: &EidExpression,
    block_type: u16,
) -> bool {
    rule.block_type() == block_type && rule.security_src() == src && rule.dest() == dest
}

/// Whether `rule` governs a concrete query under the wildcard matcher.
///
/// A block type of 0 on either side matches any block type.
pub fn rule_matches_query<R: SecurityRule>(
    rule: &R,
    src: &EidExpression,
    dest: &EidExpression,
    block_type: u16,
) -> bool {
    (block_type == 0 || rule.block_type() == 0 || rule.block_type() == block_type)
        && rule.security_src().matches(src)
        && rule.dest().matches(dest)
}

/// Whether `rule` falls under a bulk-clear filter.
///
/// Filters are matched with the same wildcard algorithm as queries; a block
/// type filter of `None` matches every block type.
pub fn rule_matches_filter<R: SecurityRule>(
    rule: &R,
    src_filter: &EidExpression,
    dest_filter: &EidExpression,
    block_type_filter: Option<u16>,
) -> bool {
    block_type_filter.is_none_or(|bt| rule.block_type() == bt)
        && rule.security_src().matches(src_filter)
        && rule.dest().matches(dest_filter)
}

/// Map an empty or absent string option to `None`.
///
/// Admin surfaces pass "" for "no value"; normalize before validation so a
/// stored rule only ever carries `None` or a non-empty string.
pub fn normalize_opt(value: Option<&str>) -> Option<String> {
    match value {
        Some(s) if !s.is_empty() => Some(s.to_string()),
        _ => None,
    }
}

/// Enforce the all-or-nothing ciphersuite/key pairing for EID-scoped rules.
pub fn validate_protection_pair(
    ciphersuite: &Option<String>,
    key_name: &Option<String>,
) -> Result<(), SecDbError> {
    match (ciphersuite, key_name) {
        (Some(_), Some(_)) | (None, None) => Ok(()),
        _ => Err(SecDbError::InconsistentCiphersuiteKeyPair),
    }
}

/// Enforce the LTP pairing: NULL ciphersuite carries no key, any other
/// ciphersuite requires one.
pub fn validate_ltp_protection(
    ciphersuite_nbr: u8,
    key_name: &Option<String>,
) -> Result<(), SecDbError> {
    let consistent = if ciphersuite_nbr == LTP_NULL_CIPHERSUITE {
        key_name.is_none()
    } else {
        key_name.is_some()
    };

    if consistent {
        Ok(())
    } else {
        Err(SecDbError::InconsistentCiphersuiteKeyPair)
    }
}
