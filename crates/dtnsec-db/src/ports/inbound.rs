//! # Inbound Port (Driving Port / API)
//!
//! The operations the bundle- and transport-layer security processors and
//! the administration surface call on an attached database handle.
//!
//! All results are owned copies; no internal reference outlives the call.
//! Every mutation is atomic: on error the database is exactly as it was.

use std::path::Path;

use crate::domain::entities::{
    BabRule, BcbRule, BibRule, EffectiveTime, LtpAuthRule,
};
use crate::domain::errors::SecDbError;

/// The security database API.
///
/// Implemented by `SecDb` in the service layer. Mutating operations take
/// `&mut self`: the handle owns the in-memory time indexes that must move
/// in lock-step with committed storage.
pub trait SecurityDbApi {
    // =========================================================================
    // Symmetric key store
    // =========================================================================

    /// Add a named key. Fails with `DuplicateKey` if the name is taken.
    fn add_key(&mut self, name: &str, bytes: &[u8]) -> Result<(), SecDbError>;

    /// Add a named key whose material is read from a file.
    fn add_key_from_file(&mut self, name: &str, path: &Path) -> Result<(), SecDbError>;

    /// Replace a key's material in place. The name is immutable.
    fn update_key(&mut self, name: &str, bytes: &[u8]) -> Result<(), SecDbError>;

    /// Replace a key's material with the content of a file.
    fn update_key_from_file(&mut self, name: &str, path: &Path) -> Result<(), SecDbError>;

    /// Remove a key. Never blocked by rules that still name the key.
    fn remove_key(&mut self, name: &str) -> Result<(), SecDbError>;

    /// Fetch a key's material by exact name.
    fn get_key(&self, name: &str) -> Result<Option<Vec<u8>>, SecDbError>;

    /// Whether a key with this name exists.
    fn key_exists(&self, name: &str) -> Result<bool, SecDbError>;

    /// Names of all stored keys, in insertion order.
    fn list_keys(&self) -> Result<Vec<String>, SecDbError>;

    /// Advisory scan: whether any rule in any store names this key.
    /// Never blocks a removal; exists for caller-side warnings.
    fn is_key_referenced_by_any_rule(&self, name: &str) -> Result<bool, SecDbError>;

    // =========================================================================
    // Peer public keys (indexed by node number and effective time)
    // =========================================================================

    /// Record a peer node's public key effective from `effective_time`.
    fn add_peer_public_key(
        &mut self,
        node_nbr: u64,
        effective_time: EffectiveTime,
        assertion_time: EffectiveTime,
        bytes: &[u8],
    ) -> Result<(), SecDbError>;

    /// Remove the peer key at an exact `(node, effective_time)` slot.
    fn remove_peer_public_key(
        &mut self,
        node_nbr: u64,
        effective_time: EffectiveTime,
    ) -> Result<(), SecDbError>;

    /// Exact-slot fetch of a peer key's material.
    fn get_peer_public_key_exact(
        &self,
        node_nbr: u64,
        effective_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError>;

    /// The peer key that was in effect for `node_nbr` at `query_time`:
    /// largest effective time at or before the query, `None` if the node is
    /// unknown or has no key that early.
    fn get_peer_public_key_as_of(
        &self,
        node_nbr: u64,
        query_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError>;

    // =========================================================================
    // Own public / private keys (indexed by effective time alone)
    // =========================================================================

    /// Record the local node's public key effective from `effective_time`.
    fn add_own_public_key(
        &mut self,
        effective_time: EffectiveTime,
        bytes: &[u8],
    ) -> Result<(), SecDbError>;

    /// Remove the own public key at an exact effective time.
    fn remove_own_public_key(&mut self, effective_time: EffectiveTime) -> Result<(), SecDbError>;

    /// Exact-slot fetch of the own public key.
    fn get_own_public_key_exact(
        &self,
        effective_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError>;

    /// The own public key in effect at `query_time`.
    fn get_own_public_key_as_of(
        &self,
        query_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError>;

    /// Record the local node's private key effective from `effective_time`.
    fn add_own_private_key(
        &mut self,
        effective_time: EffectiveTime,
        bytes: &[u8],
    ) -> Result<(), SecDbError>;

    /// Remove the own private key at an exact effective time.
    fn remove_own_private_key(&mut self, effective_time: EffectiveTime) -> Result<(), SecDbError>;

    /// Exact-slot fetch of the own private key.
    fn get_own_private_key_exact(
        &self,
        effective_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError>;

    /// The own private key in effect at `query_time`.
    fn get_own_private_key_as_of(
        &self,
        query_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError>;

    // =========================================================================
    // Bundle authentication rules (BAB)
    // =========================================================================

    /// Add a BAB rule. Endpoints must cover whole nodes; the ciphersuite
    /// and key name come together or not at all.
    fn add_bab_rule(
        &mut self,
        sender: &str,
        receiver: &str,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError>;

    /// Replace the protection fields of the literally-matching BAB rule.
    fn update_bab_rule(
        &mut self,
        sender: &str,
        receiver: &str,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError>;

    /// Remove the literally-matching BAB rule.
    fn remove_bab_rule(&mut self, sender: &str, receiver: &str) -> Result<(), SecDbError>;

    /// First BAB rule matching the endpoint pair, in insertion order.
    fn find_bab_rule(
        &self,
        sender: &str,
        receiver: &str,
    ) -> Result<Option<BabRule>, SecDbError>;

    /// Remove every BAB rule matching the wildcard filters; returns the
    /// count removed.
    fn clear_bab_rules(
        &mut self,
        sender_filter: &str,
        receiver_filter: &str,
    ) -> Result<usize, SecDbError>;

    /// All BAB rules in insertion order.
    fn list_bab_rules(&self) -> Result<Vec<BabRule>, SecDbError>;

    // =========================================================================
    // Block integrity rules (BIB)
    // =========================================================================

    /// Add a BIB rule for a block type (0 = any).
    fn add_bib_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError>;

    /// Replace the protection fields of the literally-matching BIB rule.
    fn update_bib_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError>;

    /// Remove the literally-matching BIB rule.
    fn remove_bib_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
    ) -> Result<(), SecDbError>;

    /// First BIB rule matching the query, in insertion order.
    fn find_bib_rule(
        &self,
        security_src: &str,
        dest: &str,
        block_type: u16,
    ) -> Result<Option<BibRule>, SecDbError>;

    /// Remove every BIB rule matching the filters; `None` block type
    /// matches everything. Returns the count removed.
    fn clear_bib_rules(
        &mut self,
        src_filter: &str,
        dest_filter: &str,
        block_type_filter: Option<u16>,
    ) -> Result<usize, SecDbError>;

    /// All BIB rules in insertion order.
    fn list_bib_rules(&self) -> Result<Vec<BibRule>, SecDbError>;

    // =========================================================================
    // Block confidentiality rules (BCB)
    // =========================================================================

    /// Add a BCB rule for a block type (0 = any).
    fn add_bcb_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError>;

    /// Replace the protection fields of the literally-matching BCB rule.
    fn update_bcb_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError>;

    /// Remove the literally-matching BCB rule.
    fn remove_bcb_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
    ) -> Result<(), SecDbError>;

    /// First BCB rule matching the query, in insertion order.
    fn find_bcb_rule(
        &self,
        security_src: &str,
        dest: &str,
        block_type: u16,
    ) -> Result<Option<BcbRule>, SecDbError>;

    /// Remove every BCB rule matching the filters; returns the count removed.
    fn clear_bcb_rules(
        &mut self,
        src_filter: &str,
        dest_filter: &str,
        block_type_filter: Option<u16>,
    ) -> Result<usize, SecDbError>;

    /// All BCB rules in insertion order.
    fn list_bcb_rules(&self) -> Result<Vec<BcbRule>, SecDbError>;

    // =========================================================================
    // LTP segment rules (engine-id keyed, no EID matching)
    // =========================================================================

    /// Add a transmit-signing rule for an LTP engine.
    fn add_ltp_xmit_rule(
        &mut self,
        engine_id: u64,
        ciphersuite_nbr: u8,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError>;

    /// Replace the ciphersuite/key of the transmit rule for an engine.
    fn update_ltp_xmit_rule(
        &mut self,
        engine_id: u64,
        ciphersuite_nbr: u8,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError>;

    /// Remove the transmit rule for an engine.
    fn remove_ltp_xmit_rule(&mut self, engine_id: u64) -> Result<(), SecDbError>;

    /// The transmit rule for an engine, if any.
    fn find_ltp_xmit_rule(&self, engine_id: u64) -> Result<Option<LtpAuthRule>, SecDbError>;

    /// All transmit rules in insertion order.
    fn list_ltp_xmit_rules(&self) -> Result<Vec<LtpAuthRule>, SecDbError>;

    /// Add a receive-authentication rule for an LTP engine.
    fn add_ltp_recv_rule(
        &mut self,
        engine_id: u64,
        ciphersuite_nbr: u8,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError>;

    /// Replace the ciphersuite/key of the receive rule for an engine.
    fn update_ltp_recv_rule(
        &mut self,
        engine_id: u64,
        ciphersuite_nbr: u8,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError>;

    /// Remove the receive rule for an engine.
    fn remove_ltp_recv_rule(&mut self, engine_id: u64) -> Result<(), SecDbError>;

    /// The receive rule for an engine, if any.
    fn find_ltp_recv_rule(&self, engine_id: u64) -> Result<Option<LtpAuthRule>, SecDbError>;

    /// All receive rules in insertion order.
    fn list_ltp_recv_rules(&self) -> Result<Vec<LtpAuthRule>, SecDbError>;
}
