//! # Inbound Port Implementation
//!
//! `SecurityDbApi` for [`SecDb`]. Key and asymmetric-key operations
//! delegate straight to the inherent methods; the BAB/BIB/BCB wrappers
//! canonicalize raw endpoint strings here (rule context for stored
//! endpoints, literal context for queries and filters) before handing off
//! to the generic rule engine.

use std::path::Path;

use crate::domain::entities::{BabRule, BcbRule, BibRule, EffectiveTime, LtpAuthRule};
use crate::domain::errors::SecDbError;
use crate::ports::inbound::SecurityDbApi;
use crate::ports::outbound::{KeyMaterialLoader, TransactionalStore};
use crate::service::rules::{query_eid, rule_eid, Protection};
use crate::service::SecDb;

impl<S: TransactionalStore, L: KeyMaterialLoader> SecurityDbApi for SecDb<S, L> {
    // =========================================================================
    // Symmetric key store
    // =========================================================================

    fn add_key(&mut self, name: &str, bytes: &[u8]) -> Result<(), SecDbError> {
        SecDb::add_key(self, name, bytes)
    }

    fn add_key_from_file(&mut self, name: &str, path: &Path) -> Result<(), SecDbError> {
        SecDb::add_key_from_file(self, name, path)
    }

    fn update_key(&mut self, name: &str, bytes: &[u8]) -> Result<(), SecDbError> {
        SecDb::update_key(self, name, bytes)
    }

    fn update_key_from_file(&mut self, name: &str, path: &Path) -> Result<(), SecDbError> {
        SecDb::update_key_from_file(self, name, path)
    }

    fn remove_key(&mut self, name: &str) -> Result<(), SecDbError> {
        SecDb::remove_key(self, name)
    }

    fn get_key(&self, name: &str) -> Result<Option<Vec<u8>>, SecDbError> {
        SecDb::get_key(self, name)
    }

    fn key_exists(&self, name: &str) -> Result<bool, SecDbError> {
        SecDb::key_exists(self, name)
    }

    fn list_keys(&self) -> Result<Vec<String>, SecDbError> {
        SecDb::list_keys(self)
    }

    fn is_key_referenced_by_any_rule(&self, name: &str) -> Result<bool, SecDbError> {
        SecDb::is_key_referenced_by_any_rule(self, name)
    }

    // =========================================================================
    // Peer public keys
    // =========================================================================

    fn add_peer_public_key(
        &mut self,
        node_nbr: u64,
        effective_time: EffectiveTime,
        assertion_time: EffectiveTime,
        bytes: &[u8],
    ) -> Result<(), SecDbError> {
        SecDb::add_peer_public_key(self, node_nbr, effective_time, assertion_time, bytes)
    }

    fn remove_peer_public_key(
        &mut self,
        node_nbr: u64,
        effective_time: EffectiveTime,
    ) -> Result<(), SecDbError> {
        SecDb::remove_peer_public_key(self, node_nbr, effective_time)
    }

    fn get_peer_public_key_exact(
        &self,
        node_nbr: u64,
        effective_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        SecDb::get_peer_public_key_exact(self, node_nbr, effective_time)
    }

    fn get_peer_public_key_as_of(
        &self,
        node_nbr: u64,
        query_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        SecDb::get_peer_public_key_as_of(self, node_nbr, query_time)
    }

    // =========================================================================
    // Own public / private keys
    // =========================================================================

    fn add_own_public_key(
        &mut self,
        effective_time: EffectiveTime,
        bytes: &[u8],
    ) -> Result<(), SecDbError> {
        SecDb::add_own_public_key(self, effective_time, bytes)
    }

    fn remove_own_public_key(&mut self, effective_time: EffectiveTime) -> Result<(), SecDbError> {
        SecDb::remove_own_public_key(self, effective_time)
    }

    fn get_own_public_key_exact(
        &self,
        effective_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        SecDb::get_own_public_key_exact(self, effective_time)
    }

    fn get_own_public_key_as_of(
        &self,
        query_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        SecDb::get_own_public_key_as_of(self, query_time)
    }

    fn add_own_private_key(
        &mut self,
        effective_time: EffectiveTime,
        bytes: &[u8],
    ) -> Result<(), SecDbError> {
        SecDb::add_own_private_key(self, effective_time, bytes)
    }

    fn remove_own_private_key(&mut self, effective_time: EffectiveTime) -> Result<(), SecDbError> {
        SecDb::remove_own_private_key(self, effective_time)
    }

    fn get_own_private_key_exact(
        &self,
        effective_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        SecDb::get_own_private_key_exact(self, effective_time)
    }

    fn get_own_private_key_as_of(
        &self,
        query_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        SecDb::get_own_private_key_as_of(self, query_time)
    }

    // =========================================================================
    // Bundle authentication rules (BAB)
    // =========================================================================

    fn add_bab_rule(
        &mut self,
        sender: &str,
        receiver: &str,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        let protection = Protection::new(ciphersuite, key_name)?;
        let rule = BabRule {
            sender: rule_eid(sender)?,
            receiver: rule_eid(receiver)?,
            ciphersuite: protection.ciphersuite,
            key_name: protection.key_name,
        };
        self.add_eid_rule(self.catalog.bab_rules, rule)
    }

    fn update_bab_rule(
        &mut self,
        sender: &str,
        receiver: &str,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        let protection = Protection::new(ciphersuite, key_name)?;
        let sender = rule_eid(sender)?;
        let receiver = rule_eid(receiver)?;
        self.update_eid_rule::<BabRule>(self.catalog.bab_rules, &sender, &receiver, 0, protection)
    }

    fn remove_bab_rule(&mut self, sender: &str, receiver: &str) -> Result<(), SecDbError> {
        let sender = rule_eid(sender)?;
        let receiver = rule_eid(receiver)?;
        self.remove_eid_rule::<BabRule>(self.catalog.bab_rules, &sender, &receiver, 0)
    }

    fn find_bab_rule(&self, sender: &str, receiver: &str) -> Result<Option<BabRule>, SecDbError> {
        let sender = query_eid(sender)?;
        let receiver = query_eid(receiver)?;
        self.find_eid_rule(self.catalog.bab_rules, &sender, &receiver, 0)
    }

    fn clear_bab_rules(
        &mut self,
        sender_filter: &str,
        receiver_filter: &str,
    ) -> Result<usize, SecDbError> {
        let sender = query_eid(sender_filter)?;
        let receiver = query_eid(receiver_filter)?;
        self.clear_eid_rules::<BabRule>(self.catalog.bab_rules, &sender, &receiver, None)
    }

    fn list_bab_rules(&self) -> Result<Vec<BabRule>, SecDbError> {
        self.list_eid_rules(self.catalog.bab_rules)
    }

    // =========================================================================
    // Block integrity rules (BIB)
    // =========================================================================

    fn add_bib_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        let protection = Protection::new(ciphersuite, key_name)?;
        let rule = BibRule {
            security_src: rule_eid(security_src)?,
            dest: rule_eid(dest)?,
            block_type,
            ciphersuite: protection.ciphersuite,
            key_name: protection.key_name,
        };
        self.add_eid_rule(self.catalog.bib_rules, rule)
    }

    fn update_bib_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        let protection = Protection::new(ciphersuite, key_name)?;
        let src = rule_eid(security_src)?;
        let dest = rule_eid(dest)?;
        self.update_eid_rule::<BibRule>(self.catalog.bib_rules, &src, &dest, block_type, protection)
    }

    fn remove_bib_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
    ) -> Result<(), SecDbError> {
        let src = rule_eid(security_src)?;
        let dest = rule_eid(dest)?;
        self.remove_eid_rule::<BibRule>(self.catalog.bib_rules, &src, &dest, block_type)
    }

    fn find_bib_rule(
        &self,
        security_src: &str,
        dest: &str,
        block_type: u16,
    ) -> Result<Option<BibRule>, SecDbError> {
        let src = query_eid(security_src)?;
        let dest = query_eid(dest)?;
        self.find_eid_rule(self.catalog.bib_rules, &src, &dest, block_type)
    }

    fn clear_bib_rules(
        &mut self,
        src_filter: &str,
        dest_filter: &str,
        block_type_filter: Option<u16>,
    ) -> Result<usize, SecDbError> {
        let src = query_eid(src_filter)?;
        let dest = query_eid(dest_filter)?;
        self.clear_eid_rules::<BibRule>(self.catalog.bib_rules, &src, &dest, block_type_filter)
    }

    fn list_bib_rules(&self) -> Result<Vec<BibRule>, SecDbError> {
        self.list_eid_rules(self.catalog.bib_rules)
    }

    // =========================================================================
    // Block confidentiality rules (BCB)
    // =========================================================================

    fn add_bcb_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        let protection = Protection::new(ciphersuite, key_name)?;
        let rule = BcbRule {
            security_src: rule_eid(security_src)?,
            dest: rule_eid(dest)?,
            block_type,
            ciphersuite: protection.ciphersuite,
            key_name: protection.key_name,
        };
        self.add_eid_rule(self.catalog.bcb_rules, rule)
    }

    fn update_bcb_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
        ciphersuite: Option<&str>,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        let protection = Protection::new(ciphersuite, key_name)?;
        let src = rule_eid(security_src)?;
        let dest = rule_eid(dest)?;
        self.update_eid_rule::<BcbRule>(self.catalog.bcb_rules, &src, &dest, block_type, protection)
    }

    fn remove_bcb_rule(
        &mut self,
        security_src: &str,
        dest: &str,
        block_type: u16,
    ) -> Result<(), SecDbError> {
        let src = rule_eid(security_src)?;
        let dest = rule_eid(dest)?;
        self.remove_eid_rule::<BcbRule>(self.catalog.bcb_rules, &src, &dest, block_type)
    }

    fn find_bcb_rule(
        &self,
        security_src: &str,
        dest: &str,
        block_type: u16,
    ) -> Result<Option<BcbRule>, SecDbError> {
        let src = query_eid(security_src)?;
        let dest = query_eid(dest)?;
        self.find_eid_rule(self.catalog.bcb_rules, &src, &dest, block_type)
    }

    fn clear_bcb_rules(
        &mut self,
        src_filter: &str,
        dest_filter: &str,
        block_type_filter: Option<u16>,
    ) -> Result<usize, SecDbError> {
        let src = query_eid(src_filter)?;
        let dest = query_eid(dest_filter)?;
        self.clear_eid_rules::<BcbRule>(self.catalog.bcb_rules, &src, &dest, block_type_filter)
    }

    fn list_bcb_rules(&self) -> Result<Vec<BcbRule>, SecDbError> {
        self.list_eid_rules(self.catalog.bcb_rules)
    }

    // =========================================================================
    // LTP segment rules
    // =========================================================================

    fn add_ltp_xmit_rule(
        &mut self,
        engine_id: u64,
        ciphersuite_nbr: u8,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        self.add_ltp_rule(self.catalog.ltp_xmit_rules, engine_id, ciphersuite_nbr, key_name)
    }

    fn update_ltp_xmit_rule(
        &mut self,
        engine_id: u64,
        ciphersuite_nbr: u8,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        self.update_ltp_rule(self.catalog.ltp_xmit_rules, engine_id, ciphersuite_nbr, key_name)
    }

    fn remove_ltp_xmit_rule(&mut self, engine_id: u64) -> Result<(), SecDbError> {
        self.remove_ltp_rule(self.catalog.ltp_xmit_rules, engine_id)
    }

    fn find_ltp_xmit_rule(&self, engine_id: u64) -> Result<Option<LtpAuthRule>, SecDbError> {
        self.find_ltp_rule(self.catalog.ltp_xmit_rules, engine_id)
    }

    fn list_ltp_xmit_rules(&self) -> Result<Vec<LtpAuthRule>, SecDbError> {
        self.list_ltp_rules(self.catalog.ltp_xmit_rules)
    }

    fn add_ltp_recv_rule(
        &mut self,
        engine_id: u64,
        ciphersuite_nbr: u8,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        self.add_ltp_rule(self.catalog.ltp_recv_rules, engine_id, ciphersuite_nbr, key_name)
    }

    fn update_ltp_recv_rule(
        &mut self,
        engine_id: u64,
        ciphersuite_nbr: u8,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        self.update_ltp_rule(self.catalog.ltp_recv_rules, engine_id, ciphersuite_nbr, key_name)
    }

    fn remove_ltp_recv_rule(&mut self, engine_id: u64) -> Result<(), SecDbError> {
        self.remove_ltp_rule(self.catalog.ltp_recv_rules, engine_id)
    }

    fn find_ltp_recv_rule(&self, engine_id: u64) -> Result<Option<LtpAuthRule>, SecDbError> {
        self.find_ltp_rule(self.catalog.ltp_recv_rules, engine_id)
    }

    fn list_ltp_recv_rules(&self) -> Result<Vec<LtpAuthRule>, SecDbError> {
        self.list_ltp_rules(self.catalog.ltp_recv_rules)
    }
}
