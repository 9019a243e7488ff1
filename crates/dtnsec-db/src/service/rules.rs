//! # Rule Store Operations
//!
//! One generic engine drives the BAB/BIB/BCB stores (EID-matched, via the
//! `SecurityRule` trait) and one drives the two LTP stores (engine-id
//! equality, no EID matching). Public wrappers per rule kind live in the
//! API layer; this module owns the scan/mutate logic.

use crate::domain::eid::{EidContext, EidExpression};
use crate::domain::entities::LtpAuthRule;
use crate::domain::errors::SecDbError;
use crate::domain::rules::{
    is_exact_duplicate, normalize_opt, rule_matches_filter, rule_matches_query,
    validate_ltp_protection, validate_protection_pair, SecurityRule,
};
use crate::ports::outbound::{ElementId, KeyMaterialLoader, ListId, TransactionalStore, TxnToken};
use crate::service::{decode, encode, SecDb};

/// Canonical protection fields for an EID-scoped rule, validated together.
pub(super) struct Protection {
    pub ciphersuite: Option<String>,
    pub key_name: Option<String>,
}

impl Protection {
    /// Normalize ("" becomes absent) and enforce the all-or-nothing pairing.
    pub fn new(ciphersuite: Option<&str>, key_name: Option<&str>) -> Result<Self, SecDbError> {
        let ciphersuite = normalize_opt(ciphersuite);
        let key_name = normalize_opt(key_name);
        validate_protection_pair(&ciphersuite, &key_name)?;
        Ok(Self {
            ciphersuite,
            key_name,
        })
    }
}

/// Canonicalize one endpoint of a rule being stored.
pub(super) fn rule_eid(raw: &str) -> Result<EidExpression, SecDbError> {
    EidExpression::canonicalize(raw, EidContext::WildcardRule)
}

/// Canonicalize a query or filter endpoint.
pub(super) fn query_eid(raw: &str) -> Result<EidExpression, SecDbError> {
    EidExpression::canonicalize(raw, EidContext::Literal)
}

impl<S: TransactionalStore, L: KeyMaterialLoader> SecDb<S, L> {
    /// Add an EID-scoped rule, rejecting a literally equal endpoint tuple.
    pub(super) fn add_eid_rule<R: SecurityRule>(
        &mut self,
        list: ListId,
        rule: R,
    ) -> Result<(), SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<(), SecDbError> {
            for (_, bytes) in self.store.list_elements(txn, list)? {
                let existing: R = decode(&bytes)?;
                if is_exact_duplicate(
                    &existing,
                    rule.security_src(),
                    rule.dest(),
                    rule.block_type(),
                ) {
                    return Err(SecDbError::DuplicateRule);
                }
            }
            self.store.list_append(txn, list, &encode(&rule)?)?;
            Ok(())
        })();
        self.finish(txn, outcome)?;

        tracing::debug!(
            "[dtnsec] {} rule added: {} -> {} (block type {})",
            R::KIND,
            rule.security_src(),
            rule.dest(),
            rule.block_type()
        );
        Ok(())
    }

    /// Replace the protection fields of the literally-matching rule.
    pub(super) fn update_eid_rule<R: SecurityRule>(
        &mut self,
        list: ListId,
        src: &EidExpression,
        dest: &EidExpression,
        block_type: u16,
        protection: Protection,
    ) -> Result<(), SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<(), SecDbError> {
            let (elt, mut rule) = self
                .find_exact_rule::<R>(txn, list, src, dest, block_type)?
                .ok_or(SecDbError::RuleNotFound)?;
            rule.set_protection(protection.ciphersuite, protection.key_name);
            self.store.list_update(txn, elt, &encode(&rule)?)?;
            Ok(())
        })();
        self.finish(txn, outcome)?;

        tracing::debug!("[dtnsec] {} rule updated: {} -> {}", R::KIND, src, dest);
        Ok(())
    }

    /// Remove the literally-matching rule.
    pub(super) fn remove_eid_rule<R: SecurityRule>(
        &mut self,
        list: ListId,
        src: &EidExpression,
        dest: &EidExpression,
        block_type: u16,
    ) -> Result<(), SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<(), SecDbError> {
            let (elt, _) = self
                .find_exact_rule::<R>(txn, list, src, dest, block_type)?
                .ok_or(SecDbError::RuleNotFound)?;
            self.store.list_remove(txn, elt)?;
            Ok(())
        })();
        self.finish(txn, outcome)?;

        tracing::debug!("[dtnsec] {} rule removed: {} -> {}", R::KIND, src, dest);
        Ok(())
    }

    /// First rule matching the query, in insertion order (first-match-wins).
    pub(super) fn find_eid_rule<R: SecurityRule>(
        &self,
        list: ListId,
        src: &EidExpression,
        dest: &EidExpression,
        block_type: u16,
    ) -> Result<Option<R>, SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<Option<R>, SecDbError> {
            for (_, bytes) in self.store.list_elements(txn, list)? {
                let rule: R = decode(&bytes)?;
                if rule_matches_query(&rule, src, dest, block_type) {
                    return Ok(Some(rule));
                }
            }
            Ok(None)
        })();
        self.finish(txn, outcome)
    }

    /// Remove every rule matching the wildcard filters; returns the count.
    pub(super) fn clear_eid_rules<R: SecurityRule>(
        &mut self,
        list: ListId,
        src_filter: &EidExpression,
        dest_filter: &EidExpression,
        block_type_filter: Option<u16>,
    ) -> Result<usize, SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<usize, SecDbError> {
            let mut removed = 0;
            for (elt, bytes) in self.store.list_elements(txn, list)? {
                let rule: R = decode(&bytes)?;
                if rule_matches_filter(&rule, src_filter, dest_filter, block_type_filter) {
                    self.store.list_remove(txn, elt)?;
                    removed += 1;
                }
            }
            Ok(removed)
        })();
        let removed = self.finish(txn, outcome)?;

        tracing::debug!(
            "[dtnsec] cleared {} {} rule(s) matching {} -> {}",
            removed,
            R::KIND,
            src_filter,
            dest_filter
        );
        Ok(removed)
    }

    /// All rules of a kind, in insertion order.
    pub(super) fn list_eid_rules<R: SecurityRule>(
        &self,
        list: ListId,
    ) -> Result<Vec<R>, SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<Vec<R>, SecDbError> {
            let mut rules = Vec::new();
            for (_, bytes) in self.store.list_elements(txn, list)? {
                rules.push(decode(&bytes)?);
            }
            Ok(rules)
        })();
        self.finish(txn, outcome)
    }

    /// Locate a rule by literal endpoint-tuple equality.
    fn find_exact_rule<R: SecurityRule>(
        &self,
        txn: TxnToken,
        list: ListId,
        src: &EidExpression,
        dest: &EidExpression,
        block_type: u16,
    ) -> Result<Option<(ElementId, R)>, SecDbError> {
        for (elt, bytes) in self.store.list_elements(txn, list)? {
            let rule: R = decode(&bytes)?;
            if is_exact_duplicate(&rule, src, dest, block_type) {
                return Ok(Some((elt, rule)));
            }
        }
        Ok(None)
    }

    // =========================================================================
    // LTP rules: engine-id equality, no EID matching
    // =========================================================================

    /// Add an LTP rule for an engine not yet covered in this store.
    pub(super) fn add_ltp_rule(
        &mut self,
        list: ListId,
        engine_id: u64,
        ciphersuite_nbr: u8,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        let key_name = normalize_opt(key_name);
        validate_ltp_protection(ciphersuite_nbr, &key_name)?;

        let txn = self.store.begin()?;
        let outcome = (|| -> Result<(), SecDbError> {
            if self.find_ltp_elt(txn, list, engine_id)?.is_some() {
                return Err(SecDbError::DuplicateRule);
            }
            let rule = LtpAuthRule {
                engine_id,
                ciphersuite_nbr,
                key_name,
            };
            self.store.list_append(txn, list, &encode(&rule)?)?;
            Ok(())
        })();
        self.finish(txn, outcome)?;

        tracing::debug!("[dtnsec] ltp rule added: engine {}", engine_id);
        Ok(())
    }

    /// Replace the ciphersuite/key of the rule for an engine.
    pub(super) fn update_ltp_rule(
        &mut self,
        list: ListId,
        engine_id: u64,
        ciphersuite_nbr: u8,
        key_name: Option<&str>,
    ) -> Result<(), SecDbError> {
        let key_name = normalize_opt(key_name);
        validate_ltp_protection(ciphersuite_nbr, &key_name)?;

        let txn = self.store.begin()?;
        let outcome = (|| -> Result<(), SecDbError> {
            let (elt, mut rule) = self
                .find_ltp_elt(txn, list, engine_id)?
                .ok_or(SecDbError::RuleNotFound)?;
            rule.ciphersuite_nbr = ciphersuite_nbr;
            rule.key_name = key_name;
            self.store.list_update(txn, elt, &encode(&rule)?)?;
            Ok(())
        })();
        self.finish(txn, outcome)?;

        tracing::debug!("[dtnsec] ltp rule updated: engine {}", engine_id);
        Ok(())
    }

    /// Remove the rule for an engine.
    pub(super) fn remove_ltp_rule(&mut self, list: ListId, engine_id: u64) -> Result<(), SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<(), SecDbError> {
            let (elt, _) = self
                .find_ltp_elt(txn, list, engine_id)?
                .ok_or(SecDbError::RuleNotFound)?;
            self.store.list_remove(txn, elt)?;
            Ok(())
        })();
        self.finish(txn, outcome)?;

        tracing::debug!("[dtnsec] ltp rule removed: engine {}", engine_id);
        Ok(())
    }

    /// The rule for an engine, if any.
    pub(super) fn find_ltp_rule(
        &self,
        list: ListId,
        engine_id: u64,
    ) -> Result<Option<LtpAuthRule>, SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<Option<LtpAuthRule>, SecDbError> {
            Ok(self.find_ltp_elt(txn, list, engine_id)?.map(|(_, r)| r))
        })();
        self.finish(txn, outcome)
    }

    /// All rules in an LTP store, in insertion order.
    pub(super) fn list_ltp_rules(&self, list: ListId) -> Result<Vec<LtpAuthRule>, SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<Vec<LtpAuthRule>, SecDbError> {
            let mut rules = Vec::new();
            for (_, bytes) in self.store.list_elements(txn, list)? {
                rules.push(decode(&bytes)?);
            }
            Ok(rules)
        })();
        self.finish(txn, outcome)
    }

    fn find_ltp_elt(
        &self,
        txn: TxnToken,
        list: ListId,
        engine_id: u64,
    ) -> Result<Option<(ElementId, LtpAuthRule)>, SecDbError> {
        for (elt, bytes) in self.store.list_elements(txn, list)? {
            let rule: LtpAuthRule = decode(&bytes)?;
            if rule.engine_id == engine_id {
                return Ok(Some((elt, rule)));
            }
        }
        Ok(None)
    }

    /// Whether any rule in any store names this key (advisory).
    pub(super) fn key_referenced_in_txn(
        &self,
        txn: TxnToken,
        name: &str,
    ) -> Result<bool, SecDbError> {
        use crate::domain::entities::{BabRule, BcbRule, BibRule};

        if self.eid_rules_name_key::<BabRule>(txn, self.catalog.bab_rules, name)?
            || self.eid_rules_name_key::<BibRule>(txn, self.catalog.bib_rules, name)?
            || self.eid_rules_name_key::<BcbRule>(txn, self.catalog.bcb_rules, name)?
        {
            return Ok(true);
        }

        for list in [self.catalog.ltp_xmit_rules, self.catalog.ltp_recv_rules] {
            for (_, bytes) in self.store.list_elements(txn, list)? {
                let rule: LtpAuthRule = decode(&bytes)?;
                if rule.key_name.as_deref() == Some(name) {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    fn eid_rules_name_key<R: SecurityRule>(
        &self,
        txn: TxnToken,
        list: ListId,
        name: &str,
    ) -> Result<bool, SecDbError> {
        for (_, bytes) in self.store.list_elements(txn, list)? {
            let rule: R = decode(&bytes)?;
            if rule.key_name() == Some(name) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
