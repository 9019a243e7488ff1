//! # Policy Provisioning Flows
//!
//! End-to-end flows an administrator runs when bringing a node into a
//! security association: provision keys, install rules, verify that the
//! processors resolve the expected policy, then tear it down again.

#[cfg(test)]
mod tests {
    use dtnsec_db::{SecDb, SecDbError, SecurityDbApi};

    use rand::RngCore;

    fn random_key_material(len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    }

    #[test]
    fn test_full_bundle_security_association_setup() {
        crate::init_test_logging();
        let mut db = SecDb::initialize_in_memory().unwrap();

        // Provision the shared secrets first.
        let bab_key = random_key_material(20);
        let bib_key = random_key_material(32);
        db.add_key("bab-hmac", &bab_key).unwrap();
        db.add_key("bib-hmac", &bib_key).unwrap();

        // Authentication hop-by-hop, integrity on the payload block.
        db.add_bab_rule("ipn:1.*", "ipn:2.*", Some("BAB-HMAC-SHA1"), Some("bab-hmac"))
            .unwrap();
        db.add_bib_rule(
            "ipn:1.*",
            "ipn:2.*",
            1,
            Some("BIB-HMAC-SHA256"),
            Some("bib-hmac"),
        )
        .unwrap();

        // An outbound bundle from ipn:1.3 to ipn:2.9 resolves both rules,
        // and the named keys are retrievable.
        let bab = db.find_bab_rule("ipn:1.3", "ipn:2.9").unwrap().unwrap();
        assert_eq!(bab.ciphersuite.as_deref(), Some("BAB-HMAC-SHA1"));
        let material = db.get_key(bab.key_name.as_deref().unwrap()).unwrap();
        assert_eq!(material, Some(bab_key));

        let bib = db.find_bib_rule("ipn:1.3", "ipn:2.9", 1).unwrap().unwrap();
        assert_eq!(
            db.get_key(bib.key_name.as_deref().unwrap()).unwrap(),
            Some(bib_key)
        );

        // No confidentiality policy was installed.
        assert!(db.find_bcb_rule("ipn:1.3", "ipn:2.9", 1).unwrap().is_none());

        // Teardown: clear the association and confirm nothing resolves.
        assert_eq!(db.clear_bab_rules("ipn:1", "ipn:2").unwrap(), 1);
        assert_eq!(db.clear_bib_rules("ipn:1", "ipn:2", None).unwrap(), 1);
        assert!(db.find_bab_rule("ipn:1.3", "ipn:2.9").unwrap().is_none());
    }

    #[test]
    fn test_ltp_span_provisioning() {
        let mut db = SecDb::initialize_in_memory().unwrap();
        db.add_key("ltp-span-19", &random_key_material(16)).unwrap();

        db.add_ltp_xmit_rule(19, 1, Some("ltp-span-19")).unwrap();
        db.add_ltp_recv_rule(19, 1, Some("ltp-span-19")).unwrap();

        let xmit = db.find_ltp_xmit_rule(19).unwrap().unwrap();
        let recv = db.find_ltp_recv_rule(19).unwrap().unwrap();
        assert_eq!(xmit.key_name, recv.key_name);

        // An unknown engine has no policy.
        assert!(db.find_ltp_xmit_rule(20).unwrap().is_none());
    }

    #[test]
    fn test_key_rollover_under_live_rules() {
        let mut db = SecDb::initialize_in_memory().unwrap();
        let old = random_key_material(20);
        let new = random_key_material(20);

        db.add_key("session", &old).unwrap();
        db.add_bcb_rule("ipn:5.*", "ipn:6.*", 0, Some("BCB-AES-GCM"), Some("session"))
            .unwrap();

        // Rolling the key in place leaves the rule untouched and the
        // processors pick up the new material on the next lookup.
        db.update_key("session", &new).unwrap();
        let rule = db.find_bcb_rule("ipn:5.1", "ipn:6.1", 2).unwrap().unwrap();
        assert_eq!(
            db.get_key(rule.key_name.as_deref().unwrap()).unwrap(),
            Some(new)
        );
    }

    #[test]
    fn test_failed_mutation_leaves_association_intact() {
        let mut db = SecDb::initialize_in_memory().unwrap();
        db.add_key("k", b"material").unwrap();
        db.add_bab_rule("ipn:1.*", "ipn:2.*", Some("CS"), Some("k")).unwrap();

        db.store().fail_next_commit();
        let err = db
            .add_bab_rule("ipn:3.*", "ipn:4.*", Some("CS"), Some("k"))
            .unwrap_err();
        assert!(matches!(err, SecDbError::StorageFailure { .. }));

        // The pre-existing association still resolves; the failed rule
        // never became visible.
        assert!(db.find_bab_rule("ipn:1.0", "ipn:2.0").unwrap().is_some());
        assert!(db.find_bab_rule("ipn:3.0", "ipn:4.0").unwrap().is_none());
        assert_eq!(db.list_bab_rules().unwrap().len(), 1);
    }

    #[test]
    fn test_rule_precedence_is_administrative_order() {
        let mut db = SecDb::initialize_in_memory().unwrap();
        db.add_key("default", b"d").unwrap();
        db.add_key("special", b"s").unwrap();

        // The operator installs a catch-all first, then a narrower rule.
        // Lookup honors installation order, so the catch-all shadows the
        // narrower rule until it is removed.
        db.add_bab_rule("~", "~", Some("CS"), Some("default")).unwrap();
        db.add_bab_rule("ipn:7.*", "ipn:8.*", Some("CS"), Some("special"))
            .unwrap();

        let rule = db.find_bab_rule("ipn:7.1", "ipn:8.1").unwrap().unwrap();
        assert_eq!(rule.key_name.as_deref(), Some("default"));

        db.remove_bab_rule("~", "~").unwrap();
        let rule = db.find_bab_rule("ipn:7.1", "ipn:8.1").unwrap().unwrap();
        assert_eq!(rule.key_name.as_deref(), Some("special"));
    }
}
