//! # EID Matching Through the Public API
//!
//! The wildcard matcher as the security processors observe it: via rule
//! lookups, never by calling the matcher directly. Includes the inherited
//! truncating-prefix vectors, which downstream deployments rely on.

#[cfg(test)]
mod tests {
    use dtnsec_db::{SecDb, SecDbError, SecurityDbApi, MAX_EID_LEN};

    fn db_with_bab(sender: &str, receiver: &str) -> SecDb<dtnsec_db::InMemoryTxnStore, dtnsec_db::FsKeyMaterialLoader> {
        let mut db = SecDb::initialize_in_memory().unwrap();
        db.add_bab_rule(sender, receiver, None, None).unwrap();
        db
    }

    #[test]
    fn test_star_and_tilde_are_interchangeable_on_input() {
        let db = db_with_bab("ipn:1.*", "ipn:2.~");
        assert!(db.find_bab_rule("ipn:1.5", "ipn:2.5").unwrap().is_some());

        // Stored form is canonical: a tilde-spelled duplicate is rejected.
        let mut db = db;
        assert_eq!(
            db.add_bab_rule("ipn:1.~", "ipn:2.*", None, None).unwrap_err(),
            SecDbError::DuplicateRule
        );
    }

    #[test]
    fn test_bare_wildcard_covers_every_endpoint() {
        let db = db_with_bab("~", "~");
        for (s, r) in [
            ("ipn:1.0", "ipn:2.0"),
            ("dtn://relay/ping", "dtn://base/pong"),
            ("~", "ipn:9.9"),
        ] {
            assert!(
                db.find_bab_rule(s, r).unwrap().is_some(),
                "catch-all should govern {s} -> {r}"
            );
        }
    }

    #[test]
    fn test_wildcard_scopes_to_its_prefix() {
        let db = db_with_bab("ipn:1.~", "~");
        assert!(db.find_bab_rule("ipn:1.9", "ipn:2.0").unwrap().is_some());
        assert!(db.find_bab_rule("ipn:2.9", "ipn:2.0").unwrap().is_none());
    }

    #[test]
    fn test_truncating_prefix_vectors() {
        // The matcher compares only the shorter prefix and never checks
        // that the shorter side was fully consumed. "ipn:1.~" therefore
        // also governs node 12; deployments depend on this.
        let db = db_with_bab("ipn:1~", "~");
        assert!(db.find_bab_rule("ipn:12.0", "ipn:2.0").unwrap().is_some());
        assert!(db.find_bab_rule("ipn:1", "ipn:2.0").unwrap().is_some());

        let db = db_with_bab("ipn:2~", "~");
        assert!(db.find_bab_rule("ipn:12.0", "ipn:2.0").unwrap().is_none());
    }

    #[test]
    fn test_query_eid_length_bounds() {
        let db = db_with_bab("~", "~");

        assert_eq!(
            db.find_bab_rule("", "~").unwrap_err(),
            SecDbError::InvalidEidLength { len: 0 }
        );
        let overlong = "x".repeat(MAX_EID_LEN + 1);
        assert!(matches!(
            db.find_bab_rule(&overlong, "~").unwrap_err(),
            SecDbError::InvalidEidLength { .. }
        ));
        // Exactly the limit is accepted.
        let max = "x".repeat(MAX_EID_LEN);
        assert!(db.find_bab_rule(&max, "ipn:1.1").unwrap().is_some());
    }

    #[test]
    fn test_queries_need_not_be_wildcarded_but_rules_must() {
        let mut db = SecDb::initialize_in_memory().unwrap();
        assert!(matches!(
            db.add_bab_rule("ipn:1.1", "ipn:2.*", None, None).unwrap_err(),
            SecDbError::RuleMustCoverWholeNode { .. }
        ));

        db.add_bab_rule("ipn:1.*", "ipn:2.*", None, None).unwrap();
        // A fully concrete query is fine.
        assert!(db.find_bab_rule("ipn:1.1", "ipn:2.2").unwrap().is_some());
    }

    #[test]
    fn test_matching_is_symmetric_between_rule_and_query() {
        // A wildcarded query matches a rule whose stored endpoint is the
        // concrete-side prefix, exercising the query-side wildcard arm.
        let db = db_with_bab("ipn:1.2~", "~");
        assert!(db.find_bab_rule("ipn:1.~", "ipn:5.5").unwrap().is_some());
    }
}
