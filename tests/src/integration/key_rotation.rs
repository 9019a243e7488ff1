//! # Asymmetric Key Rotation
//!
//! Point-in-time retrieval across a rotation history: a verifier handed a
//! signature timestamped at T must fetch the key that governed T, even
//! after several newer keys have been installed.

#[cfg(test)]
mod tests {
    use dtnsec_db::{EffectiveTime, SecDb, SecDbError, SecurityDbApi};

    fn t(seconds: u64) -> EffectiveTime {
        EffectiveTime::new(seconds, 0)
    }

    #[test]
    fn test_verifier_sees_rotation_history() {
        let mut db = SecDb::initialize_in_memory().unwrap();

        // Node 12 rotates its signing key three times.
        db.add_peer_public_key(12, t(100), t(100), b"gen-1").unwrap();
        db.add_peer_public_key(12, t(200), t(205), b"gen-2").unwrap();
        db.add_peer_public_key(12, t(300), t(310), b"gen-3").unwrap();

        // Old bundles verify against the keys of their era.
        assert_eq!(
            db.get_peer_public_key_as_of(12, t(150)).unwrap(),
            Some(b"gen-1".to_vec())
        );
        assert_eq!(
            db.get_peer_public_key_as_of(12, t(200)).unwrap(),
            Some(b"gen-2".to_vec())
        );
        assert_eq!(
            db.get_peer_public_key_as_of(12, t(1000)).unwrap(),
            Some(b"gen-3".to_vec())
        );
        // Nothing governed the time before the first key.
        assert_eq!(db.get_peer_public_key_as_of(12, t(99)).unwrap(), None);
    }

    #[test]
    fn test_revoking_a_compromised_generation() {
        let mut db = SecDb::initialize_in_memory().unwrap();
        db.add_peer_public_key(12, t(100), t(100), b"gen-1").unwrap();
        db.add_peer_public_key(12, t(200), t(200), b"gen-2").unwrap();

        // gen-2 is compromised and withdrawn; queries in its window fall
        // back to gen-1.
        db.remove_peer_public_key(12, t(200)).unwrap();
        assert_eq!(
            db.get_peer_public_key_as_of(12, t(250)).unwrap(),
            Some(b"gen-1".to_vec())
        );
    }

    #[test]
    fn test_own_key_pair_rotation() {
        let mut db = SecDb::initialize_in_memory().unwrap();
        db.add_own_public_key(t(100), b"pub-1").unwrap();
        db.add_own_private_key(t(100), b"priv-1").unwrap();
        db.add_own_public_key(t(200), b"pub-2").unwrap();
        db.add_own_private_key(t(200), b"priv-2").unwrap();

        // Signing at t=150 uses generation 1, at t=250 generation 2.
        assert_eq!(
            db.get_own_private_key_as_of(t(150)).unwrap(),
            Some(b"priv-1".to_vec())
        );
        assert_eq!(
            db.get_own_private_key_as_of(t(250)).unwrap(),
            Some(b"priv-2".to_vec())
        );
        assert_eq!(
            db.get_own_public_key_as_of(t(250)).unwrap(),
            Some(b"pub-2".to_vec())
        );
    }

    #[test]
    fn test_sub_second_rotation_uses_disambiguation_count() {
        let mut db = SecDb::initialize_in_memory().unwrap();
        let first = EffectiveTime::new(100, 0);
        let second = EffectiveTime::new(100, 1);

        db.add_peer_public_key(3, first, first, b"a").unwrap();
        db.add_peer_public_key(3, second, second, b"b").unwrap();

        // At count 0 only the first key governs; at count 1 the second
        // supersedes it.
        assert_eq!(
            db.get_peer_public_key_as_of(3, first).unwrap(),
            Some(b"a".to_vec())
        );
        assert_eq!(
            db.get_peer_public_key_as_of(3, second).unwrap(),
            Some(b"b".to_vec())
        );
    }

    #[test]
    fn test_neighbor_nodes_never_bleed_keys() {
        let mut db = SecDb::initialize_in_memory().unwrap();
        db.add_peer_public_key(11, t(100), t(100), b"node-11").unwrap();
        db.add_peer_public_key(13, t(100), t(100), b"node-13").unwrap();

        // Node 12 sits between two populated neighbors in the index and
        // must still resolve to nothing.
        assert_eq!(db.get_peer_public_key_as_of(12, t(500)).unwrap(), None);
        assert!(matches!(
            db.remove_peer_public_key(12, t(100)).unwrap_err(),
            SecDbError::AsymKeyNotFound { .. }
        ));
    }
}
