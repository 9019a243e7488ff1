//! # File-Backed Persistence
//!
//! The database over `FileTxnStore`: initialize, populate, drop the
//! handle, reopen with `attach`, and confirm every store (including the
//! rebuilt time indexes) survived the restart.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::OnceLock;

    use dtnsec_db::{
        EffectiveTime, FileTxnStore, FsKeyMaterialLoader, SecDb, SecDbConfig, SecDbError,
        SecurityDbApi,
    };

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "dtnsec-persist-{}-{}-{}",
            tag,
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ))
    }

    fn t(seconds: u64) -> EffectiveTime {
        EffectiveTime::new(seconds, 0)
    }

    fn open(dir: &PathBuf) -> FileTxnStore {
        FileTxnStore::open(dir).expect("open store")
    }

    #[test]
    fn test_full_database_survives_reopen() {
        let dir = temp_dir("roundtrip");

        {
            let store = open(&dir);
            let mut db = SecDb::initialize(store, FsKeyMaterialLoader, SecDbConfig::default())
                .expect("initialize");

            db.add_key("bab-hmac", b"secret").unwrap();
            db.add_bab_rule("ipn:1.*", "ipn:2.*", Some("CS"), Some("bab-hmac"))
                .unwrap();
            db.add_bib_rule("ipn:1.*", "ipn:2.*", 1, Some("CS"), Some("bab-hmac"))
                .unwrap();
            db.add_ltp_recv_rule(7, 1, Some("bab-hmac")).unwrap();
            db.add_peer_public_key(5, t(10), t(10), b"peer").unwrap();
            db.add_own_private_key(t(10), b"priv").unwrap();
        }

        let store = open(&dir);
        let db = SecDb::attach(store, FsKeyMaterialLoader, SecDbConfig::default()).expect("attach");

        assert_eq!(db.get_key("bab-hmac").unwrap(), Some(b"secret".to_vec()));
        assert!(db.find_bab_rule("ipn:1.0", "ipn:2.0").unwrap().is_some());
        assert!(db.find_bib_rule("ipn:1.0", "ipn:2.0", 1).unwrap().is_some());
        assert!(db.find_ltp_recv_rule(7).unwrap().is_some());
        assert_eq!(
            db.get_peer_public_key_as_of(5, t(50)).unwrap(),
            Some(b"peer".to_vec())
        );
        assert_eq!(
            db.get_own_private_key_as_of(t(50)).unwrap(),
            Some(b"priv".to_vec())
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_attach_to_empty_directory_fails() {
        let dir = temp_dir("empty");
        let store = open(&dir);
        let err =
            SecDb::attach(store, FsKeyMaterialLoader, SecDbConfig::default()).unwrap_err();
        assert_eq!(err, SecDbError::NotInitialized);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_initialize_refused_on_populated_directory() {
        let dir = temp_dir("reinit");
        {
            let store = open(&dir);
            let _db = SecDb::initialize(store, FsKeyMaterialLoader, SecDbConfig::default())
                .expect("initialize");
        }

        let store = open(&dir);
        let err =
            SecDb::initialize(store, FsKeyMaterialLoader, SecDbConfig::default()).unwrap_err();
        assert_eq!(err, SecDbError::AlreadyInitialized);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_slot_uniqueness_enforced_across_restart() {
        let dir = temp_dir("slots");
        {
            let store = open(&dir);
            let mut db = SecDb::initialize(store, FsKeyMaterialLoader, SecDbConfig::default())
                .expect("initialize");
            db.add_peer_public_key(9, t(100), t(100), b"k").unwrap();
        }

        let store = open(&dir);
        let mut db =
            SecDb::attach(store, FsKeyMaterialLoader, SecDbConfig::default()).expect("attach");
        // The rebuilt index still knows the slot is taken.
        assert_eq!(
            db.add_peer_public_key(9, t(100), t(101), b"k2").unwrap_err(),
            SecDbError::DuplicateKeySlot {
                node_nbr: 9,
                effective_time: t(100),
            }
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    // A composition root that wants one handle per process caches it in a
    // OnceLock; the database itself carries no hidden singleton.
    #[test]
    fn test_once_lock_composition_root() {
        static DB: OnceLock<std::sync::Mutex<SecDb<FileTxnStore, FsKeyMaterialLoader>>> =
            OnceLock::new();

        let dir = temp_dir("oncelock");
        let handle = DB.get_or_init(|| {
            let store = FileTxnStore::open(&dir).expect("open store");
            std::sync::Mutex::new(
                SecDb::initialize(store, FsKeyMaterialLoader, SecDbConfig::default())
                    .expect("initialize"),
            )
        });

        let mut db = handle.lock().unwrap();
        db.add_key("k", b"v").unwrap();
        assert_eq!(db.get_key("k").unwrap(), Some(b"v".to_vec()));
        drop(db);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
