//! # DTN Security Policy Database (dtnsec-db)
//!
//! The security database is the authoritative policy store for a DTN node:
//! symmetric keys, time-indexed asymmetric keys, and the rule stores the
//! bundle- and transport-layer security processors consult on every
//! protected block and segment.
//!
//! ## Stores
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!  admin surface ───→│        SecDb (service)       │←─── BAB/BIB/BCB + LTP
//!                    │                              │     processors
//!                    │  keys          bab_rules     │
//!                    │  peer pub      bib_rules     │
//!                    │  own pub       bcb_rules     │
//!                    │  own priv      ltp xmit/recv │
//!                    └──────────────┬───────────────┘
//!                                   ↓
//!                        [TransactionalStore SPI]
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Atomic Mutations | begin -> validate -> write -> commit; abort on failure |
//! | 2 | Literal Uniqueness | No two rules with an equal canonical endpoint tuple |
//! | 3 | First Match Wins | Rule lookup scans in insertion order |
//! | 4 | Slot Uniqueness | One asymmetric key per (node, effective time) slot |
//! | 5 | Index Lock-Step | Time indexes change only after a successful commit |
//! | 6 | Truncating Matcher | The EID prefix comparison is preserved as inherited |
//! | 7 | Weak Key References | Rule -> key links never block key removal |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure domain logic (EID matching, rules, time index, errors)
//! - `ports/` - Port traits (inbound API, outbound store and loader SPI)
//! - `service/` - The `SecDb` aggregate implementing the API
//! - `adapters/` - In-memory and file-backed store adapters
//!
//! ## Usage
//!
//! ```ignore
//! use dtnsec_db::{SecDb, SecurityDbApi};
//!
//! let mut db = SecDb::initialize_in_memory()?;
//! db.add_key("bab-hmac", &key_material)?;
//! db.add_bab_rule("ipn:1.*", "ipn:2.*", Some("HMAC-SHA1"), Some("bab-hmac"))?;
//!
//! if let Some(rule) = db.find_bab_rule("ipn:1.4", "ipn:2.6")? {
//!     // apply the rule's ciphersuite and key
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use adapters::{FileTxnStore, FsKeyMaterialLoader, InMemoryTxnStore};
pub use domain::eid::{EidContext, EidExpression, MAX_EID_LEN};
pub use domain::entities::{
    BabRule, BcbRule, BibRule, EffectiveTime, LtpAuthRule, SecDbConfig, LTP_NULL_CIPHERSUITE,
    MAX_KEY_NAME_LEN,
};
pub use domain::errors::SecDbError;
pub use domain::rules::SecurityRule;
pub use ports::inbound::SecurityDbApi;
pub use ports::outbound::{
    ElementId, KeyMaterialLoader, ListId, LoadError, StoreError, TransactionalStore, TxnToken,
};
pub use service::SecDb;
