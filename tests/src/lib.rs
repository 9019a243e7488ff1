//! # dtnsec-db Test Suite
//!
//! Unified test crate exercising the security database through its public
//! API only.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── policy_flows.rs     # End-to-end key + rule provisioning flows
//!     ├── key_rotation.rs     # Point-in-time asymmetric key retrieval
//!     ├── persistence.rs      # File-backed store, reopen and attach
//!     └── matcher.rs          # EID matching observed through rule lookup
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dtnsec-tests
//! cargo test -p dtnsec-tests integration::persistence::
//! ```

#![allow(dead_code)]

pub mod integration;

/// Install the env-filtered log subscriber once per test process.
///
/// Run with `RUST_LOG=dtnsec_db=debug cargo test -p dtnsec-tests` to see
/// the database's event log alongside failing assertions.
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
