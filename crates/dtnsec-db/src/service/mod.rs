//! # Security Database Service
//!
//! The aggregate root owning the six rule/key stores and the
//! initialize/attach lifecycle.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `SecurityDbApi` (the inbound port)
//! 2. Expresses every store purely through the `TransactionalStore` SPI
//! 3. Keeps the three asymmetric-key time indexes in lock-step with
//!    committed storage
//! 4. Runs each mutation as begin -> validate -> write -> commit, aborting
//!    on any failure so no partial state is ever visible

mod api;
mod asym;
mod keys;
mod rules;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::adapters::{FsKeyMaterialLoader, InMemoryTxnStore};
use crate::domain::entities::{EffectiveTime, OwnKeyRecord, PeerPublicKeyRecord, SecDbConfig};
use crate::domain::errors::SecDbError;
use crate::domain::time_index::TimeIndex;
use crate::ports::outbound::{
    ElementId, KeyMaterialLoader, ListId, TransactionalStore, TxnToken,
};

/// Catalog name under which the database root record is registered.
const CATALOG_NAME: &str = "dtnsec-db";

/// State rebuilt by `attach`: the catalog plus the three time indexes.
type AttachState = (
    SecDbCatalog,
    TimeIndex<(u64, EffectiveTime), ElementId>,
    TimeIndex<EffectiveTime, ElementId>,
    TimeIndex<EffectiveTime, ElementId>,
);

/// Root record: the persistent list of each store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SecDbCatalog {
    keys: ListId,
    bab_rules: ListId,
    bib_rules: ListId,
    bcb_rules: ListId,
    ltp_xmit_rules: ListId,
    ltp_recv_rules: ListId,
    peer_public_keys: ListId,
    own_public_keys: ListId,
    own_private_keys: ListId,
}

/// An attached security database handle.
///
/// Obtained from [`SecDb::initialize`] or [`SecDb::attach`]; there is no
/// hidden process-wide singleton. A composition root that wants one handle
/// per process caches the value in a `std::sync::OnceLock`.
#[derive(Debug)]
pub struct SecDb<S: TransactionalStore, L: KeyMaterialLoader> {
    store: S,
    loader: L,
    config: SecDbConfig,
    catalog: SecDbCatalog,
    /// (node_nbr, effective_time) -> persistent element.
    peer_key_index: TimeIndex<(u64, EffectiveTime), ElementId>,
    /// effective_time -> persistent element, own public keys.
    own_public_index: TimeIndex<EffectiveTime, ElementId>,
    /// effective_time -> persistent element, own private keys.
    own_private_index: TimeIndex<EffectiveTime, ElementId>,
}

impl<S: TransactionalStore, L: KeyMaterialLoader> SecDb<S, L> {
    /// Create a new empty database in the store.
    ///
    /// # Errors
    /// * `AlreadyInitialized` - a database already exists in this store
    /// * `StorageFailure` - the store could not create or commit
    pub fn initialize(store: S, loader: L, config: SecDbConfig) -> Result<Self, SecDbError> {
        let txn = store.begin()?;
        let outcome = (|| -> Result<SecDbCatalog, SecDbError> {
            if store.catalog_get(txn, CATALOG_NAME)?.is_some() {
                return Err(SecDbError::AlreadyInitialized);
            }

            let catalog = SecDbCatalog {
                keys: store.list_create(txn)?,
                bab_rules: store.list_create(txn)?,
                bib_rules: store.list_create(txn)?,
                bcb_rules: store.list_create(txn)?,
                ltp_xmit_rules: store.list_create(txn)?,
                ltp_recv_rules: store.list_create(txn)?,
                peer_public_keys: store.list_create(txn)?,
                own_public_keys: store.list_create(txn)?,
                own_private_keys: store.list_create(txn)?,
            };
            store.catalog_put(txn, CATALOG_NAME, &encode(&catalog)?)?;
            Ok(catalog)
        })();

        let catalog = match outcome {
            Ok(catalog) => {
                store.commit(txn)?;
                catalog
            }
            Err(err) => {
                store.abort(txn);
                return Err(err);
            }
        };

        tracing::info!("[dtnsec] security database initialized");
        Ok(Self {
            store,
            loader,
            config,
            catalog,
            peer_key_index: TimeIndex::new(),
            own_public_index: TimeIndex::new(),
            own_private_index: TimeIndex::new(),
        })
    }

    /// Open an existing database and rebuild the asymmetric-key time
    /// indexes by replaying the persistent lists once.
    ///
    /// # Errors
    /// * `NotInitialized` - no database exists in this store
    /// * `StorageFailure` - the store could not be read
    pub fn attach(store: S, loader: L, config: SecDbConfig) -> Result<Self, SecDbError> {
        let txn = store.begin()?;
        let outcome = (|| -> Result<AttachState, SecDbError> {
            let bytes = store
                .catalog_get(txn, CATALOG_NAME)?
                .ok_or(SecDbError::NotInitialized)?;
            let catalog: SecDbCatalog = decode(&bytes)?;

            let mut peer_key_index = TimeIndex::new();
            for (elt, bytes) in store.list_elements(txn, catalog.peer_public_keys)? {
                let record: PeerPublicKeyRecord = decode(&bytes)?;
                if !peer_key_index.insert((record.node_nbr, record.effective_time), elt) {
                    tracing::warn!(
                        "[dtnsec] duplicate peer key slot in storage: node {}, effective {}",
                        record.node_nbr,
                        record.effective_time
                    );
                }
            }

            let mut own_public_index = TimeIndex::new();
            for (elt, bytes) in store.list_elements(txn, catalog.own_public_keys)? {
                let record: OwnKeyRecord = decode(&bytes)?;
                own_public_index.insert(record.effective_time, elt);
            }

            let mut own_private_index = TimeIndex::new();
            for (elt, bytes) in store.list_elements(txn, catalog.own_private_keys)? {
                let record: OwnKeyRecord = decode(&bytes)?;
                own_private_index.insert(record.effective_time, elt);
            }

            Ok((catalog, peer_key_index, own_public_index, own_private_index))
        })();

        let (catalog, peer_key_index, own_public_index, own_private_index) = match outcome {
            Ok(loaded) => {
                store.commit(txn)?;
                loaded
            }
            Err(err) => {
                store.abort(txn);
                return Err(err);
            }
        };

        tracing::info!(
            "[dtnsec] attached: {} peer keys, {} own public, {} own private indexed",
            peer_key_index.len(),
            own_public_index.len(),
            own_private_index.len()
        );
        Ok(Self {
            store,
            loader,
            config,
            catalog,
            peer_key_index,
            own_public_index,
            own_private_index,
        })
    }

    /// The underlying store (test hooks, composition-root introspection).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &SecDbConfig {
        &self.config
    }

    /// Commit on success, abort on failure. The single write-path shape of
    /// every operation in this service.
    fn finish<T>(&self, txn: TxnToken, outcome: Result<T, SecDbError>) -> Result<T, SecDbError> {
        match outcome {
            Ok(value) => {
                self.store.commit(txn)?;
                Ok(value)
            }
            Err(err) => {
                self.store.abort(txn);
                Err(err)
            }
        }
    }
}

impl SecDb<InMemoryTxnStore, FsKeyMaterialLoader> {
    /// Create a fresh database over an in-memory store, for tests and
    /// single-run tooling.
    pub fn initialize_in_memory() -> Result<Self, SecDbError> {
        Self::initialize(
            InMemoryTxnStore::new(),
            FsKeyMaterialLoader,
            SecDbConfig::default(),
        )
    }
}

/// Encode a persisted record.
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, SecDbError> {
    bincode::serialize(value).map_err(|e| SecDbError::Serialization {
        message: e.to_string(),
    })
}

/// Decode a persisted record.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SecDbError> {
    bincode::deserialize(bytes).map_err(|e| SecDbError::Serialization {
        message: e.to_string(),
    })
}
