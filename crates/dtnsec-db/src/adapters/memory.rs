//! # In-Memory Transactional Store
//!
//! Non-durable `TransactionalStore` adapter for unit tests and single-run
//! tooling. Handles are cheap clones sharing one store, so a database can
//! be initialized, dropped and re-attached against the same state.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::adapters::image::TxnState;
use crate::ports::outbound::{ElementId, ListId, StoreError, TransactionalStore, TxnToken};

/// In-memory transactional store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTxnStore {
    inner: Arc<Mutex<TxnState>>,
}

impl InMemoryTxnStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrange for the next commit to fail, for atomicity tests.
    pub fn fail_next_commit(&self) {
        self.lock().set_fail_next_commit();
    }

    fn lock(&self) -> MutexGuard<'_, TxnState> {
        // A poisoned mutex means a writer panicked mid-stage; staged ops
        // are per-transaction and the committed image is only replaced
        // whole, so the state is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TransactionalStore for InMemoryTxnStore {
    fn begin(&self) -> Result<TxnToken, StoreError> {
        Ok(self.lock().begin())
    }

    fn commit(&self, txn: TxnToken) -> Result<(), StoreError> {
        let mut state = self.lock();
        let image = state.commit(txn)?;
        state.image = image;
        Ok(())
    }

    fn abort(&self, txn: TxnToken) {
        self.lock().abort(txn);
    }

    fn list_create(&self, txn: TxnToken) -> Result<ListId, StoreError> {
        self.lock().list_create(txn)
    }

    fn list_append(
        &self,
        txn: TxnToken,
        list: ListId,
        bytes: &[u8],
    ) -> Result<ElementId, StoreError> {
        self.lock().list_append(txn, list, bytes)
    }

    fn list_update(&self, txn: TxnToken, elt: ElementId, bytes: &[u8]) -> Result<(), StoreError> {
        self.lock().list_update(txn, elt, bytes)
    }

    fn list_remove(&self, txn: TxnToken, elt: ElementId) -> Result<(), StoreError> {
        self.lock().list_remove(txn, elt)
    }

    fn list_elements(
        &self,
        txn: TxnToken,
        list: ListId,
    ) -> Result<Vec<(ElementId, Vec<u8>)>, StoreError> {
        self.lock().list_elements(txn, list)
    }

    fn element_read(&self, txn: TxnToken, elt: ElementId) -> Result<Vec<u8>, StoreError> {
        self.lock().element_read(txn, elt)
    }

    fn catalog_put(&self, txn: TxnToken, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.lock().catalog_put(txn, name, bytes)
    }

    fn catalog_get(&self, txn: TxnToken, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.lock().catalog_get(txn, name)
    }
}
