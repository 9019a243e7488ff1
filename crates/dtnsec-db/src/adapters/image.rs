//! # Store Image
//!
//! Shared transactional model used by both the in-memory and file-backed
//! `TransactionalStore` adapters: a committed image of lists, elements and
//! the catalog, plus per-transaction staged operations that become visible
//! only on commit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ports::outbound::{ElementId, ListId, StoreError, TxnToken};

/// The committed state of a store: every list, element and catalog entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreImage {
    /// Next list id to allocate.
    pub next_list: u64,
    /// Next element id to allocate. Ids are never reused.
    pub next_element: u64,
    /// List id -> element ids in insertion order.
    pub lists: HashMap<u64, Vec<u64>>,
    /// Element id -> content.
    pub elements: HashMap<u64, Vec<u8>>,
    /// Element id -> owning list id.
    pub element_list: HashMap<u64, u64>,
    /// Named catalog entries.
    pub catalog: HashMap<String, Vec<u8>>,
}

impl StoreImage {
    /// Apply one staged operation, validating against the current state.
    fn apply(&mut self, op: &Op) -> Result<(), StoreError> {
        match op {
            Op::ListCreate { list } => {
                self.lists.insert(*list, Vec::new());
            }
            Op::Append { list, elt, bytes } => {
                let order = self
                    .lists
                    .get_mut(list)
                    .ok_or(StoreError::UnknownList(ListId(*list)))?;
                order.push(*elt);
                self.elements.insert(*elt, bytes.clone());
                self.element_list.insert(*elt, *list);
            }
            Op::Update { elt, bytes } => {
                let slot = self
                    .elements
                    .get_mut(elt)
                    .ok_or(StoreError::UnknownElement(ElementId(*elt)))?;
                *slot = bytes.clone();
            }
            Op::Remove { elt } => {
                self.elements
                    .remove(elt)
                    .ok_or(StoreError::UnknownElement(ElementId(*elt)))?;
                if let Some(list) = self.element_list.remove(elt) {
                    if let Some(order) = self.lists.get_mut(&list) {
                        order.retain(|e| e != elt);
                    }
                }
            }
            Op::CatalogPut { name, bytes } => {
                self.catalog.insert(name.clone(), bytes.clone());
            }
        }
        Ok(())
    }
}

/// A write staged inside a transaction.
#[derive(Debug, Clone)]
pub(crate) enum Op {
    ListCreate { list: u64 },
    Append { list: u64, elt: u64, bytes: Vec<u8> },
    Update { elt: u64, bytes: Vec<u8> },
    Remove { elt: u64 },
    CatalogPut { name: String, bytes: Vec<u8> },
}

/// Committed image plus in-flight transactions.
///
/// Adapters wrap this in a mutex; the coarse lock matches the external
/// store's single-writer contract.
#[derive(Debug, Default)]
pub(crate) struct TxnState {
    pub image: StoreImage,
    next_txn: u64,
    pending: HashMap<u64, Vec<Op>>,
    fail_next_commit: bool,
}

impl TxnState {
    pub fn with_image(image: StoreImage) -> Self {
        Self {
            image,
            ..Self::default()
        }
    }

    pub fn begin(&mut self) -> TxnToken {
        let token = TxnToken(self.next_txn);
        self.next_txn += 1;
        self.pending.insert(token.0, Vec::new());
        token
    }

    /// Arrange for the next commit to fail, simulating storage exhaustion.
    pub fn set_fail_next_commit(&mut self) {
        self.fail_next_commit = true;
    }

    /// The committed image overlaid with this transaction's staged writes.
    pub fn view(&self, txn: TxnToken) -> Result<StoreImage, StoreError> {
        let ops = self.pending.get(&txn.0).ok_or(StoreError::NoTransaction)?;
        let mut view = self.image.clone();
        for op in ops {
            view.apply(op)?;
        }
        Ok(view)
    }

    /// Validate an operation against the transaction's view and stage it.
    fn stage(&mut self, txn: TxnToken, op: Op) -> Result<(), StoreError> {
        let mut view = self.view(txn)?;
        view.apply(&op)?;
        self.pending
            .get_mut(&txn.0)
            .ok_or(StoreError::NoTransaction)?
            .push(op);
        Ok(())
    }

    pub fn list_create(&mut self, txn: TxnToken) -> Result<ListId, StoreError> {
        let list = self.image.next_list;
        self.image.next_list += 1;
        self.stage(txn, Op::ListCreate { list })?;
        Ok(ListId(list))
    }

    pub fn list_append(
        &mut self,
        txn: TxnToken,
        list: ListId,
        bytes: &[u8],
    ) -> Result<ElementId, StoreError> {
        let elt = self.image.next_element;
        self.image.next_element += 1;
        self.stage(
            txn,
            Op::Append {
                list: list.0,
                elt,
                bytes: bytes.to_vec(),
            },
        )?;
        Ok(ElementId(elt))
    }

    pub fn list_update(
        &mut self,
        txn: TxnToken,
        elt: ElementId,
        bytes: &[u8],
    ) -> Result<(), StoreError> {
        self.stage(
            txn,
            Op::Update {
                elt: elt.0,
                bytes: bytes.to_vec(),
            },
        )
    }

    pub fn list_remove(&mut self, txn: TxnToken, elt: ElementId) -> Result<(), StoreError> {
        self.stage(txn, Op::Remove { elt: elt.0 })
    }

    pub fn list_elements(
        &self,
        txn: TxnToken,
        list: ListId,
    ) -> Result<Vec<(ElementId, Vec<u8>)>, StoreError> {
        let view = self.view(txn)?;
        let order = view
            .lists
            .get(&list.0)
            .ok_or(StoreError::UnknownList(list))?;
        let mut out = Vec::with_capacity(order.len());
        for elt in order {
            let bytes = view
                .elements
                .get(elt)
                .ok_or(StoreError::UnknownElement(ElementId(*elt)))?;
            out.push((ElementId(*elt), bytes.clone()));
        }
        Ok(out)
    }

    pub fn element_read(&self, txn: TxnToken, elt: ElementId) -> Result<Vec<u8>, StoreError> {
        let view = self.view(txn)?;
        view.elements
            .get(&elt.0)
            .cloned()
            .ok_or(StoreError::UnknownElement(elt))
    }

    pub fn catalog_put(
        &mut self,
        txn: TxnToken,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), StoreError> {
        self.stage(
            txn,
            Op::CatalogPut {
                name: name.to_string(),
                bytes: bytes.to_vec(),
            },
        )
    }

    pub fn catalog_get(&self, txn: TxnToken, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let view = self.view(txn)?;
        Ok(view.catalog.get(name).cloned())
    }

    /// Drain the transaction and produce the image it would commit.
    ///
    /// The caller installs (and, for durable adapters, persists) the
    /// returned image; on any error the transaction is already aborted and
    /// no staged write is visible.
    pub fn commit(&mut self, txn: TxnToken) -> Result<StoreImage, StoreError> {
        let ops = self.pending.remove(&txn.0).ok_or(StoreError::NoTransaction)?;

        if self.fail_next_commit {
            self.fail_next_commit = false;
            return Err(StoreError::CommitFailed {
                message: "simulated storage exhaustion".to_string(),
            });
        }

        let mut image = self.image.clone();
        for op in &ops {
            // Ops were validated when staged; a failure here means the
            // store's own bookkeeping is corrupt.
            image.apply(op)?;
        }
        Ok(image)
    }

    pub fn abort(&mut self, txn: TxnToken) {
        self.pending.remove(&txn.0);
    }
}
