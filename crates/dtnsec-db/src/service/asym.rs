//! # Time-Indexed Asymmetric Key Stores
//!
//! Peer public keys (keyed by node number and effective time) and the
//! local node's own public/private keys (keyed by effective time alone).
//!
//! Point-in-time retrieval models key rotation: a verifier presented with
//! a signature timestamped at T fetches the key that was effective at T,
//! not necessarily the most recently added key.
//!
//! The in-memory time indexes are consulted before any transaction opens
//! and mutated only after a successful commit, so readers never observe an
//! entry whose record is not committed.

use crate::domain::entities::{EffectiveTime, OwnKeyRecord, PeerPublicKeyRecord};
use crate::domain::errors::SecDbError;
use crate::domain::time_index::TimeIndex;
use crate::ports::outbound::{ElementId, KeyMaterialLoader, ListId, TransactionalStore};
use crate::service::{decode, encode, SecDb};

/// Which own-key store an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum OwnKeyKind {
    Public,
    Private,
}

impl OwnKeyKind {
    fn label(self) -> &'static str {
        match self {
            OwnKeyKind::Public => "own public",
            OwnKeyKind::Private => "own private",
        }
    }
}

impl<S: TransactionalStore, L: KeyMaterialLoader> SecDb<S, L> {
    // =========================================================================
    // Peer public keys
    // =========================================================================

    /// Record a peer node's public key effective from `effective_time`.
    pub fn add_peer_public_key(
        &mut self,
        node_nbr: u64,
        effective_time: EffectiveTime,
        assertion_time: EffectiveTime,
        bytes: &[u8],
    ) -> Result<(), SecDbError> {
        let slot = (node_nbr, effective_time);
        if self.peer_key_index.get_exact(&slot).is_some() {
            return Err(SecDbError::DuplicateKeySlot {
                node_nbr,
                effective_time,
            });
        }

        let record = PeerPublicKeyRecord {
            node_nbr,
            effective_time,
            assertion_time,
            bytes: bytes.to_vec(),
        };
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<ElementId, SecDbError> {
            let elt =
                self.store
                    .list_append(txn, self.catalog.peer_public_keys, &encode(&record)?)?;
            Ok(elt)
        })();
        let elt = self.finish(txn, outcome)?;
        self.peer_key_index.insert(slot, elt);

        tracing::debug!(
            "[dtnsec] peer key added: node {}, effective {}",
            node_nbr,
            effective_time
        );
        Ok(())
    }

    /// Remove the peer key at an exact `(node, effective_time)` slot.
    pub fn remove_peer_public_key(
        &mut self,
        node_nbr: u64,
        effective_time: EffectiveTime,
    ) -> Result<(), SecDbError> {
        let slot = (node_nbr, effective_time);
        let elt = self
            .peer_key_index
            .get_exact(&slot)
            .ok_or(SecDbError::AsymKeyNotFound {
                node_nbr,
                effective_time,
            })?;

        let txn = self.store.begin()?;
        let outcome = self.store.list_remove(txn, elt).map_err(SecDbError::from);
        self.finish(txn, outcome)?;
        self.peer_key_index.remove(&slot);

        tracing::debug!(
            "[dtnsec] peer key removed: node {}, effective {}",
            node_nbr,
            effective_time
        );
        Ok(())
    }

    /// Exact-slot fetch of a peer key's material.
    pub fn get_peer_public_key_exact(
        &self,
        node_nbr: u64,
        effective_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        match self.peer_key_index.get_exact(&(node_nbr, effective_time)) {
            Some(elt) => Ok(Some(self.read_peer_record(elt)?.bytes)),
            None => Ok(None),
        }
    }

    /// The peer key in effect for `node_nbr` at `query_time`.
    pub fn get_peer_public_key_as_of(
        &self,
        node_nbr: u64,
        query_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        let elt = self
            .peer_key_index
            .latest_in_range((node_nbr, EffectiveTime::ZERO), (node_nbr, query_time));
        match elt {
            Some(elt) => Ok(Some(self.read_peer_record(elt)?.bytes)),
            None => Ok(None),
        }
    }

    fn read_peer_record(&self, elt: ElementId) -> Result<PeerPublicKeyRecord, SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<PeerPublicKeyRecord, SecDbError> {
            let bytes = self.store.element_read(txn, elt)?;
            decode(&bytes)
        })();
        self.finish(txn, outcome)
    }

    // =========================================================================
    // Own public / private keys
    // =========================================================================

    /// Record the local node's public key effective from `effective_time`.
    pub fn add_own_public_key(
        &mut self,
        effective_time: EffectiveTime,
        bytes: &[u8],
    ) -> Result<(), SecDbError> {
        self.own_add(OwnKeyKind::Public, effective_time, bytes)
    }

    /// Remove the own public key at an exact effective time.
    pub fn remove_own_public_key(&mut self, effective_time: EffectiveTime) -> Result<(), SecDbError> {
        self.own_remove(OwnKeyKind::Public, effective_time)
    }

    /// Exact-slot fetch of the own public key.
    pub fn get_own_public_key_exact(
        &self,
        effective_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        self.own_get_exact(OwnKeyKind::Public, effective_time)
    }

    /// The own public key in effect at `query_time`.
    pub fn get_own_public_key_as_of(
        &self,
        query_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        self.own_get_as_of(OwnKeyKind::Public, query_time)
    }

    /// Record the local node's private key effective from `effective_time`.
    pub fn add_own_private_key(
        &mut self,
        effective_time: EffectiveTime,
        bytes: &[u8],
    ) -> Result<(), SecDbError> {
        self.own_add(OwnKeyKind::Private, effective_time, bytes)
    }

    /// Remove the own private key at an exact effective time.
    pub fn remove_own_private_key(
        &mut self,
        effective_time: EffectiveTime,
    ) -> Result<(), SecDbError> {
        self.own_remove(OwnKeyKind::Private, effective_time)
    }

    /// Exact-slot fetch of the own private key.
    pub fn get_own_private_key_exact(
        &self,
        effective_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        self.own_get_exact(OwnKeyKind::Private, effective_time)
    }

    /// The own private key in effect at `query_time`.
    pub fn get_own_private_key_as_of(
        &self,
        query_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        self.own_get_as_of(OwnKeyKind::Private, query_time)
    }

    fn own_list(&self, kind: OwnKeyKind) -> ListId {
        match kind {
            OwnKeyKind::Public => self.catalog.own_public_keys,
            OwnKeyKind::Private => self.catalog.own_private_keys,
        }
    }

    fn own_index(&self, kind: OwnKeyKind) -> &TimeIndex<EffectiveTime, ElementId> {
        match kind {
            OwnKeyKind::Public => &self.own_public_index,
            OwnKeyKind::Private => &self.own_private_index,
        }
    }

    fn own_index_mut(&mut self, kind: OwnKeyKind) -> &mut TimeIndex<EffectiveTime, ElementId> {
        match kind {
            OwnKeyKind::Public => &mut self.own_public_index,
            OwnKeyKind::Private => &mut self.own_private_index,
        }
    }

    fn own_add(
        &mut self,
        kind: OwnKeyKind,
        effective_time: EffectiveTime,
        bytes: &[u8],
    ) -> Result<(), SecDbError> {
        if self.own_index(kind).get_exact(&effective_time).is_some() {
            return Err(SecDbError::DuplicateOwnKeySlot { effective_time });
        }

        let record = OwnKeyRecord {
            effective_time,
            bytes: bytes.to_vec(),
        };
        let list = self.own_list(kind);
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<ElementId, SecDbError> {
            let elt = self.store.list_append(txn, list, &encode(&record)?)?;
            Ok(elt)
        })();
        let elt = self.finish(txn, outcome)?;
        self.own_index_mut(kind).insert(effective_time, elt);

        tracing::debug!(
            "[dtnsec] {} key added: effective {}",
            kind.label(),
            effective_time
        );
        Ok(())
    }

    fn own_remove(&mut self, kind: OwnKeyKind, effective_time: EffectiveTime) -> Result<(), SecDbError> {
        let elt = self
            .own_index(kind)
            .get_exact(&effective_time)
            .ok_or(SecDbError::OwnKeyNotFound { effective_time })?;

        let txn = self.store.begin()?;
        let outcome = self.store.list_remove(txn, elt).map_err(SecDbError::from);
        self.finish(txn, outcome)?;
        self.own_index_mut(kind).remove(&effective_time);

        tracing::debug!(
            "[dtnsec] {} key removed: effective {}",
            kind.label(),
            effective_time
        );
        Ok(())
    }

    fn own_get_exact(
        &self,
        kind: OwnKeyKind,
        effective_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        match self.own_index(kind).get_exact(&effective_time) {
            Some(elt) => Ok(Some(self.read_own_record(elt)?.bytes)),
            None => Ok(None),
        }
    }

    fn own_get_as_of(
        &self,
        kind: OwnKeyKind,
        query_time: EffectiveTime,
    ) -> Result<Option<Vec<u8>>, SecDbError> {
        let elt = self
            .own_index(kind)
            .latest_in_range(EffectiveTime::ZERO, query_time);
        match elt {
            Some(elt) => Ok(Some(self.read_own_record(elt)?.bytes)),
            None => Ok(None),
        }
    }

    fn read_own_record(&self, elt: ElementId) -> Result<OwnKeyRecord, SecDbError> {
        let txn = self.store.begin()?;
        let outcome = (|| -> Result<OwnKeyRecord, SecDbError> {
            let bytes = self.store.element_read(txn, elt)?;
            decode(&bytes)
        })();
        self.finish(txn, outcome)
    }
}
