//! # File-Backed Transactional Store
//!
//! Durable `TransactionalStore` adapter: the committed image is persisted
//! on every commit by writing a temp file and renaming it into place, and
//! an `fs2` exclusive lock on the data directory keeps a second process
//! from opening the same database.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use fs2::FileExt;

use crate::adapters::image::{StoreImage, TxnState};
use crate::ports::outbound::{ElementId, ListId, StoreError, TransactionalStore, TxnToken};

const IMAGE_FILE: &str = "secdb.img";
const LOCK_FILE: &str = "LOCK";

/// Exclusive lock on the data directory, released on drop.
#[derive(Debug)]
struct DirLock {
    // Kept open for the lifetime of the store to hold the flock.
    _file: File,
}

impl DirLock {
    fn acquire(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join(LOCK_FILE);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::Io {
                message: format!("cannot create lock file {}: {}", path.display(), e),
            })?;

        file.try_lock_exclusive().map_err(|_| StoreError::Io {
            message: format!(
                "data directory already in use by another process ({})",
                path.display()
            ),
        })?;

        let _ = writeln!(file, "{}", std::process::id());
        Ok(Self { _file: file })
    }
}

/// File-backed transactional store.
#[derive(Debug)]
pub struct FileTxnStore {
    inner: Mutex<TxnState>,
    image_path: PathBuf,
    _lock: DirLock,
}

impl FileTxnStore {
    /// Open (or create) the store rooted at `data_dir`.
    ///
    /// # Errors
    /// * `StoreError::Io` - directory unusable, already locked, or the
    ///   persisted image is unreadable
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir).map_err(|e| StoreError::Io {
            message: format!("cannot create {}: {}", data_dir.display(), e),
        })?;

        let lock = DirLock::acquire(data_dir)?;
        let image_path = data_dir.join(IMAGE_FILE);
        let image = Self::load_image(&image_path)?;

        Ok(Self {
            inner: Mutex::new(TxnState::with_image(image)),
            image_path,
            _lock: lock,
        })
    }

    fn load_image(path: &Path) -> Result<StoreImage, StoreError> {
        if !path.exists() {
            return Ok(StoreImage::default());
        }
        let bytes = std::fs::read(path).map_err(|e| StoreError::Io {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        bincode::deserialize(&bytes).map_err(|e| StoreError::Io {
            message: format!("corrupt store image {}: {}", path.display(), e),
        })
    }

    /// Persist an image atomically: write a temp file, sync, rename.
    fn persist_image(&self, image: &StoreImage) -> Result<(), StoreError> {
        let bytes = bincode::serialize(image).map_err(|e| StoreError::CommitFailed {
            message: format!("cannot encode store image: {}", e),
        })?;

        let temp_path = self.image_path.with_extension("tmp");
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            std::fs::rename(&temp_path, &self.image_path)
        };
        write().map_err(|e| StoreError::CommitFailed {
            message: format!("cannot persist {}: {}", self.image_path.display(), e),
        })
    }

    fn lock(&self) -> MutexGuard<'_, TxnState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TransactionalStore for FileTxnStore {
    fn begin(&self) -> Result<TxnToken, StoreError> {
        Ok(self.lock().begin())
    }

    fn commit(&self, txn: TxnToken) -> Result<(), StoreError> {
        let mut state = self.lock();
        let image = state.commit(txn)?;
        // Durability before visibility: if the image cannot be persisted
        // the commit fails and the staged writes are already discarded.
        self.persist_image(&image)?;
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
