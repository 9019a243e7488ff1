//! # Key-Material Loader
//!
//! Filesystem implementation of the `KeyMaterialLoader` port.

use std::path::Path;

use crate::ports::outbound::{KeyMaterialLoader, LoadError};

/// Loads key material with `std::fs`. Reads complete before any
/// transaction opens, so a missing or unreadable file costs nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsKeyMaterialLoader;

impl KeyMaterialLoader for FsKeyMaterialLoader {
    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>, LoadError> {
        std::fs::read(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
