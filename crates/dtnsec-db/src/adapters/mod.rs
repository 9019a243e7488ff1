//! # Adapters Layer
//!
//! Implementations of the outbound ports: an in-memory transactional store
//! for tests and tooling, a durable file-backed store, and the filesystem
//! key-material loader.

mod image;

pub mod file;
pub mod loader;
pub mod memory;

pub use file::FileTxnStore;
pub use loader::FsKeyMaterialLoader;
pub use memory::InMemoryTxnStore;
