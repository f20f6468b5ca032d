//! Flat key-value blob storage.
//!
//! The blob store is the storage medium behind the `Blob*Repository`
//! adapters: one string value per key, no indexes, no partial updates.

mod blob_store;
mod file_blob_store;

pub use blob_store::{BlobStore, MemoryBlobStore};
pub use file_blob_store::FileBlobStore;
