//! # Store Configuration
//!
//! Settings shared by the files of one store. The chunk size lives here rather
//! than in a process-wide constant so that each store, and every file handle
//! created from it, splits payloads at the boundary it was configured with.

use crate::common::{
    compose_collection_name, DEFAULT_CHUNK_SIZE, DEFAULT_ROOT_COLLECTION,
    CHUNKS_COLLECTION_SUFFIX, FILES_COLLECTION_SUFFIX,
};
use crate::write_concern::WriteConcern;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Namespace of the store's collections.
    pub root_collection: String,
    /// Size in bytes at which file handles start a new chunk.
    pub chunk_size: usize,
    /// Durability policy given to every chunk of the store.
    pub write_concern: WriteConcern,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_collection: DEFAULT_ROOT_COLLECTION.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            write_concern: WriteConcern::default(),
        }
    }
}

impl StoreConfig {
    pub fn with_root_collection(mut self, root_collection: &str) -> Self {
        self.root_collection = root_collection.to_string();
        self
    }

    /// Sets the chunk size. A size of zero falls back to the default.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        self
    }

    pub fn with_write_concern(mut self, write_concern: WriteConcern) -> Self {
        self.write_concern = write_concern;
        self
    }

    pub fn chunk_collection_name(&self) -> String {
        compose_collection_name(&self.root_collection, CHUNKS_COLLECTION_SUFFIX)
    }

    pub fn files_collection_name(&self) -> String {
        compose_collection_name(&self.root_collection, FILES_COLLECTION_SUFFIX)
    }

    /// Number of chunks needed to hold `length` bytes.
    pub fn chunk_count(&self, length: u64) -> u64 {
        length.div_ceil(self.chunk_size as u64)
    }
}
