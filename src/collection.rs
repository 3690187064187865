//! # Chunk Collections
//!
//! A chunk never talks to the backing store directly. It receives a
//! [`ChunkCollection`] from the file that owns it (its [`ChunkOwner`]) and
//! persists itself with a single upsert keyed by its own identifier.
//!
//! [`MemoryCollection`] keeps chunk documents in process memory; the SQLite
//! backed implementation lives in [`crate::database_object`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::common::{
    compose_collection_name, GridStoreError, GridStoreResult, CHUNKS_COLLECTION_SUFFIX,
};
use crate::document::{ChunkDocument, StoredChunkDocument};
use crate::object_id::ObjectId;
use crate::write_concern::{WriteConcern, WriteOptions};

/// Storage accessor for the documents of one chunk collection
pub trait ChunkCollection: Send + Sync {
    /// Name of the collection, e.g. `fs.chunks`.
    fn name(&self) -> &str;

    /// Replaces the document keyed by `id` with `document`.
    ///
    /// When no such document exists it is inserted if `options.upsert` is set,
    /// otherwise the call does nothing. A file holds at most one chunk per
    /// sequence number: a document whose `(files_id, n)` is already taken by
    /// another identifier fails with `GridStoreError::PersistenceFailure`.
    fn upsert(
        &self,
        id: &ObjectId,
        document: &ChunkDocument,
        options: &WriteOptions,
    ) -> GridStoreResult<()>;

    /// Looks up a chunk document by its identifier.
    fn find_one(&self, id: &ObjectId) -> GridStoreResult<Option<StoredChunkDocument>>;

    /// Looks up the `n`-th chunk of the file `files_id`.
    fn find_chunk(&self, files_id: &ObjectId, n: u32)
        -> GridStoreResult<Option<StoredChunkDocument>>;

    /// Deletes every chunk of the file `files_id`, returning how many were removed.
    fn remove_file_chunks(&self, files_id: &ObjectId) -> GridStoreResult<usize>;
}

/// The file side of a chunk: who owns it and where it is stored
pub trait ChunkOwner: Send + Sync {
    fn files_id(&self) -> ObjectId;

    /// Yields the collection the owner's chunks are written to.
    fn chunk_collection(&self) -> GridStoreResult<Arc<dyn ChunkCollection>>;

    /// Durability policy for chunks created by this owner.
    fn write_concern(&self) -> WriteConcern {
        WriteConcern::default()
    }
}

/// Chunk collection held in process memory
#[derive(Debug)]
pub struct MemoryCollection {
    name: String,
    documents: Mutex<BTreeMap<ObjectId, ChunkDocument>>,
}

impl MemoryCollection {
    /// Creates the chunk collection of the `root` namespace, e.g. `fs.chunks` for `fs`.
    pub fn new(root: &str) -> Self {
        Self {
            name: compose_collection_name(root, CHUNKS_COLLECTION_SUFFIX),
            documents: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> GridStoreResult<usize> {
        Ok(self.documents.lock()?.len())
    }

    pub fn is_empty(&self) -> GridStoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl ChunkCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn upsert(
        &self,
        id: &ObjectId,
        document: &ChunkDocument,
        options: &WriteOptions,
    ) -> GridStoreResult<()> {
        let mut documents = self.documents.lock()?;
        if !options.upsert && !documents.contains_key(id) {
            return Ok(());
        }
        let taken = documents.iter().any(|(other, stored)| {
            other != id && stored.files_id == document.files_id && stored.n == document.n
        });
        if taken {
            return Err(GridStoreError::PersistenceFailure(format!(
                "duplicate chunk {} of file {} in {}",
                document.n, document.files_id, self.name
            )));
        }
        log::trace!("Storing chunk {id} in {}", self.name);
        documents.insert(*id, document.clone());
        Ok(())
    }

    fn find_one(&self, id: &ObjectId) -> GridStoreResult<Option<StoredChunkDocument>> {
        let documents = self.documents.lock()?;
        Ok(documents.get(id).cloned().map(StoredChunkDocument::from))
    }

    fn find_chunk(
        &self,
        files_id: &ObjectId,
        n: u32,
    ) -> GridStoreResult<Option<StoredChunkDocument>> {
        let documents = self.documents.lock()?;
        Ok(documents
            .values()
            .find(|document| document.files_id == *files_id && document.n == n)
            .cloned()
            .map(StoredChunkDocument::from))
    }

    fn remove_file_chunks(&self, files_id: &ObjectId) -> GridStoreResult<usize> {
        let mut documents = self.documents.lock()?;
        let before = documents.len();
        documents.retain(|_, document| document.files_id != *files_id);
        Ok(before - documents.len())
    }
}
