#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use gridstore::{
    ChunkCollection, ChunkDocument, ChunkOwner, GridStoreError, GridStoreResult, MemoryCollection,
    ObjectId, StoredChunkDocument, WriteConcern, WriteOptions,
};

pub fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Minimal file handle owning chunks stored in `collection`.
pub struct TestFile {
    pub files_id: ObjectId,
    pub collection: Arc<dyn ChunkCollection>,
    pub write_concern: WriteConcern,
}

impl TestFile {
    pub fn new(collection: Arc<dyn ChunkCollection>) -> Arc<Self> {
        Arc::new(Self {
            files_id: ObjectId::new(),
            collection,
            write_concern: WriteConcern::default(),
        })
    }

    pub fn in_memory() -> Arc<Self> {
        Self::new(Arc::new(MemoryCollection::new("fs")))
    }
}

impl ChunkOwner for TestFile {
    fn files_id(&self) -> ObjectId {
        self.files_id
    }

    fn chunk_collection(&self) -> GridStoreResult<Arc<dyn ChunkCollection>> {
        Ok(self.collection.clone())
    }

    fn write_concern(&self) -> WriteConcern {
        self.write_concern.clone()
    }
}

/// Collection remembering every upsert it receives, optionally failing them.
#[derive(Default)]
pub struct RecordingCollection {
    pub upserts: Mutex<Vec<(ObjectId, ChunkDocument, WriteOptions)>>,
    pub failure: Option<GridStoreError>,
}

impl RecordingCollection {
    pub fn failing(error: GridStoreError) -> Self {
        Self {
            upserts: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    pub fn upsert_count(&self) -> usize {
        self.upserts.lock().map(|upserts| upserts.len()).unwrap_or(0)
    }
}

impl ChunkCollection for RecordingCollection {
    fn name(&self) -> &str {
        "fs.chunks"
    }

    fn upsert(
        &self,
        id: &ObjectId,
        document: &ChunkDocument,
        options: &WriteOptions,
    ) -> GridStoreResult<()> {
        self.upserts.lock()?.push((*id, document.clone(), options.clone()));
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn find_one(&self, _id: &ObjectId) -> GridStoreResult<Option<StoredChunkDocument>> {
        Ok(None)
    }

    fn find_chunk(
        &self,
        _files_id: &ObjectId,
        _n: u32,
    ) -> GridStoreResult<Option<StoredChunkDocument>> {
        Ok(None)
    }

    fn remove_file_chunks(&self, _files_id: &ObjectId) -> GridStoreResult<usize> {
        Ok(0)
    }
}
