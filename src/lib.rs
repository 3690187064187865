//! # gridstore
//!
//! Storage unit of a chunked large-object store. Large payloads are split into
//! fixed-size chunks, each persisted as its own `{_id, files_id, n, data}`
//! document. This crate provides the [`chunk::Chunk`] type together with the
//! pieces it is built on and the collections it is persisted to.

pub mod binary;
pub mod chunk;
pub mod collection;
pub mod common;
pub mod config;
pub mod database_object;
pub mod document;
pub mod object_id;
pub mod write_concern;

pub use binary::Binary;
pub use chunk::Chunk;
pub use collection::{ChunkCollection, ChunkOwner, MemoryCollection};
pub use common::{GridStoreError, GridStoreResult, DEFAULT_CHUNK_SIZE};
pub use config::StoreConfig;
pub use database_object::SqliteCollection;
pub use document::{ChunkDocument, DataValue, StoredChunkDocument};
pub use object_id::ObjectId;
pub use write_concern::{Acknowledgment, WriteConcern, WriteOptions};
