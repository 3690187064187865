//! # Common Types and Utilities
//!
//! This module provides common types, error handling, and utility functions used
//! throughout the chunk store. It includes:
//! - Error handling infrastructure
//! - Store-wide constants for collection naming and chunk sizing
//! - The single-byte-per-character text codec used for chunk payloads

/// Number of bytes in a full chunk unless the store is configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 255;
/// Root collection name used when a file does not name its own namespace.
pub const DEFAULT_ROOT_COLLECTION: &str = "fs";
/// Suffix appended to the root collection to name the chunk collection.
pub const CHUNKS_COLLECTION_SUFFIX: &str = "chunks";
/// Suffix appended to the root collection to name the file collection.
pub const FILES_COLLECTION_SUFFIX: &str = "files";

pub type GridStoreResult<R> = Result<R, GridStoreError>;

/// Represents errors that can occur during chunk store operations
///
/// Foreign errors are carried as their debug representation so that the enum
/// stays `Clone` and comparable in tests.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GridStoreError {
    #[error("Invalid chunk format: {0}")]
    InvalidChunkFormat(String),
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),
    #[error("Chunk not found")]
    ChunkNotFound,
    #[error("IO error")]
    IO(String),
    #[error("Synchronization error")]
    Sync,
    #[error("Generic error")]
    Generic(String),
}

impl From<String> for GridStoreError {
    fn from(value: String) -> Self {
        GridStoreError::Generic(value)
    }
}

impl From<&str> for GridStoreError {
    fn from(value: &str) -> Self {
        GridStoreError::Generic(value.to_string())
    }
}

impl From<std::io::Error> for GridStoreError {
    fn from(e: std::io::Error) -> Self {
        GridStoreError::IO(format!("{:?}", e))
    }
}

impl From<rusqlite::Error> for GridStoreError {
    fn from(e: rusqlite::Error) -> Self {
        GridStoreError::PersistenceFailure(format!("{:?}", e))
    }
}

impl From<hex::FromHexError> for GridStoreError {
    fn from(e: hex::FromHexError) -> Self {
        GridStoreError::InvalidObjectId(format!("{:?}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for GridStoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        GridStoreError::Sync
    }
}

/// Encodes text using one byte per character
///
/// Each character contributes the low eight bits of its code point, so text
/// produced by [`decode_binary_text`] encodes back to the exact original bytes.
///
/// # Arguments
/// * `text` - The text to encode
///
/// # Returns
/// A vector with exactly one byte per character of `text`
pub fn encode_binary_text(text: &str) -> Vec<u8> {
    text.chars().map(|c| (c as u32 & 0xff) as u8).collect()
}

/// Decodes bytes into text using one character per byte
///
/// Every byte maps to the code point of the same value, which keeps payloads
/// that are not valid UTF-8 intact.
///
/// # Arguments
/// * `bytes` - The raw bytes to decode
///
/// # Returns
/// A String with exactly one character per input byte
pub fn decode_binary_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Joins a root collection name and a suffix into a collection name
///
/// # Arguments
/// * `root` - The namespace of the owning file, e.g. `fs`
/// * `suffix` - The collection suffix, e.g. `chunks`
///
/// # Returns
/// The dotted collection name, e.g. `fs.chunks`
pub fn compose_collection_name(root: &str, suffix: &str) -> String {
    format!("{}.{}", root, suffix)
}
