//! # Chunk Documents
//!
//! The backing store keeps one document per chunk:
//!
//! ```text
//! { _id: <chunk id>, files_id: <file id>, n: <sequence number>, data: <payload> }
//! ```
//!
//! [`ChunkDocument`] is the canonical shape this crate writes. Documents read
//! back from storage are represented by [`StoredChunkDocument`], whose `data`
//! field may hold any of the encodings older writers produced.

use crate::binary::Binary;
use crate::object_id::ObjectId;

/// Payload of a stored chunk document, in whichever encoding it was written
#[derive(Clone, Debug, PartialEq)]
pub enum DataValue {
    /// Raw byte sequence.
    Bytes(Vec<u8>),
    /// Text holding one byte per character.
    Text(String),
    /// Text split into fragments that concatenate to the payload.
    Fragments(Vec<String>),
    /// Already canonical binary wrapper.
    Binary(Binary),
    Integer(i64),
    Double(f64),
    Boolean(bool),
}

impl DataValue {
    /// Name of the encoding, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Bytes(_) => "bytes",
            DataValue::Text(_) => "text",
            DataValue::Fragments(_) => "fragments",
            DataValue::Binary(_) => "binary",
            DataValue::Integer(_) => "integer",
            DataValue::Double(_) => "double",
            DataValue::Boolean(_) => "boolean",
        }
    }
}

/// Canonical chunk document as written to the chunk collection
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkDocument {
    pub id: ObjectId,
    pub files_id: ObjectId,
    pub n: u32,
    pub data: Binary,
}

/// Chunk document as read from the chunk collection
///
/// Every field may be missing from a stored document; hydration fills the
/// gaps with a fresh identifier, sequence number zero and an empty payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoredChunkDocument {
    pub id: Option<ObjectId>,
    pub files_id: Option<ObjectId>,
    pub n: Option<u32>,
    pub data: Option<DataValue>,
}

impl StoredChunkDocument {
    /// Creates a stored document carrying only a payload.
    pub fn with_data(data: DataValue) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }

    /// Creates the shell of a new chunk at position `n` of its file.
    pub fn with_sequence_number(n: u32) -> Self {
        Self {
            n: Some(n),
            ..Default::default()
        }
    }
}

impl From<ChunkDocument> for StoredChunkDocument {
    fn from(document: ChunkDocument) -> Self {
        Self {
            id: Some(document.id),
            files_id: Some(document.files_id),
            n: Some(document.n),
            data: Some(DataValue::Binary(document.data)),
        }
    }
}
