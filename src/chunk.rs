//! # Chunks
//!
//! A [`Chunk`] is one stored piece of a file: a byte buffer with a read/write
//! head, the index of the piece within its file and the identifier of the
//! document it is saved to.
//!
//! ## Construction
//!
//! Chunks are created by the file that owns them, either empty (when new data
//! is about to be written) or from a document read back from the chunk
//! collection. Stored payloads may use any of several legacy encodings; they
//! are all normalized into one [`Binary`] when the chunk is built:
//! - raw bytes are used as they are
//! - text is encoded with one byte per character
//! - a list of text fragments is concatenated and encoded like text
//! - a [`Binary`] is moved in without copying
//!
//! Any other payload type fails with [`GridStoreError::InvalidChunkFormat`].
//!
//! ## Reading and writing
//!
//! Writes always append to the end of the buffer and leave the head there,
//! whatever the head position was before the write. Stored chunks written by
//! other tools rely on these append semantics, so a write never overwrites or
//! truncates bytes that are already in the buffer.
//!
//! [`Chunk::read`] accepts a request that exceeds the remaining bytes by one
//! while [`Chunk::read_slice`] does not. The two bounds differ on purpose and
//! must be kept as they are until the callers of `read` are audited; the
//! inclusive bound of `read` may be a latent defect. Neither method ever
//! moves the head past the end of the buffer.
//!
//! ## Persistence
//!
//! [`Chunk::save`] upserts the chunk document keyed by the chunk identifier,
//! so saving the same chunk twice replaces the stored document instead of
//! duplicating it. Empty chunks are never written.

use std::fmt;
use std::sync::Arc;

use crate::binary::Binary;
use crate::collection::ChunkOwner;
use crate::common::{decode_binary_text, encode_binary_text, GridStoreError, GridStoreResult};
use crate::document::{ChunkDocument, DataValue, StoredChunkDocument};
use crate::object_id::ObjectId;
use crate::write_concern::{WriteConcern, WriteOptions};

pub struct Chunk {
    id: ObjectId,
    files_id: ObjectId,
    n: u32,
    buffer: Binary,
    position: usize,
    write_concern: WriteConcern,
    owner: Arc<dyn ChunkOwner>,
}

impl Chunk {
    /// Creates a chunk owned by `owner`.
    ///
    /// # Arguments
    ///
    /// * `owner` - The file the chunk belongs to. It provides the file
    ///   identifier, the default write concern and, at save time, the chunk
    ///   collection.
    /// * `document` - The stored document to hydrate from, or `None` for a new
    ///   empty chunk with a fresh identifier and sequence number zero.
    ///
    /// # Returns
    ///
    /// Returns the chunk with its payload normalized into a [`Binary`].
    ///
    /// # Errors
    ///
    /// Returns `GridStoreError::InvalidChunkFormat` if the document's payload
    /// is neither bytes, text, text fragments nor a `Binary`.
    pub fn new(
        owner: Arc<dyn ChunkOwner>,
        document: Option<StoredChunkDocument>,
    ) -> GridStoreResult<Self> {
        let document = document.unwrap_or_default();
        let buffer = Self::decode_buffer(document.data)?;
        let id = document.id.unwrap_or_default();
        let n = document.n.unwrap_or(0);
        log::trace!("Hydrated chunk {id} (n = {n}, {} bytes)", buffer.len());
        Ok(Self {
            id,
            files_id: owner.files_id(),
            n,
            buffer,
            position: 0,
            write_concern: owner.write_concern(),
            owner,
        })
    }

    /// Replaces the durability policy inherited from the owner.
    pub fn with_write_concern(mut self, write_concern: WriteConcern) -> Self {
        self.write_concern = write_concern;
        self
    }

    fn decode_buffer(data: Option<DataValue>) -> GridStoreResult<Binary> {
        match data {
            None => Ok(Binary::new()),
            Some(DataValue::Bytes(bytes)) => Ok(Binary::from(bytes)),
            Some(DataValue::Text(text)) => Ok(Binary::from_binary_text(&text)),
            Some(DataValue::Fragments(fragments)) => {
                Ok(Binary::from_binary_text(&fragments.concat()))
            }
            Some(DataValue::Binary(binary)) => Ok(binary),
            Some(other) => Err(GridStoreError::InvalidChunkFormat(format!(
                "unsupported data type {}",
                other.type_name()
            ))),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn files_id(&self) -> ObjectId {
        self.files_id
    }

    /// Zero-based index of the chunk within its file.
    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn write_concern(&self) -> &WriteConcern {
        &self.write_concern
    }

    pub fn buffer(&self) -> &Binary {
        &self.buffer
    }

    /// Number of bytes in the chunk.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Current position of the read/write head.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the read/write head.
    ///
    /// The value is not checked against the buffer length. Reads from a head
    /// placed past the end return nothing.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Appends `data` to the buffer and moves the head to the new end.
    pub fn write(&mut self, data: &[u8]) -> &mut Self {
        self.buffer.append(data);
        self.position = self.buffer.len();
        self
    }

    /// Appends the one-byte-per-character encoding of `text`.
    pub fn write_str(&mut self, text: &str) -> &mut Self {
        self.write(&encode_binary_text(text))
    }

    /// Reads `length` bytes from the head as one-byte-per-character text.
    ///
    /// A `length` of zero requests the full buffer length. If the request does
    /// not fit (with one byte of slack, see the module documentation) the
    /// result is empty and the head does not move. Otherwise the bytes up to
    /// the end of the buffer are returned and the head advances past them.
    pub fn read(&mut self, length: usize) -> String {
        let available = self.buffer.len();
        let length = if length == 0 { available } else { length };
        if self.position > available || available - self.position + 1 < length {
            return String::new();
        }
        let bytes = self.buffer.read(self.position, length);
        self.position += bytes.len();
        decode_binary_text(bytes)
    }

    /// Reads exactly `length` bytes from the head without copying.
    ///
    /// Returns `None` when fewer than `length` bytes remain, leaving the head
    /// where it was. A request for zero bytes returns an empty slice.
    pub fn read_slice(&mut self, length: usize) -> Option<&[u8]> {
        let available = self.buffer.len();
        if self.position > available || available - self.position < length {
            return None;
        }
        let start = self.position;
        self.position += length;
        self.buffer.slice(start, start + length)
    }

    /// Reads a single character, or an empty string at the end of the chunk.
    pub fn getc(&mut self) -> String {
        self.read(1)
    }

    /// Whether the head sits exactly at the end of the buffer.
    pub fn eof(&self) -> bool {
        self.position == self.buffer.len()
    }

    /// Moves the head to the start and discards the buffer.
    ///
    /// Unsaved data is lost.
    pub fn rewind(&mut self) -> &mut Self {
        self.position = 0;
        self.buffer = Binary::new();
        self
    }

    /// Builds the document this chunk is stored as.
    pub fn to_document(&self) -> ChunkDocument {
        ChunkDocument {
            id: self.id,
            files_id: self.files_id,
            n: self.n,
            data: self.buffer.clone(),
        }
    }

    /// Upserts the chunk document into the owner's chunk collection.
    ///
    /// The chunk's write concern is merged over `options` and upserting is
    /// always enabled. An empty chunk is not written and the call succeeds
    /// without touching the collection.
    ///
    /// # Errors
    ///
    /// Errors from the owner or the collection are returned unchanged; the
    /// chunk itself is left as it was.
    pub fn save(&self, options: WriteOptions) -> GridStoreResult<()> {
        if self.buffer.is_empty() {
            let id = self.id;
            log::debug!("Skipping save of empty chunk {id}");
            return Ok(());
        }
        let collection = self.owner.chunk_collection()?;
        let options = options
            .merge_write_concern(&self.write_concern)
            .with_upsert(true);
        let (id, files_id, n) = (self.id, self.files_id, self.n);
        log::debug!(
            "Saving chunk {id} (file {files_id}, n = {n}, {} bytes) to {}",
            self.buffer.len(),
            collection.name()
        );
        collection.upsert(&self.id, &self.to_document(), &options)
    }

    /// Saves with default options and the chunk's write concern.
    pub fn save_default(&self) -> GridStoreResult<()> {
        self.save(WriteOptions::default())
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("id", &self.id)
            .field("files_id", &self.files_id)
            .field("n", &self.n)
            .field("buffer", &self.buffer)
            .field("position", &self.position)
            .field("write_concern", &self.write_concern)
            .finish()
    }
}
