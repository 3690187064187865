//! # Canonical Binary Buffer
//!
//! Every payload accepted by a chunk, whatever its stored encoding, ends up in a
//! [`Binary`]. The type is a thin growable byte buffer exposing the handful of
//! capabilities the chunk needs: length query, offset read, offset write and
//! borrowed sub-slices.

use std::fmt;

use crate::common::{decode_binary_text, encode_binary_text};

/// Growable byte buffer used as the single in-memory chunk payload representation
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Binary {
    buffer: Vec<u8>,
}

impl Binary {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Creates an empty buffer able to hold `capacity` bytes without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Creates a buffer holding the single-byte encoding of `text`.
    ///
    /// The buffer is sized to the character count of `text` before writing.
    pub fn from_binary_text(text: &str) -> Self {
        let mut binary = Self::with_capacity(text.chars().count());
        binary.write(&encode_binary_text(text), 0);
        binary
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Writes `data` at `offset`, growing the buffer as needed.
    ///
    /// Bytes already present in `offset..offset + data.len()` are overwritten and
    /// any gap between the current end and `offset` is zero filled.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes to write.
    /// * `offset` - Where in the buffer the first byte lands.
    ///
    /// # Returns
    ///
    /// The offset just past the last written byte.
    pub fn write(&mut self, data: &[u8], offset: usize) -> usize {
        let end = offset + data.len();
        if end > self.buffer.len() {
            self.buffer.resize(end, 0);
        }
        self.buffer[offset..end].copy_from_slice(data);
        end
    }

    /// Appends `data` to the end of the buffer.
    pub fn append(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Reads up to `length` bytes starting at `offset`.
    ///
    /// The result is clamped to the end of the buffer; an offset past the end
    /// yields an empty slice.
    pub fn read(&self, offset: usize, length: usize) -> &[u8] {
        let start = offset.min(self.buffer.len());
        let end = offset.saturating_add(length).min(self.buffer.len());
        &self.buffer[start..end]
    }

    /// Returns the exact sub-slice `start..end`, or `None` if it is out of range.
    pub fn slice(&self, start: usize, end: usize) -> Option<&[u8]> {
        self.buffer.get(start..end)
    }

    /// Returns the whole buffer decoded with one character per byte.
    pub fn to_binary_text(&self) -> String {
        decode_binary_text(&self.buffer)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl From<Vec<u8>> for Binary {
    fn from(buffer: Vec<u8>) -> Self {
        Self { buffer }
    }
}

impl From<&[u8]> for Binary {
    fn from(bytes: &[u8]) -> Self {
        Self {
            buffer: bytes.to_vec(),
        }
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        &self.buffer
    }
}

impl fmt::Debug for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binary")
            .field("len", &self.buffer.len())
            .finish()
    }
}
