//! # Object Identifiers
//!
//! Chunks and files are keyed by 12-byte identifiers laid out the way document
//! stores lay them out:
//! - 4 bytes: seconds since the Unix epoch, big-endian
//! - 5 bytes: random value fixed for the lifetime of the process
//! - 3 bytes: counter, big-endian, starting at a random value
//!
//! Identifiers generated by one process are therefore unique and roughly
//! ordered by creation time.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::Utc;
use rand::Rng;

use crate::common::{GridStoreError, GridStoreResult};

const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// 12-byte identifier of a stored document
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        let timestamp = Utc::now().timestamp() as u32;
        let process_unique = PROCESS_UNIQUE.get_or_init(|| {
            let mut bytes = [0u8; 5];
            rand::rng().fill(&mut bytes);
            bytes
        });
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::rng().random::<u32>() & COUNTER_MASK))
            .fetch_add(1, Ordering::Relaxed)
            & COUNTER_MASK;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Parses the 24 character hexadecimal form.
    pub fn parse_str(value: &str) -> GridStoreResult<Self> {
        let decoded = hex::decode(value)?;
        let bytes: [u8; 12] = decoded
            .try_into()
            .map_err(|_| GridStoreError::InvalidObjectId(value.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Seconds since the Unix epoch at which the identifier was generated.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = GridStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}
