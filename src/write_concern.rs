//! # Write Durability
//!
//! A [`WriteConcern`] states how much acknowledgment the backing store must give
//! before a chunk write counts as complete. Callers of [`crate::chunk::Chunk::save`]
//! pass [`WriteOptions`]; the chunk merges its own write concern on top of them,
//! and on any overlapping key the write concern wins.

use std::time::Duration;

/// Acknowledgment level requested from the backing store
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Acknowledgment {
    /// Acknowledged by this many nodes. Zero means fire and forget.
    Nodes(u32),
    /// Acknowledged by a majority of the nodes.
    Majority,
    /// Acknowledged by the nodes matching a custom tag set.
    Tag(String),
}

/// Durability policy applied when a chunk is persisted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteConcern {
    pub w: Acknowledgment,
    pub journal: Option<bool>,
    pub fsync: Option<bool>,
    pub wtimeout: Option<Duration>,
}

impl Default for WriteConcern {
    fn default() -> Self {
        Self {
            w: Acknowledgment::Nodes(1),
            journal: None,
            fsync: None,
            wtimeout: None,
        }
    }
}

impl WriteConcern {
    pub fn unacknowledged() -> Self {
        Self {
            w: Acknowledgment::Nodes(0),
            ..Default::default()
        }
    }

    pub fn majority() -> Self {
        Self {
            w: Acknowledgment::Majority,
            ..Default::default()
        }
    }

    pub fn with_journal(mut self, journal: bool) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = Some(fsync);
        self
    }

    pub fn with_wtimeout(mut self, wtimeout: Duration) -> Self {
        self.wtimeout = Some(wtimeout);
        self
    }

    pub fn is_acknowledged(&self) -> bool {
        self.w != Acknowledgment::Nodes(0) || self.journal == Some(true) || self.fsync == Some(true)
    }
}

/// Options accompanying a single write against the chunk collection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub upsert: bool,
    pub w: Option<Acknowledgment>,
    pub journal: Option<bool>,
    pub fsync: Option<bool>,
    pub wtimeout: Option<Duration>,
}

impl WriteOptions {
    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    /// Overlays `concern` on these options.
    ///
    /// Every key the write concern defines replaces the caller's value; keys it
    /// leaves unset keep whatever the caller supplied.
    pub fn merge_write_concern(mut self, concern: &WriteConcern) -> Self {
        self.w = Some(concern.w.clone());
        if concern.journal.is_some() {
            self.journal = concern.journal;
        }
        if concern.fsync.is_some() {
            self.fsync = concern.fsync;
        }
        if concern.wtimeout.is_some() {
            self.wtimeout = concern.wtimeout;
        }
        self
    }

    /// Whether the write must reach stable storage before it is acknowledged.
    pub fn requires_sync(&self) -> bool {
        self.journal == Some(true) || self.fsync == Some(true)
    }
}
