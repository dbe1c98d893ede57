//! SSTable metadata as seen by compaction planning.
//!
//! Compaction never opens table payloads; it only needs the key bounds and
//! on-disk size of each run, captured here as a [`FileDescriptor`].

use std::fmt;

use bytes::Bytes;
use ulid::Ulid;

/// Identifier for an SSTable registered with the engine catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SsTableId(Ulid);

impl SsTableId {
    /// Sorts before every generated identifier.
    pub(crate) const MIN: SsTableId = SsTableId(Ulid(0));

    /// Allocate a fresh, time-ordered identifier.
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for SsTableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Key bounds and size of one on-disk sorted run.
///
/// Both bounds are inclusive and compared as raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDescriptor {
    smallest_key: Bytes,
    largest_key: Bytes,
    size_bytes: u64,
}

impl FileDescriptor {
    /// Describe a table covering `[smallest_key, largest_key]`.
    pub fn new(
        smallest_key: impl Into<Bytes>,
        largest_key: impl Into<Bytes>,
        size_bytes: u64,
    ) -> Self {
        Self {
            smallest_key: smallest_key.into(),
            largest_key: largest_key.into(),
            size_bytes,
        }
    }

    /// Inclusive lower key bound.
    pub fn smallest_key(&self) -> &Bytes {
        &self.smallest_key
    }

    /// Inclusive upper key bound.
    pub fn largest_key(&self) -> &Bytes {
        &self.largest_key
    }

    /// On-disk size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Whether the key bounds are well formed.
    pub fn has_ordered_bounds(&self) -> bool {
        self.smallest_key <= self.largest_key
    }

    /// Whether this table holds keys inside the half-open span `[start, end)`.
    ///
    /// Empty `start` or `end` leaves that side of the span open.
    pub fn intersects(&self, start: &[u8], end: &[u8]) -> bool {
        let below_end = end.is_empty() || self.smallest_key.as_ref() < end;
        let above_start = start.is_empty() || self.largest_key.as_ref() >= start;
        below_end && above_start
    }

    /// Whether the two tables share any key. Touching bounds do not count.
    pub(crate) fn overlaps(&self, other: &FileDescriptor) -> bool {
        (self.smallest_key < other.largest_key && other.smallest_key < self.largest_key)
            || self.smallest_key == other.smallest_key
    }
}

/// A catalogued table: identity, level and descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SsTableEntry {
    id: SsTableId,
    level: usize,
    descriptor: FileDescriptor,
}

impl SsTableEntry {
    pub(crate) fn new(id: SsTableId, level: usize, descriptor: FileDescriptor) -> Self {
        Self {
            id,
            level,
            descriptor,
        }
    }

    /// Identifier of the table.
    pub fn id(&self) -> SsTableId {
        self.id
    }

    /// Level that currently owns the table.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Key bounds and size.
    pub fn descriptor(&self) -> &FileDescriptor {
        &self.descriptor
    }
}
