//! Size-bounded partitioning of a key span into compaction ranges.
//!
//! Forcing compaction over a wide span as a single job gives the engine an
//! unbounded unit of work. [`batch_for_compaction`] walks the tables covering
//! the span in key order and cuts a new range every time the accumulated
//! table size reaches the target, so each range can be compacted (and
//! retried) independently.
//!
//! Ranges tile the requested span exactly: the first range starts at the
//! span start, each range's limit is the next range's start, and the last
//! range ends at the span end. An empty bound means the span is open on that
//! side.

use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::ondisk::sstable::FileDescriptor;

/// One unit of compaction work: the half-open key range `[start, limit)`.
///
/// An empty `start` or `limit` leaves that side unbounded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompactionRange {
    start: Bytes,
    limit: Bytes,
}

impl CompactionRange {
    /// Build a range from its bounds.
    pub fn new(start: impl Into<Bytes>, limit: impl Into<Bytes>) -> Self {
        Self {
            start: start.into(),
            limit: limit.into(),
        }
    }

    /// A range covering the whole key space.
    pub fn unbounded() -> Self {
        Self::new(Bytes::new(), Bytes::new())
    }

    /// Inclusive lower bound; empty when unbounded.
    pub fn start(&self) -> &Bytes {
        &self.start
    }

    /// Exclusive upper bound; empty when unbounded.
    pub fn limit(&self) -> &Bytes {
        &self.limit
    }

    /// Whether `key` falls inside `[start, limit)`.
    pub fn contains(&self, key: &[u8]) -> bool {
        (self.start.is_empty() || key >= self.start.as_ref())
            && (self.limit.is_empty() || key < self.limit.as_ref())
    }

}

impl fmt::Display for CompactionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.escape_ascii(),
            self.limit.escape_ascii()
        )
    }
}

/// Input tables violated the ordering contract of [`batch_for_compaction`].
///
/// These are caller bugs: the input must come from a single level, sorted by
/// smallest key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// A table's smallest key sorts after its largest key.
    #[error("table {index} has smallest key after its largest key")]
    InvertedBounds {
        /// Position of the offending table in the input.
        index: usize,
    },
    /// A table starts before its predecessor.
    #[error("table {index} is not sorted by smallest key")]
    Unsorted {
        /// Position of the offending table in the input.
        index: usize,
    },
    /// A table shares more than a boundary key with its predecessor.
    #[error("table {index} overlaps the preceding table")]
    Overlapping {
        /// Position of the offending table in the input.
        index: usize,
    },
    /// Accumulated table sizes no longer fit in a `u64`.
    #[error("accumulated table size overflows u64 at table {index}")]
    SizeOverflow {
        /// Position of the table whose size overflowed the accumulator.
        index: usize,
    },
}

/// Partition `[start, end)` into ranges of roughly `target_size` bytes.
///
/// `files` are the tables of one level intersecting the span, sorted
/// ascending by smallest key and non-overlapping (neighbours may share a
/// boundary key). Sizes accumulate in a `u64`; a new range begins after a
/// table once the running total reaches `target_size`, and the boundary is
/// that table's largest key. The last table never closes a range on its own,
/// so the final range always ends at `end`.
///
/// Always returns at least one range. With no tables the result is the single
/// range `[start, end)`. A `target_size` of zero cuts after every table but
/// the last.
///
/// # Errors
///
/// Returns [`BatchError`] when the tables are unsorted, overlapping, have
/// inverted bounds, or their sizes overflow the accumulator. No ranges are
/// produced in that case.
pub fn batch_for_compaction(
    files: &[FileDescriptor],
    start: Bytes,
    end: Bytes,
    target_size: u64,
) -> Result<Vec<CompactionRange>, BatchError> {
    let last = files.len().saturating_sub(1);
    let mut ranges = Vec::new();
    let mut range_start = start;
    let mut cumulative = 0u64;

    for (index, file) in files.iter().enumerate() {
        check_order(files, index)?;
        cumulative = cumulative
            .checked_add(file.size_bytes())
            .ok_or(BatchError::SizeOverflow { index })?;
        if index < last && cumulative >= target_size {
            let limit = file.largest_key().clone();
            let start = std::mem::replace(&mut range_start, limit.clone());
            ranges.push(CompactionRange { start, limit });
            cumulative = 0;
        }
    }

    ranges.push(CompactionRange {
        start: range_start,
        limit: end,
    });
    Ok(ranges)
}

fn check_order(files: &[FileDescriptor], index: usize) -> Result<(), BatchError> {
    let file = &files[index];
    if !file.has_ordered_bounds() {
        return Err(BatchError::InvertedBounds { index });
    }
    let Some(prev) = index.checked_sub(1).map(|i| &files[i]) else {
        return Ok(());
    };
    if file.smallest_key() < prev.smallest_key() {
        return Err(BatchError::Unsorted { index });
    }
    if prev.overlaps(file) {
        return Err(BatchError::Overlapping { index });
    }
    Ok(())
}
