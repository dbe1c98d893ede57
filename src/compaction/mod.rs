//! Forced compaction over a key span.
//!
//! A span is split into size-bounded ranges by the batcher and the driver
//! hands those ranges to a [`RangeCompactor`] one (or several) at a time.

/// Size-bounded key-span partitioning.
pub mod batcher;
/// Driver issuing range compactions against an executor.
pub mod driver;

use std::error::Error as StdError;

pub use batcher::{batch_for_compaction, BatchError, CompactionRange};
pub use driver::{CompactionDriver, CompactionOptions, CompactionPlan, RangeCompactor};
use thiserror::Error;

use crate::ondisk::sstable::FileDescriptor;

/// Boxed error returned by [`RangeCompactor`] implementations.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Source of table metadata for a key span.
///
/// Implementations return the tables of a single level that intersect
/// `[start, end)`, sorted ascending by smallest key and non-overlapping.
/// Empty bounds leave that side of the span open.
pub trait FileMetadataProvider {
    /// Snapshot the tables intersecting `[start, end)`.
    fn files_in_span(&self, start: &[u8], end: &[u8]) -> Vec<FileDescriptor>;
}

impl FileMetadataProvider for [FileDescriptor] {
    fn files_in_span(&self, start: &[u8], end: &[u8]) -> Vec<FileDescriptor> {
        self.iter()
            .filter(|file| file.intersects(start, end))
            .cloned()
            .collect()
    }
}

impl FileMetadataProvider for Vec<FileDescriptor> {
    fn files_in_span(&self, start: &[u8], end: &[u8]) -> Vec<FileDescriptor> {
        self.as_slice().files_in_span(start, end)
    }
}

/// Errors raised while planning or driving a span compaction.
#[derive(Debug, Error)]
pub enum CompactionError {
    #[error("compaction batching error: {0}")]
    Batch(#[from] BatchError),
    #[error("range compaction failed for {range}: {source}")]
    Range {
        range: CompactionRange,
        #[source]
        source: BoxError,
    },
    #[error("invalid compaction options: {0}")]
    InvalidOptions(&'static str),
}
