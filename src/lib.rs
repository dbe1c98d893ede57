//! Size-bounded forced compaction over key spans.
//!
//! Forcing compaction over a wide key span as one job gives the storage
//! engine an unbounded unit of work. This crate splits the span into ranges
//! of roughly a target byte size using the SSTables that cover it, then
//! drives compaction of those ranges one (or several) at a time.
//!
//! ```no_run
//! use bytes::Bytes;
//! use keyspan_compaction::{batch_for_compaction, FileDescriptor};
//!
//! let files = [
//!     FileDescriptor::new("a", "b", 10),
//!     FileDescriptor::new("b", "c", 10),
//!     FileDescriptor::new("c", "d", 10),
//! ];
//! let ranges = batch_for_compaction(&files, Bytes::from("a"), Bytes::from("d"), 20)?;
//! assert_eq!(ranges.len(), 2);
//! # Ok::<(), keyspan_compaction::compaction::BatchError>(())
//! ```

/// Span partitioning and the compaction driver.
pub mod compaction;

/// Engine handle, options and table catalog.
pub mod engine;

mod observability;

/// On-disk table metadata.
pub mod ondisk;

pub use crate::{
    compaction::{
        batch_for_compaction, CompactionDriver, CompactionOptions, CompactionRange,
        FileMetadataProvider, RangeCompactor,
    },
    engine::{Engine, EngineError, EngineOptions},
    ondisk::sstable::FileDescriptor,
};
