//! On-disk table metadata consumed by compaction planning.

pub mod sstable;
