use thiserror::Error;

use crate::{compaction::CompactionError, ondisk::sstable::SsTableId};

/// Errors for the engine handle.
///
/// The `Display` output is the operator-facing message; callers should
/// surface it as is.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine options carry extra_options, but this build cannot handle them")]
    ExtraOptions,
    #[error("open hook rejected options: {0}")]
    Hook(String),
    #[error("invalid engine options: {0}")]
    InvalidOptions(&'static str),
    #[error("engine io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("level {level} is out of range for an engine with {levels} levels")]
    InvalidLevel { level: usize, levels: usize },
    #[error("table has smallest key after its largest key")]
    InvertedBounds,
    #[error("table overlaps {existing} in level {level}")]
    Overlap { level: usize, existing: SsTableId },
    #[error("table {0} is not registered")]
    UnknownFile(SsTableId),
    #[error("engine compaction error: {0}")]
    Compaction(#[from] CompactionError),
}
