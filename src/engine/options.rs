use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::{compaction::CompactionOptions, engine::EngineError};

/// Number of levels in a freshly opened engine.
pub const DEFAULT_NUM_LEVELS: usize = 7;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub(crate) dir: Option<PathBuf>,
    pub(crate) extra_options: Bytes,
    pub(crate) num_levels: usize,
    pub(crate) compaction: CompactionOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            dir: None,
            extra_options: Bytes::new(),
            num_levels: DEFAULT_NUM_LEVELS,
            compaction: CompactionOptions::default(),
        }
    }
}

impl<P> From<P> for EngineOptions
where
    P: Into<PathBuf>,
{
    fn from(dir: P) -> Self {
        EngineOptions {
            dir: Some(dir.into()),
            ..Default::default()
        }
    }
}

impl EngineOptions {
    pub fn dir(self, dir: impl Into<PathBuf>) -> Self {
        EngineOptions {
            dir: Some(dir.into()),
            ..self
        }
    }

    pub fn in_memory(self) -> Self {
        EngineOptions { dir: None, ..self }
    }

    /// Opaque engine-specific options handed to the open hook.
    pub fn extra_options(self, extra_options: impl Into<Bytes>) -> Self {
        EngineOptions {
            extra_options: extra_options.into(),
            ..self
        }
    }

    pub fn num_levels(self, num_levels: usize) -> Self {
        EngineOptions { num_levels, ..self }
    }

    pub fn compaction(self, compaction: CompactionOptions) -> Self {
        EngineOptions { compaction, ..self }
    }
}

impl EngineOptions {
    pub fn data_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn extra(&self) -> &Bytes {
        &self.extra_options
    }

    pub fn levels(&self) -> usize {
        self.num_levels
    }

    pub fn compaction_options(&self) -> &CompactionOptions {
        &self.compaction
    }

    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if self.num_levels == 0 {
            return Err(EngineError::InvalidOptions("engine needs at least one level"));
        }
        self.compaction
            .validate()
            .map_err(|_| EngineError::InvalidOptions("max_concurrency must be at least 1"))
    }
}
