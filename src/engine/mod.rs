//! Storage engine handle and table catalog.
//!
//! The engine owns the per-level catalog of SSTables that compaction planning
//! reads from. Opening runs the [`OpenHook`] over the options, closing drops
//! the catalog. Compaction itself is executed by a caller-supplied
//! [`RangeCompactor`].

mod error;
pub mod hook;
mod options;

use std::{ops::Bound, path::Path};

use async_lock::Mutex;
use bytes::Bytes;
use crossbeam_skiplist::SkipMap;
pub use error::EngineError;
pub use hook::{OpenHook, RejectExtraOptions};
pub use options::{EngineOptions, DEFAULT_NUM_LEVELS};

use crate::{
    compaction::{CompactionDriver, CompactionPlan, FileMetadataProvider, RangeCompactor},
    observability::{display_key, log_error, log_info, log_warn},
    ondisk::sstable::{FileDescriptor, SsTableEntry, SsTableId},
};

/// Tables of one level ordered by smallest key, ties broken by id.
type LevelCatalog = SkipMap<(Bytes, SsTableId), SsTableEntry>;

/// Point-in-time statistics about an open engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvStats {
    /// Encryption-at-rest status, `None` when the build has no encryption.
    pub encryption_status: Option<Bytes>,
    /// Number of registered tables across all levels.
    pub total_files: usize,
    /// Total size of registered tables across all levels.
    pub total_bytes: u64,
    /// Table count per level, indexed by level.
    pub level_files: Vec<usize>,
}

/// Open handle to a storage engine.
pub struct Engine {
    options: EngineOptions,
    levels: Vec<LevelCatalog>,
    mutation: Mutex<()>,
}

impl Engine {
    /// Open an engine with the default [`RejectExtraOptions`] hook.
    pub async fn open(options: EngineOptions) -> Result<Self, EngineError> {
        Self::open_with_hook(options, &RejectExtraOptions).await
    }

    /// Open an engine after `hook` has validated the options.
    ///
    /// When a data directory is configured it is created if missing.
    pub async fn open_with_hook<H>(options: EngineOptions, hook: &H) -> Result<Self, EngineError>
    where
        H: OpenHook + ?Sized,
    {
        options.validate()?;
        if let Err(err) = hook.validate(&options) {
            log_warn!(
                component = "engine",
                event = "open_hook_rejected",
                extra_options_len = options.extra().len(),
                error = %err,
            );
            return Err(err);
        }
        if let Some(dir) = options.data_dir() {
            if let Err(err) = create_dir(dir).await {
                log_error!(
                    component = "engine",
                    event = "data_dir_create_failed",
                    dir = %dir.display(),
                    error = %err,
                );
                return Err(err.into());
            }
        }
        let levels = (0..options.levels()).map(|_| SkipMap::new()).collect();
        log_info!(
            component = "engine",
            event = "engine_opened",
            dir = ?options.data_dir(),
            levels = options.levels(),
        );
        Ok(Self {
            options,
            levels,
            mutation: Mutex::new(()),
        })
    }

    /// Options the engine was opened with.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Register a table in `level`.
    ///
    /// Level 0 accepts overlapping tables; deeper levels reject a table that
    /// shares keys with an existing one. Touching boundary keys are allowed.
    pub async fn add_file(
        &self,
        level: usize,
        descriptor: FileDescriptor,
    ) -> Result<SsTableId, EngineError> {
        let catalog = self.level(level)?;
        if !descriptor.has_ordered_bounds() {
            return Err(EngineError::InvertedBounds);
        }
        let _guard = self.mutation.lock().await;
        if level > 0 {
            for entry in catalog.iter() {
                if entry.key().0 > *descriptor.largest_key() {
                    break;
                }
                if entry.value().descriptor().overlaps(&descriptor) {
                    return Err(EngineError::Overlap {
                        level,
                        existing: entry.value().id(),
                    });
                }
            }
        }
        let id = SsTableId::generate();
        log_info!(
            component = "engine",
            event = "sst_added",
            sst = %id,
            level,
            smallest = %display_key(descriptor.smallest_key()),
            largest = %display_key(descriptor.largest_key()),
            bytes = descriptor.size_bytes(),
        );
        catalog.insert(
            (descriptor.smallest_key().clone(), id),
            SsTableEntry::new(id, level, descriptor),
        );
        Ok(id)
    }

    /// Drop a table from `level`, returning its descriptor.
    pub async fn remove_file(
        &self,
        level: usize,
        id: SsTableId,
    ) -> Result<FileDescriptor, EngineError> {
        let catalog = self.level(level)?;
        let _guard = self.mutation.lock().await;
        let key = catalog
            .iter()
            .find(|entry| entry.value().id() == id)
            .map(|entry| entry.key().clone())
            .ok_or(EngineError::UnknownFile(id))?;
        let removed = catalog
            .remove(&key)
            .ok_or(EngineError::UnknownFile(id))?;
        log_info!(
            component = "engine",
            event = "sst_removed",
            sst = %id,
            level,
        );
        Ok(removed.value().descriptor().clone())
    }

    /// Tables of `level` in smallest-key order.
    pub fn level_files(&self, level: usize) -> Result<Vec<SsTableEntry>, EngineError> {
        Ok(self
            .level(level)?
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    /// Collect catalog statistics.
    ///
    /// Fails when the configured data directory is no longer reachable.
    pub async fn env_stats(&self) -> Result<EnvStats, EngineError> {
        if let Some(dir) = self.options.data_dir() {
            probe_dir(dir).await?;
        }
        let mut total_bytes = 0u64;
        let mut level_files = Vec::with_capacity(self.levels.len());
        for catalog in &self.levels {
            level_files.push(catalog.len());
            for entry in catalog.iter() {
                total_bytes = total_bytes.saturating_add(entry.value().descriptor().size_bytes());
            }
        }
        Ok(EnvStats {
            encryption_status: None,
            total_files: level_files.iter().sum(),
            total_bytes,
            level_files,
        })
    }

    /// Split `[start, end)` into compaction ranges and hand each to `compactor`.
    ///
    /// Uses the engine's configured [`crate::compaction::CompactionOptions`].
    pub async fn compact_span<C>(
        &self,
        compactor: &C,
        start: Bytes,
        end: Bytes,
    ) -> Result<CompactionPlan, EngineError>
    where
        C: RangeCompactor + ?Sized,
    {
        let driver = CompactionDriver::new(self, self.options.compaction_options().clone())?;
        Ok(driver.compact_span(compactor, start, end).await?)
    }

    /// Release the handle.
    pub fn close(self) {
        let files: usize = self.levels.iter().map(SkipMap::len).sum();
        log_info!(
            component = "engine",
            event = "engine_closed",
            dir = ?self.options.data_dir(),
            files,
        );
    }

    fn level(&self, level: usize) -> Result<&LevelCatalog, EngineError> {
        self.levels.get(level).ok_or(EngineError::InvalidLevel {
            level,
            levels: self.levels.len(),
        })
    }
}

/// Serves the bottommost non-empty level.
///
/// Level 0 tables may overlap and cannot bound a range, so a span whose only
/// data lives in level 0 yields no tables and compacts as a single range.
impl FileMetadataProvider for Engine {
    fn files_in_span(&self, start: &[u8], end: &[u8]) -> Vec<FileDescriptor> {
        let Some((level, catalog)) = self
            .levels
            .iter()
            .enumerate()
            .rev()
            .find(|(_, catalog)| !catalog.is_empty())
        else {
            return Vec::new();
        };
        if level == 0 {
            return Vec::new();
        }
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded((Bytes::copy_from_slice(end), SsTableId::MIN))
        };
        catalog
            .range((Bound::Unbounded, upper))
            .map(|entry| entry.value().descriptor().clone())
            .filter(|file| file.intersects(start, end))
            .collect()
    }
}

#[cfg(feature = "tokio")]
async fn create_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await
}

#[cfg(not(feature = "tokio"))]
async fn create_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(feature = "tokio")]
async fn probe_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::metadata(dir).await.map(|_| ())
}

#[cfg(not(feature = "tokio"))]
async fn probe_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::metadata(dir).map(|_| ())
}
