//! Compaction driver for forcing compaction over a key span.
//!
//! The driver snapshots table metadata from a [`FileMetadataProvider`],
//! batches it into size-bounded ranges and issues each range to a
//! [`RangeCompactor`]. Retries and backpressure belong to the compactor.

use std::{future::Future, pin::Pin};

use bytes::Bytes;
use futures_util::{stream, TryStreamExt};

use crate::{
    compaction::{
        batcher::{batch_for_compaction, CompactionRange},
        BoxError, CompactionError, FileMetadataProvider,
    },
    observability::{display_key, log_debug, log_info, log_warn},
};

/// Default per-range byte budget used when forcing compaction of a span.
pub const DEFAULT_TARGET_SIZE: u64 = 128 << 20;

/// Executes compaction of a single key range against the storage engine.
pub trait RangeCompactor: Send + Sync {
    /// Compact every key in `range`.
    fn compact_range<'a>(
        &'a self,
        range: &'a CompactionRange,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;
}

/// Tuning knobs for span compaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactionOptions {
    target_size: u64,
    max_concurrency: usize,
}

impl Default for CompactionOptions {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            max_concurrency: 1,
        }
    }
}

impl CompactionOptions {
    /// Approximate byte budget per emitted range.
    ///
    /// Zero cuts a range after every table but the last.
    #[must_use]
    pub fn target_size(mut self, bytes: u64) -> Self {
        self.target_size = bytes;
        self
    }

    /// Maximum number of ranges compacted at once; `1` runs them in key order.
    #[must_use]
    pub fn max_concurrency(mut self, ranges: usize) -> Self {
        self.max_concurrency = ranges;
        self
    }

    /// Configured per-range byte budget.
    pub fn target_size_bytes(&self) -> u64 {
        self.target_size
    }

    /// Configured concurrency limit.
    pub fn concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub(crate) fn validate(&self) -> Result<(), CompactionError> {
        if self.max_concurrency == 0 {
            return Err(CompactionError::InvalidOptions(
                "max_concurrency must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Ranges planned for one span together with the input they cover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactionPlan {
    /// Ranges tiling the requested span, in key order.
    pub ranges: Vec<CompactionRange>,
    /// Number of tables intersecting the span.
    pub input_files: usize,
    /// Total size of those tables.
    pub input_bytes: u64,
}

/// Plans and drives compaction of key spans.
pub struct CompactionDriver<'a, P: ?Sized> {
    provider: &'a P,
    options: CompactionOptions,
}

impl<'a, P> CompactionDriver<'a, P>
where
    P: FileMetadataProvider + ?Sized,
{
    /// Create a driver reading table metadata from `provider`.
    pub fn new(provider: &'a P, options: CompactionOptions) -> Result<Self, CompactionError> {
        options.validate()?;
        Ok(Self { provider, options })
    }

    /// Options in effect for this driver.
    pub fn options(&self) -> &CompactionOptions {
        &self.options
    }

    /// Split `[start, end)` into ranges without compacting anything.
    pub fn plan(&self, start: Bytes, end: Bytes) -> Result<CompactionPlan, CompactionError> {
        let files = self.provider.files_in_span(&start, &end);
        let input_bytes = files
            .iter()
            .fold(0u64, |acc, file| acc.saturating_add(file.size_bytes()));
        let input_files = files.len();
        let ranges = batch_for_compaction(&files, start, end, self.options.target_size)?;
        log_debug!(
            component = "compaction",
            event = "compaction_planned",
            input_files,
            input_bytes,
            ranges = ranges.len(),
            target_size = self.options.target_size,
        );
        Ok(CompactionPlan {
            ranges,
            input_files,
            input_bytes,
        })
    }

    /// Plan `[start, end)` and compact every resulting range.
    ///
    /// At most `max_concurrency` ranges are in flight. The first failure
    /// aborts the span; ranges still in flight are dropped and ranges not yet
    /// started are skipped. Returns the executed plan on success.
    pub async fn compact_span<C>(
        &self,
        compactor: &C,
        start: Bytes,
        end: Bytes,
    ) -> Result<CompactionPlan, CompactionError>
    where
        C: RangeCompactor + ?Sized,
    {
        let plan = self.plan(start, end)?;
        log_info!(
            component = "compaction",
            event = "span_compaction_started",
            ranges = plan.ranges.len(),
            input_bytes = plan.input_bytes,
            max_concurrency = self.options.max_concurrency,
        );
        stream::iter(plan.ranges.iter().map(Ok::<_, CompactionError>))
            .try_for_each_concurrent(self.options.max_concurrency, |range| {
                compact_one(compactor, range)
            })
            .await?;
        log_info!(
            component = "compaction",
            event = "span_compaction_finished",
            ranges = plan.ranges.len(),
        );
        Ok(plan)
    }
}

async fn compact_one<C>(compactor: &C, range: &CompactionRange) -> Result<(), CompactionError>
where
    C: RangeCompactor + ?Sized,
{
    match compactor.compact_range(range).await {
        Ok(()) => {
            log_debug!(
                component = "compaction",
                event = "range_compacted",
                start = %display_key(range.start()),
                limit = %display_key(range.limit()),
            );
            Ok(())
        }
        Err(source) => {
            log_warn!(
                component = "compaction",
                event = "range_compaction_failed",
                start = %display_key(range.start()),
                limit = %display_key(range.limit()),
                error = %source,
            );
            Err(CompactionError::Range {
                range: range.clone(),
                source,
            })
        }
    }
}
