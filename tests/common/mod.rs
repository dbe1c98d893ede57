//! Common test utilities for integration tests.
#![allow(dead_code)]

use std::{future::Future, pin::Pin, sync::Mutex};

use keyspan_compaction::{compaction::BoxError, CompactionRange, RangeCompactor};

/// Compactor that records every range it is asked to compact.
#[derive(Default)]
pub struct RecordingCompactor {
    seen: Mutex<Vec<CompactionRange>>,
}

impl RecordingCompactor {
    /// Ranges compacted so far, in completion order.
    pub fn ranges(&self) -> Vec<CompactionRange> {
        self.seen.lock().expect("recorder lock").clone()
    }
}

impl RangeCompactor for RecordingCompactor {
    fn compact_range<'a>(
        &'a self,
        range: &'a CompactionRange,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.seen.lock().expect("recorder lock").push(range.clone());
            Ok(())
        })
    }
}

/// Fixed-width decimal key so byte order matches numeric order.
pub fn key(n: u32) -> String {
    format!("{n:08}")
}
