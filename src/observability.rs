//! Logging infrastructure for keyspan-compaction.
//!
//! The crate uses `tracing` for structured logging. All events use target
//! "keyspan" and include an `event` field for filtering.
//!
//! ## Library Integration
//!
//! The crate never initializes a global subscriber. Applications configure
//! tracing via `tracing_subscriber` or similar.
//!
//! ## Conventions
//!
//! - `event`: snake_case event name (required)
//! - `component`: module/subsystem (e.g., "engine", "compaction")
//! - Use `%` for Display, `?` for Debug formatting
//! - Byte keys go through [`display_key`] so binary keys stay readable

use std::fmt;

/// Target for all keyspan log events.
pub(crate) const KEYSPAN_TARGET: &str = "keyspan";

/// Macro for info-level log events.
///
/// # Example
/// ```ignore
/// log_info!(
///     component = "engine",
///     event = "engine_opened",
///     dir = ?options.dir(),
///     levels = options.num_levels(),
/// );
/// ```
macro_rules! log_info {
    ($($field:tt)*) => {
        ::tracing::info!(target: $crate::observability::KEYSPAN_TARGET, $($field)*)
    };
}

/// Macro for debug-level log events.
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::KEYSPAN_TARGET, $($field)*)
    };
}

/// Macro for warn-level log events.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::KEYSPAN_TARGET, $($field)*)
    };
}

/// Macro for error-level log events.
macro_rules! log_error {
    ($($field:tt)*) => {
        ::tracing::error!(target: $crate::observability::KEYSPAN_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_error;
pub(crate) use log_info;
pub(crate) use log_warn;

/// Escaped, allocation-free view of a byte key for log fields.
///
/// An empty key is an open bound and renders as `<unbounded>`.
pub(crate) fn display_key(key: &[u8]) -> DisplayKey<'_> {
    DisplayKey(key)
}

pub(crate) struct DisplayKey<'a>(&'a [u8]);

impl fmt::Display for DisplayKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<unbounded>")
        } else {
            write!(f, "{}", self.0.escape_ascii())
        }
    }
}
