//! Validation run before an engine handle is created.
//!
//! Builds that understand engine-specific `extra_options` install their own
//! [`OpenHook`]; this build ships [`RejectExtraOptions`].

use crate::engine::{EngineError, EngineOptions};

/// Checks engine options before the handle is opened.
pub trait OpenHook: Send + Sync {
    /// Reject options this build cannot honour.
    fn validate(&self, options: &EngineOptions) -> Result<(), EngineError>;
}

/// Default hook: any non-empty `extra_options` is an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectExtraOptions;

impl OpenHook for RejectExtraOptions {
    fn validate(&self, options: &EngineOptions) -> Result<(), EngineError> {
        if options.extra().is_empty() {
            Ok(())
        } else {
            Err(EngineError::ExtraOptions)
        }
    }
}

impl<F> OpenHook for F
where
    F: Fn(&EngineOptions) -> Result<(), EngineError> + Send + Sync,
{
    fn validate(&self, options: &EngineOptions) -> Result<(), EngineError> {
        self(options)
    }
}
