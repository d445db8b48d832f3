//! Per-call state handed to every loader: configuration, cancellation and the tracing span.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{config::LoaderConfig, error::LoaderError};

/// A cloneable cancellation flag shared between a caller and an in-flight load.
///
/// Loaders poll it between major phases (file decode, each PDF page, each EPUB
/// chapter, each CSV record) and return [LoaderError::Cancelled] once it fires.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(LoaderError::Cancelled)` if the signal has fired.
    pub fn check(&self) -> Result<(), LoaderError> {
        if self.is_cancelled() {
            Err(LoaderError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Explicit context passed into each load call.
///
/// Holds the [LoaderConfig], an optional [CancelSignal] and the [tracing::Span]
/// all log events of the call are recorded under. Nothing here is global, so
/// independent loads on different threads never share mutable state.
#[derive(Debug, Clone)]
pub struct LoadContext {
    pub config: LoaderConfig,
    pub cancel: CancelSignal,
    span: tracing::Span,
}

impl Default for LoadContext {
    fn default() -> Self {
        Self {
            config: LoaderConfig::default(),
            cancel: CancelSignal::default(),
            span: tracing::info_span!(target: "docloader", "docloader"),
        }
    }
}

impl LoadContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Tags every event of this context with the calling job's id.
    pub fn with_job_id(mut self, job_id: &str) -> Self {
        self.span = tracing::info_span!(target: "docloader", "docloader", job_id = job_id);
        self
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), LoaderError> {
        self.cancel.check()
    }
}
