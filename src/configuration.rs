//! Batch configuration.
//!
//! [`ConcatOptions`] and [`TagOptions`] are builders that thread the event
//! sink, progress callback and cancellation token through batch operations
//! without polluting every function signature.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use flightsrt::{CancellationToken, LogSink, TagOptions};
//!
//! let token = CancellationToken::new();
//! let options = TagOptions::new()
//!     .with_sink(Arc::new(LogSink))
//!     .with_cancellation(token.clone())
//!     .with_batch_size(10);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};
use crate::report::{EventSink, NoOpSink};

/// Settings for [`concatenate`](crate::concatenate) and
/// [`concatenate_list`](crate::concatenate_list).
#[derive(Clone)]
pub struct ConcatOptions {
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
}

impl Debug for ConcatOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConcatOptions")
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for ConcatOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcatOptions {
    /// Defaults: events and progress are discarded, batch size 1.
    pub fn new() -> Self {
        Self {
            sink: Arc::new(NoOpSink),
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Attach an event sink for per-segment diagnostics.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Attach a progress callback, fired per segment.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }
}

/// Settings for [`tag_frames`](crate::tag_frames).
#[derive(Clone)]
pub struct TagOptions {
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
}

impl Debug for TagOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TagOptions")
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for TagOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TagOptions {
    /// Defaults: events and progress are discarded, no cancellation,
    /// batch size 1.
    pub fn new() -> Self {
        Self {
            sink: Arc::new(NoOpSink),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Attach an event sink for per-frame diagnostics.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Attach a progress callback, fired every
    /// [`batch_size`](TagOptions::with_batch_size) frames.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token, checked before each frame.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
