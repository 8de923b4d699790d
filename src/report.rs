//! Diagnostics for batch operations.
//!
//! Per-item problems (a dropped block, a missing sidecar, a probe fallback,
//! an unmatched frame, a failed write) never abort a batch. They are delivered
//! as [`Event`] values to an [`EventSink`] supplied by the caller, and counted
//! in a [`BatchSummary`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use flightsrt::{CollectingSink, ConcatOptions, Segment, concatenate};
//!
//! let sink = Arc::new(CollectingSink::new());
//! let options = ConcatOptions::new().with_sink(sink.clone());
//! let timeline = concatenate(vec![Segment::new(Vec::new())], &options);
//!
//! assert!(timeline.is_empty());
//! assert_eq!(sink.events().len(), 1);
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use crate::parser::SkipReason;
use crate::timestamp::format_timestamp;

/// A recoverable, per-item occurrence during a batch run.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Event {
    /// A telemetry block was dropped while parsing.
    BlockSkipped {
        /// File the block came from, if known.
        source: Option<PathBuf>,
        /// 1-based position of the block in its file.
        block_number: usize,
        /// Why the block was dropped.
        reason: SkipReason,
    },
    /// A list-file entry has no resolvable telemetry file.
    MissingSidecar {
        /// The entry as written in the list file.
        entry: String,
    },
    /// A telemetry file exists but could not be read.
    SegmentUnreadable {
        /// The telemetry file.
        path: PathBuf,
        /// Why reading failed.
        reason: String,
    },
    /// A segment produced no records and was left out of the timeline.
    EmptySegment {
        /// Segment label (usually the telemetry path).
        segment: String,
    },
    /// No duration hint was available; the last record's end offset was
    /// used to advance the timeline instead.
    DurationFallback {
        /// Segment label.
        segment: String,
        /// The offset that was used.
        fallback: Duration,
    },
    /// A frame could not be matched to any telemetry record.
    FrameUnmatched {
        /// The frame image.
        frame: PathBuf,
    },
    /// Writing metadata to a frame failed.
    WriteFailed {
        /// The frame image.
        frame: PathBuf,
        /// Error reported by the writer.
        reason: String,
    },
}

impl Event {
    /// Returns `true` for events that represent a failure rather than a skip.
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::WriteFailed { .. })
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Event::BlockSkipped {
                source,
                block_number,
                reason,
            } => match source {
                Some(path) => write!(f, "{}: block {block_number} skipped ({reason})", path.display()),
                None => write!(f, "block {block_number} skipped ({reason})"),
            },
            Event::MissingSidecar { entry } => {
                write!(f, "telemetry file not found for {entry}")
            }
            Event::SegmentUnreadable { path, reason } => {
                write!(f, "could not read {}: {reason}", path.display())
            }
            Event::EmptySegment { segment } => {
                write!(f, "no valid blocks found in {segment}")
            }
            Event::DurationFallback { segment, fallback } => write!(
                f,
                "no media duration for {segment}, advancing by last telemetry end time {}",
                format_timestamp(*fallback)
            ),
            Event::FrameUnmatched { frame } => {
                write!(f, "no GPS data found for {}", frame.display())
            }
            Event::WriteFailed { frame, reason } => {
                write!(f, "failed to tag {}: {reason}", frame.display())
            }
        }
    }
}

/// Receiver for per-item diagnostics.
///
/// Implementations must be [`Send`] and [`Sync`] so the same sink can be
/// shared with parallel alignment.
pub trait EventSink: Send + Sync {
    /// Called once per event, in the order events occur.
    fn on_event(&self, event: &Event);
}

/// Discards all events. This is the default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSink;

impl EventSink for NoOpSink {
    fn on_event(&self, _event: &Event) {}
}

/// Forwards events to the [`log`] facade.
///
/// Block skips go to `debug`; everything else to `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn on_event(&self, event: &Event) {
        match event {
            Event::BlockSkipped { .. } => log::debug!("{event}"),
            _ => log::warn!("{event}"),
        }
    }
}

/// Buffers events in memory for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Event>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for CollectingSink {
    fn on_event(&self, event: &Event) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

/// Counts of processed, skipped and failed items for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items handled successfully.
    pub processed: usize,
    /// Items left out without an error (missing, empty, unmatched).
    pub skipped: usize,
    /// Items whose processing failed.
    pub failed: usize,
}

impl BatchSummary {
    /// Total items seen.
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

impl Display for BatchSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} processed, {} skipped, {} failed",
            self.processed, self.skipped, self.failed
        )
    }
}
