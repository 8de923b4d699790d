//! Timeline concatenation.
//!
//! Chains the records of consecutive [`Segment`]s into one [`Timeline`].
//! Every record of a segment is shifted by two running offsets: the number
//! of records emitted by earlier segments, and the time consumed by earlier
//! segments. Segments are processed strictly in order because each offset
//! depends on all segments before it.
//!
//! The time offset advances by the segment's duration hint when one is
//! available, otherwise by the last record's own end offset. Telemetry that
//! stops short of the real end of its recording therefore makes the next
//! segment start early; this is reported as
//! [`Event::DurationFallback`](crate::Event::DurationFallback) and not
//! corrected.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use flightsrt::{ConcatOptions, Segment, TelemetryRecord, concatenate};
//!
//! let first = Segment::new(vec![
//!     TelemetryRecord::new(1, Duration::ZERO, Duration::from_secs(1), "a"),
//!     TelemetryRecord::new(2, Duration::from_secs(1), Duration::from_secs(2), "b"),
//! ])
//! .with_duration_hint(Some(Duration::from_secs(5)));
//! let second = Segment::new(vec![TelemetryRecord::new(1, Duration::ZERO, Duration::from_secs(1), "c")]);
//!
//! let timeline = concatenate(vec![first, second], &ConcatOptions::new());
//! assert_eq!(timeline.records()[2].start_offset, Duration::from_secs(5));
//! assert_eq!(timeline.records()[2].sequence_index, 3);
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::configuration::ConcatOptions;
use crate::error::FlightSrtError;
use crate::progress::{OperationType, ProgressTracker};
use crate::record::{Segment, TelemetryRecord};
use crate::render::{render_records, save_records};
use crate::report::{BatchSummary, Event, EventSink};

/// One continuous telemetry track built from several segments.
///
/// Records keep the shifted `sequence_index` they were given during
/// concatenation; rendering assigns fresh `1..=N` indices.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    records: Vec<TelemetryRecord>,
    summary: BatchSummary,
}

impl Timeline {
    /// The merged records, in segment order.
    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    /// Consume the timeline, returning its records.
    pub fn into_records(self) -> Vec<TelemetryRecord> {
        self.records
    }

    /// Segment counts: processed segments, skipped (empty) segments.
    pub fn summary(&self) -> BatchSummary {
        self.summary
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no segment contributed any record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render the timeline as sidecar text.
    pub fn render(&self) -> String {
        render_records(&self.records)
    }

    /// Render the timeline to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`FlightSrtError::IoError`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FlightSrtError> {
        save_records(path, &self.records)
    }
}

/// Incremental form of [`concatenate`].
///
/// Useful when duration hints are resolved lazily, one segment at a time.
pub struct TimelineBuilder {
    records: Vec<TelemetryRecord>,
    frame_offset: u64,
    time_offset: Duration,
    summary: BatchSummary,
    sink: Arc<dyn EventSink>,
}

impl TimelineBuilder {
    /// Start an empty timeline at index offset 0 and time offset 0.
    pub fn new(options: &ConcatOptions) -> Self {
        Self {
            records: Vec::new(),
            frame_offset: 0,
            time_offset: Duration::ZERO,
            summary: BatchSummary::default(),
            sink: Arc::clone(&options.sink),
        }
    }

    /// Current time offset applied to the next segment.
    pub fn time_offset(&self) -> Duration {
        self.time_offset
    }

    /// Current index offset applied to the next segment.
    pub fn frame_offset(&self) -> u64 {
        self.frame_offset
    }

    /// Append one segment, shifting its records and advancing both offsets.
    ///
    /// Empty segments are reported and leave the offsets untouched.
    pub fn push_segment(&mut self, segment: Segment) {
        let Some(last) = segment.records.last() else {
            self.sink.on_event(&Event::EmptySegment {
                segment: segment.label(),
            });
            self.summary.skipped += 1;
            return;
        };
        let last_end = last.end_offset;

        log::debug!(
            "Appending {} records from {} at offset {:?} / index +{}",
            segment.records.len(),
            segment.label(),
            self.time_offset,
            self.frame_offset
        );

        self.records.extend(
            segment
                .records
                .iter()
                .map(|record| record.shifted(self.frame_offset, self.time_offset)),
        );

        self.frame_offset = self
            .frame_offset
            .saturating_add(segment.records.len() as u64);
        let advance = match segment.duration_hint {
            Some(hint) => hint,
            None => {
                self.sink.on_event(&Event::DurationFallback {
                    segment: segment.label(),
                    fallback: last_end,
                });
                last_end
            }
        };
        self.time_offset = self.time_offset.saturating_add(advance);
        self.summary.processed += 1;
    }

    /// Count an item that never became a segment (e.g. a missing sidecar).
    pub(crate) fn note_skipped(&mut self) {
        self.summary.skipped += 1;
    }

    /// Finish and return the timeline.
    pub fn finish(self) -> Timeline {
        Timeline {
            records: self.records,
            summary: self.summary,
        }
    }
}

/// Concatenate segments, in order, into one timeline.
///
/// Duration hints must already be resolved on each [`Segment`]. Segments
/// without records are skipped with an [`Event::EmptySegment`].
pub fn concatenate<I>(segments: I, options: &ConcatOptions) -> Timeline
where
    I: IntoIterator<Item = Segment>,
{
    let segments: Vec<Segment> = segments.into_iter().collect();
    let mut tracker = ProgressTracker::new(
        Arc::clone(&options.progress),
        OperationType::Concatenation,
        Some(segments.len() as u64),
        options.batch_size,
    );

    let mut builder = TimelineBuilder::new(options);
    for segment in segments {
        builder.push_segment(segment);
        tracker.advance();
    }
    tracker.finish();
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingSink;

    fn record(index: u64, start_ms: u64, end_ms: u64) -> TelemetryRecord {
        TelemetryRecord::new(
            index,
            Duration::from_millis(start_ms),
            Duration::from_millis(end_ms),
            format!("sample {index}"),
        )
    }

    fn two_record_segment() -> Segment {
        Segment::new(vec![record(1, 0, 1000), record(2, 1000, 2000)])
    }

    #[test]
    fn uses_duration_hint_when_present() {
        let first = two_record_segment().with_duration_hint(Some(Duration::from_secs(5)));
        let second = Segment::new(vec![record(1, 0, 1000)]);
        let timeline = concatenate(vec![first, second], &ConcatOptions::new());

        assert_eq!(timeline.records()[2].start_offset, Duration::from_secs(5));
        assert_eq!(timeline.records()[2].end_offset, Duration::from_secs(6));
    }

    #[test]
    fn falls_back_to_last_end_offset() {
        let sink = Arc::new(CollectingSink::new());
        let options = ConcatOptions::new().with_sink(sink.clone());
        let timeline = concatenate(
            vec![two_record_segment(), Segment::new(vec![record(1, 0, 1000)])],
            &options,
        );

        assert_eq!(timeline.records()[2].start_offset, Duration::from_secs(2));
        assert!(sink.events().iter().any(|event| matches!(
            event,
            Event::DurationFallback { fallback, .. } if *fallback == Duration::from_secs(2)
        )));
    }

    #[test]
    fn shifts_indices_by_record_count() {
        let first = Segment::new(vec![record(10, 0, 100), record(11, 100, 200), record(12, 200, 300)]);
        let second = Segment::new(vec![record(1, 0, 100)]);
        let timeline = concatenate(vec![first, second], &ConcatOptions::new());

        let indices: Vec<u64> = timeline.records().iter().map(|r| r.sequence_index).collect();
        assert_eq!(indices, vec![10, 11, 12, 4]);
    }

    #[test]
    fn maximal_indices_and_durations_saturate() {
        let first = Segment::new(vec![record(1, 0, 1000)]).with_duration_hint(Some(Duration::MAX));
        let second = Segment::new(vec![record(u64::MAX, 0, 1000)]);
        let timeline = concatenate(vec![first, second], &ConcatOptions::new());

        let last = &timeline.records()[1];
        assert_eq!(last.sequence_index, u64::MAX);
        assert_eq!(last.start_offset, Duration::MAX);
        assert_eq!(last.end_offset, Duration::MAX);
        assert_eq!(timeline.summary().processed, 2);
    }

    #[test]
    fn empty_segment_contributes_nothing() {
        let sink = Arc::new(CollectingSink::new());
        let options = ConcatOptions::new().with_sink(sink.clone());
        let timeline = concatenate(
            vec![
                two_record_segment(),
                Segment::new(Vec::new()).with_duration_hint(Some(Duration::from_secs(60))),
                Segment::new(vec![record(1, 0, 1000)]),
            ],
            &options,
        );

        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.records()[2].start_offset, Duration::from_secs(2));
        assert_eq!(timeline.records()[2].sequence_index, 3);
        assert_eq!(timeline.summary().skipped, 1);
        assert_eq!(timeline.summary().processed, 2);
        let empties = sink
            .events()
            .into_iter()
            .filter(|event| matches!(event, Event::EmptySegment { .. }))
            .count();
        assert_eq!(empties, 1);
    }

    #[test]
    fn single_segment_is_unchanged() {
        let segment = two_record_segment();
        let timeline = concatenate(vec![segment.clone()], &ConcatOptions::new());
        assert_eq!(timeline.records(), segment.records.as_slice());
    }

    #[test]
    fn builder_exposes_running_offsets() {
        let mut builder = TimelineBuilder::new(&ConcatOptions::new());
        builder.push_segment(two_record_segment().with_duration_hint(Some(Duration::from_millis(2500))));
        assert_eq!(builder.frame_offset(), 2);
        assert_eq!(builder.time_offset(), Duration::from_millis(2500));
    }
}
