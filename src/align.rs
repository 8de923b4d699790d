//! Frame alignment.
//!
//! Frames extracted from a recording at a fixed cadence are matched to the
//! telemetry record whose sequence index is closest to the frame's position
//! in the source. With an original frame rate `F_o` and an extraction rate
//! `F_e`, each extracted frame advances `F_o / F_e` source frames, so frame
//! ordinal `k` targets sequence index `floor(k * F_o / F_e) + 1`.
//!
//! Ties between two equally close records go to the one that comes first in
//! the sequence. When the sequence indices are sorted (as in any rendered or
//! merged timeline) the lookup is a binary search; otherwise it falls back to
//! a linear scan. Both give the same answer.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use flightsrt::{AlignmentParams, TelemetryRecord, align_frames};
//!
//! let records: Vec<TelemetryRecord> = (1..=300)
//!     .map(|i| TelemetryRecord::new(i, Duration::ZERO, Duration::ZERO, ""))
//!     .collect();
//! let params = AlignmentParams::new(30.0, 1.0)?;
//! let assignments = align_frames(6, &records, &params);
//!
//! assert_eq!(assignments[0].record().map(|r| r.sequence_index), Some(1));
//! assert_eq!(assignments[5].record().map(|r| r.sequence_index), Some(151));
//! # Ok::<(), flightsrt::FlightSrtError>(())
//! ```

use crate::error::FlightSrtError;
use crate::record::TelemetryRecord;

/// Frame-rate parameters for alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentParams {
    fps_original: f64,
    fps_extracted: f64,
}

impl AlignmentParams {
    /// Validate and build alignment parameters.
    ///
    /// # Errors
    ///
    /// Returns [`FlightSrtError::InvalidFrameRate`] if either rate is not a
    /// finite number greater than zero.
    pub fn new(fps_original: f64, fps_extracted: f64) -> Result<Self, FlightSrtError> {
        validate_rate("Original FPS", fps_original)?;
        validate_rate("Extracted FPS", fps_extracted)?;
        Ok(Self {
            fps_original,
            fps_extracted,
        })
    }

    /// Frame rate of the source recording.
    pub fn fps_original(&self) -> f64 {
        self.fps_original
    }

    /// Frames extracted per second of source time.
    pub fn fps_extracted(&self) -> f64 {
        self.fps_extracted
    }

    /// Source frames advanced per extracted frame.
    pub fn interval(&self) -> f64 {
        self.fps_original / self.fps_extracted
    }

    /// The 1-based sequence index frame `ordinal` should land on.
    ///
    /// Targets beyond the `u64` range saturate at `u64::MAX`.
    pub fn target_index(&self, ordinal: usize) -> u64 {
        ((ordinal as f64 * self.interval()).floor() as u64).saturating_add(1)
    }
}

fn validate_rate(name: &'static str, value: f64) -> Result<(), FlightSrtError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FlightSrtError::InvalidFrameRate { name, value })
    }
}

/// The telemetry record chosen for one extracted frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAssignment<'a> {
    /// 0-based position of the frame in the extracted sequence.
    pub frame_ordinal: usize,
    /// Sequence index the frame was aimed at.
    pub target_index: u64,
    /// The nearest record, or `None` when there is no telemetry.
    pub assigned_record: Option<&'a TelemetryRecord>,
}

impl<'a> FrameAssignment<'a> {
    /// The assigned record, if any.
    pub fn record(&self) -> Option<&'a TelemetryRecord> {
        self.assigned_record
    }

    /// Returns `true` if the frame has no record.
    pub fn is_unmatched(&self) -> bool {
        self.assigned_record.is_none()
    }
}

/// Nearest-record lookup over one telemetry sequence.
///
/// Checks once whether sequence indices are sorted and picks a binary
/// search or a linear scan accordingly.
#[derive(Debug, Clone, Copy)]
pub struct NearestRecord<'a> {
    records: &'a [TelemetryRecord],
    sorted: bool,
}

impl<'a> NearestRecord<'a> {
    /// Prepare lookups over `records`.
    pub fn new(records: &'a [TelemetryRecord]) -> Self {
        let sorted = records
            .windows(2)
            .all(|pair| pair[0].sequence_index <= pair[1].sequence_index);
        Self { records, sorted }
    }

    /// The record whose `sequence_index` is closest to `target`, preferring
    /// the earliest one on ties.
    pub fn find(&self, target: u64) -> Option<&'a TelemetryRecord> {
        if self.sorted {
            self.find_sorted(target)
        } else {
            self.find_linear(target)
        }
    }

    fn find_linear(&self, target: u64) -> Option<&'a TelemetryRecord> {
        let mut best: Option<&'a TelemetryRecord> = None;
        for record in self.records {
            let distance = record.sequence_index.abs_diff(target);
            if best.is_none_or(|current| distance < current.sequence_index.abs_diff(target)) {
                best = Some(record);
            }
        }
        best
    }

    fn find_sorted(&self, target: u64) -> Option<&'a TelemetryRecord> {
        let records = self.records;
        // First record with sequence_index >= target.
        let upper = records.partition_point(|record| record.sequence_index < target);

        let above = records.get(upper);
        let below = upper.checked_sub(1).map(|position| {
            // Earliest record sharing the closest lower index.
            let index = records[position].sequence_index;
            let first = records[..=position].partition_point(|record| record.sequence_index < index);
            &records[first]
        });

        match (below, above) {
            (None, None) => None,
            (Some(record), None) | (None, Some(record)) => Some(record),
            (Some(low), Some(high)) => {
                if target - low.sequence_index <= high.sequence_index - target {
                    Some(low)
                } else {
                    Some(high)
                }
            }
        }
    }
}

/// Align `frame_count` extracted frames (ordinals `0..frame_count`) to
/// `records`.
///
/// Each frame is looked up independently. An empty `records` slice leaves
/// every frame unmatched.
pub fn align_frames<'a>(
    frame_count: usize,
    records: &'a [TelemetryRecord],
    params: &AlignmentParams,
) -> Vec<FrameAssignment<'a>> {
    let lookup = NearestRecord::new(records);
    (0..frame_count)
        .map(|ordinal| align_one(ordinal, &lookup, params))
        .collect()
}

pub(crate) fn align_one<'a>(
    ordinal: usize,
    lookup: &NearestRecord<'a>,
    params: &AlignmentParams,
) -> FrameAssignment<'a> {
    let target_index = params.target_index(ordinal);
    FrameAssignment {
        frame_ordinal: ordinal,
        target_index,
        assigned_record: lookup.find(target_index),
    }
}
