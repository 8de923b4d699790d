//! Parallel frame alignment.
//!
//! Per-frame lookups share nothing but the read-only record slice, so they
//! can be spread across rayon threads. Results come back in frame order and
//! are identical to [`align_frames`](crate::align_frames).

use ::rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::align::{AlignmentParams, FrameAssignment, NearestRecord, align_one};
use crate::record::TelemetryRecord;

/// Align `frame_count` frames to `records` using the rayon thread pool.
pub fn align_frames_parallel<'a>(
    frame_count: usize,
    records: &'a [TelemetryRecord],
    params: &AlignmentParams,
) -> Vec<FrameAssignment<'a>> {
    let lookup = NearestRecord::new(records);
    (0..frame_count)
        .into_par_iter()
        .map(|ordinal| align_one(ordinal, &lookup, params))
        .collect()
}
