//! Frame geotagging.
//!
//! Ties the pieces together for extracted stills: parse the flight's
//! telemetry, keep the records that carry a position, align every frame to
//! its nearest record and hand each position to a [`GeotagWriter`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use flightsrt::{AlignmentParams, ExifToolWriter, LogSink, TagOptions, tag_directory};
//!
//! let params = AlignmentParams::new(30.0, 1.0)?;
//! let options = TagOptions::new().with_sink(Arc::new(LogSink));
//! let summary = tag_directory("DJI_0001.SRT", "frames", "jpg", &params, &ExifToolWriter::new(), &options)?;
//! println!("{summary}");
//! # Ok::<(), flightsrt::FlightSrtError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::align::{AlignmentParams, FrameAssignment};
use crate::configuration::TagOptions;
use crate::error::FlightSrtError;
use crate::frames::list_frames;
use crate::geotag::GeotagWriter;
use crate::parser::parse_telemetry_file;
use crate::progress::{OperationType, ProgressTracker};
use crate::record::TelemetryRecord;
use crate::report::{BatchSummary, Event};

/// Geotag `frames`, in order, from `records`.
///
/// Records without both latitude and longitude are ignored. A frame with no
/// record is counted as skipped; a frame whose write fails is counted as
/// failed. Neither stops the batch.
///
/// # Errors
///
/// Returns [`FlightSrtError::Cancelled`] if the options' cancellation token
/// fires between frames.
pub fn tag_frames(
    records: &[TelemetryRecord],
    frames: &[PathBuf],
    params: &AlignmentParams,
    writer: &dyn GeotagWriter,
    options: &TagOptions,
) -> Result<BatchSummary, FlightSrtError> {
    let geodetic: Vec<TelemetryRecord> = records
        .iter()
        .filter(|record| record.has_position())
        .cloned()
        .collect();
    let assignments = align(frames.len(), &geodetic, params);

    let mut tracker = ProgressTracker::new(
        Arc::clone(&options.progress),
        OperationType::Tagging,
        Some(frames.len() as u64),
        options.batch_size,
    );
    let mut summary = BatchSummary::default();

    for (frame, assignment) in frames.iter().zip(&assignments) {
        if options.is_cancelled() {
            return Err(FlightSrtError::Cancelled);
        }

        match assignment.record().and_then(TelemetryRecord::position) {
            None => {
                options.sink.on_event(&Event::FrameUnmatched {
                    frame: frame.clone(),
                });
                summary.skipped += 1;
            }
            Some(position) => match writer.write_geotag(frame, &position) {
                Ok(()) => {
                    log::debug!(
                        "Tagged {} with record {} ({}, {})",
                        frame.display(),
                        assignment.target_index,
                        position.latitude,
                        position.longitude
                    );
                    summary.processed += 1;
                }
                Err(error) => {
                    options.sink.on_event(&Event::WriteFailed {
                        frame: frame.clone(),
                        reason: error.to_string(),
                    });
                    summary.failed += 1;
                }
            },
        }
        tracker.advance();
    }
    tracker.finish();

    Ok(summary)
}

#[cfg(not(feature = "rayon"))]
fn align<'a>(
    frame_count: usize,
    records: &'a [TelemetryRecord],
    params: &AlignmentParams,
) -> Vec<FrameAssignment<'a>> {
    crate::align::align_frames(frame_count, records, params)
}

#[cfg(feature = "rayon")]
fn align<'a>(
    frame_count: usize,
    records: &'a [TelemetryRecord],
    params: &AlignmentParams,
) -> Vec<FrameAssignment<'a>> {
    crate::parallel::align_frames_parallel(frame_count, records, params)
}

/// Geotag every `*.{extension}` file in `frames_dir` from the telemetry in
/// `telemetry_path`.
///
/// # Errors
///
/// - [`FlightSrtError::FileOpen`] if the telemetry cannot be read.
/// - [`FlightSrtError::EmptyTelemetry`] if it has no record with a position.
/// - [`FlightSrtError::ToolUnavailable`] if the writer cannot run.
/// - [`FlightSrtError::DirectoryNotFound`] / [`FlightSrtError::NoFrames`]
///   if there is nothing to tag.
/// - Plus anything [`tag_frames`] returns.
pub fn tag_directory<P: AsRef<Path>, Q: AsRef<Path>>(
    telemetry_path: P,
    frames_dir: Q,
    extension: &str,
    params: &AlignmentParams,
    writer: &dyn GeotagWriter,
    options: &TagOptions,
) -> Result<BatchSummary, FlightSrtError> {
    let telemetry_path = telemetry_path.as_ref();
    let frames_dir = frames_dir.as_ref();

    let report = parse_telemetry_file(telemetry_path)?;
    for (block_number, reason) in report.skipped {
        options.sink.on_event(&Event::BlockSkipped {
            source: Some(telemetry_path.to_path_buf()),
            block_number,
            reason,
        });
    }
    let records: Vec<TelemetryRecord> = report
        .records
        .into_iter()
        .filter(TelemetryRecord::has_position)
        .collect();
    if records.is_empty() {
        return Err(FlightSrtError::EmptyTelemetry {
            path: telemetry_path.to_path_buf(),
        });
    }
    log::info!("Found {} records with GPS data", records.len());

    writer.check_available()?;

    let frames = list_frames(frames_dir, extension)?;
    if frames.is_empty() {
        return Err(FlightSrtError::NoFrames {
            directory: frames_dir.to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
        });
    }
    log::info!("Found {} image files to tag", frames.len());

    tag_frames(&records, &frames, params, writer, options)
}
