//! Error types for the `flightsrt` crate.
//!
//! This module defines [`FlightSrtError`], the error type returned by the
//! fallible operations in the crate. Only whole-batch problems surface here:
//! a malformed block, a missing sidecar, a failed duration probe or a failed
//! geotag write is recovered locally and reported through an
//! [`EventSink`](crate::EventSink) instead.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

use crate::report::BatchSummary;

/// The unified error type for all `flightsrt` operations.
///
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlightSrtError {
    /// A telemetry or list file could not be read.
    #[error("Failed to open {path}: {reason}")]
    FileOpen {
        /// Path that could not be opened.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The concat list file does not exist.
    #[error("Input list file not found: {0}")]
    ListFileNotFound(PathBuf),

    /// The concat list yielded no segment with usable telemetry.
    #[error("No telemetry files found in {list}")]
    NoSegments {
        /// The list file that was read.
        list: PathBuf,
        /// What happened to each entry on the way.
        summary: BatchSummary,
    },

    /// A telemetry file produced no records to align against.
    #[error("No GPS data found in telemetry file {path}")]
    EmptyTelemetry {
        /// The telemetry file that was parsed.
        path: PathBuf,
    },

    /// The frames directory has no files with the requested extension.
    #[error("No .{extension} files found in {directory}")]
    NoFrames {
        /// Directory that was listed.
        directory: PathBuf,
        /// Extension filter, without the leading dot.
        extension: String,
    },

    /// The frames directory does not exist or is not a directory.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// A frame rate was zero, negative or not a finite number.
    #[error("{name} must be greater than 0, got {value}")]
    InvalidFrameRate {
        /// Which rate was rejected (e.g. `"Original FPS"`).
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An external tool needed for the batch is not installed or not runnable.
    #[error("{tool} not available: {reason}")]
    ToolUnavailable {
        /// Name of the tool (e.g. `"exiftool"`).
        tool: &'static str,
        /// Why the availability check failed.
        reason: String,
    },

    /// Writing geotag metadata to one image failed.
    #[error("Failed to tag {path}: {reason}")]
    GeotagWrite {
        /// The image that could not be tagged.
        path: PathBuf,
        /// Tool output or error describing the failure.
        reason: String,
    },

    /// A media duration could not be determined.
    #[error("Failed to probe duration of {path}: {reason}")]
    ProbeFailed {
        /// The media file that was probed.
        path: PathBuf,
        /// Why probing failed.
        reason: String,
    },

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An error originating from the FFmpeg libraries.
    #[cfg(feature = "ffmpeg")]
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}

#[cfg(feature = "ffmpeg")]
impl From<ffmpeg_next::Error> for FlightSrtError {
    fn from(error: ffmpeg_next::Error) -> Self {
        FlightSrtError::FfmpegError(error.to_string())
    }
}
