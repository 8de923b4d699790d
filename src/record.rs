//! Telemetry data model.
//!
//! A [`TelemetryRecord`] is one timestamped sample from a sidecar file. A
//! [`Segment`] groups the records parsed from one file together with the
//! optional duration hint of the media file it belongs to.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// One telemetry sample: a sequence index, a display interval and the raw
/// payload text, plus any GPS values found in the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    /// Sequence index as printed in the source (1-based by convention).
    pub sequence_index: u64,
    /// When this sample starts, relative to the start of its recording.
    pub start_offset: Duration,
    /// When this sample ends, relative to the start of its recording.
    pub end_offset: Duration,
    /// Payload lines, verbatim, joined with `\n`.
    pub payload: String,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Altitude in metres. Set to `0.0` by the parser when latitude and
    /// longitude are present but the payload carries no altitude.
    pub altitude: Option<f64>,
}

impl TelemetryRecord {
    /// Create a record with no GPS values.
    pub fn new(
        sequence_index: u64,
        start_offset: Duration,
        end_offset: Duration,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            sequence_index,
            start_offset,
            end_offset,
            payload: payload.into(),
            latitude: None,
            longitude: None,
            altitude: None,
        }
    }

    /// The geodetic position of this sample, if both latitude and longitude
    /// are known.
    pub fn position(&self) -> Option<GeoPosition> {
        Some(GeoPosition {
            latitude: self.latitude?,
            longitude: self.longitude?,
            altitude: self.altitude.unwrap_or(0.0),
        })
    }

    /// Returns `true` if the record carries both latitude and longitude.
    pub fn has_position(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Copy of this record shifted by a sequence and time offset.
    ///
    /// Both shifts saturate rather than overflow.
    pub(crate) fn shifted(&self, index_offset: u64, time_offset: Duration) -> Self {
        Self {
            sequence_index: self.sequence_index.saturating_add(index_offset),
            start_offset: self.start_offset.saturating_add(time_offset),
            end_offset: self.end_offset.saturating_add(time_offset),
            ..self.clone()
        }
    }
}

/// A resolved GPS fix, ready to hand to a [`GeotagWriter`](crate::GeotagWriter).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    /// Latitude in decimal degrees, negative south of the equator.
    pub latitude: f64,
    /// Longitude in decimal degrees, negative west of Greenwich.
    pub longitude: f64,
    /// Altitude in metres.
    pub altitude: f64,
}

impl GeoPosition {
    /// `'N'` or `'S'`.
    pub fn latitude_ref(&self) -> char {
        if self.latitude >= 0.0 { 'N' } else { 'S' }
    }

    /// `'E'` or `'W'`.
    pub fn longitude_ref(&self) -> char {
        if self.longitude >= 0.0 { 'E' } else { 'W' }
    }
}

/// All records parsed from one telemetry file.
#[derive(Debug, Clone, Default)]
pub struct Segment {
    /// Records in source order.
    pub records: Vec<TelemetryRecord>,
    /// Authoritative media duration, when a probe succeeded.
    pub duration_hint: Option<Duration>,
    /// Telemetry file the records came from, if any.
    pub source: Option<PathBuf>,
}

impl Segment {
    /// Create a segment with no duration hint.
    pub fn new(records: Vec<TelemetryRecord>) -> Self {
        Self {
            records,
            duration_hint: None,
            source: None,
        }
    }

    /// Attach a duration hint.
    #[must_use]
    pub fn with_duration_hint(mut self, hint: Option<Duration>) -> Self {
        self.duration_hint = hint;
        self
    }

    /// Record which file this segment was read from.
    #[must_use]
    pub fn with_source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = Some(path.as_ref().to_path_buf());
        self
    }

    /// Returns `true` if the segment has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Human-readable name for diagnostics.
    pub(crate) fn label(&self) -> String {
        self.source
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<in-memory segment>".to_string())
    }
}
