//! Geotagging integration tests.
//!
//! A recording writer replaces ExifTool so batches can be checked without
//! touching real images.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use flightsrt::{
    AlignmentParams, BatchSummary, CancellationToken, CollectingSink, Event, FlightSrtError,
    GeoPosition, GeotagWriter, TagOptions, parse_telemetry, tag_directory, tag_frames,
};

/// Records every write; fails for the listed file names.
#[derive(Default)]
struct RecordingWriter {
    failing: HashSet<String>,
    unavailable: bool,
    writes: Mutex<Vec<(PathBuf, GeoPosition)>>,
}

impl RecordingWriter {
    fn failing_on(name: &str) -> Self {
        Self {
            failing: HashSet::from([name.to_string()]),
            ..Self::default()
        }
    }

    fn writes(&self) -> Vec<(PathBuf, GeoPosition)> {
        self.writes.lock().unwrap().clone()
    }
}

impl GeotagWriter for RecordingWriter {
    fn check_available(&self) -> Result<(), FlightSrtError> {
        if self.unavailable {
            return Err(FlightSrtError::ToolUnavailable {
                tool: "recorder",
                reason: "switched off".to_string(),
            });
        }
        Ok(())
    }

    fn write_geotag(&self, image: &Path, position: &GeoPosition) -> Result<(), FlightSrtError> {
        let name = image.file_name().unwrap().to_string_lossy().into_owned();
        if self.failing.contains(&name) {
            return Err(FlightSrtError::GeotagWrite {
                path: image.to_path_buf(),
                reason: "read-only".to_string(),
            });
        }
        self.writes
            .lock()
            .unwrap()
            .push((image.to_path_buf(), *position));
        Ok(())
    }
}

/// Three records a second apart at 1 fps, the middle one without a fix.
fn telemetry() -> String {
    "1\n00:00:00,000 --> 00:00:01,000\n[latitude: -33.5] [longitude: 151.2] [altitude: 40.0]\n\n\
     2\n00:00:01,000 --> 00:00:02,000\nno fix\n\n\
     3\n00:00:02,000 --> 00:00:03,000\n[latitude: -33.6] [longitude: 151.3]\n"
        .to_string()
}

fn frame_dir(names: &[&str]) -> tempfile::TempDir {
    let directory = tempfile::tempdir().unwrap();
    for name in names {
        fs::write(directory.path().join(name), b"").unwrap();
    }
    directory
}

fn frames(directory: &Path, names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(|name| directory.join(name)).collect()
}

// ── tag_frames ─────────────────────────────────────────────────────

#[test]
fn records_without_position_are_not_aligned_against() {
    let records = parse_telemetry(&telemetry()).records;
    let params = AlignmentParams::new(1.0, 1.0).unwrap();
    let writer = RecordingWriter::default();
    let paths = frames(Path::new("/frames"), &["f1.jpg", "f2.jpg", "f3.jpg"]);

    let summary = tag_frames(&records, &paths, &params, &writer, &TagOptions::new()).unwrap();

    assert_eq!(summary.processed, 3);
    let latitudes: Vec<f64> = writer.writes().iter().map(|(_, p)| p.latitude).collect();
    // Record 2 has no fix: frame 2 falls between records 1 and 3 and takes the lower.
    assert_eq!(latitudes, vec![-33.5, -33.5, -33.6]);

    let last = writer.writes()[2].1;
    assert_eq!(last.altitude, 0.0);
    assert_eq!(last.latitude_ref(), 'S');
    assert_eq!(last.longitude_ref(), 'E');
    assert_eq!(writer.writes()[0].1.altitude, 40.0);
}

#[test]
fn write_failures_are_counted_and_reported() {
    let records = parse_telemetry(&telemetry()).records;
    let params = AlignmentParams::new(1.0, 1.0).unwrap();
    let writer = RecordingWriter::failing_on("f2.jpg");
    let sink = Arc::new(CollectingSink::new());
    let options = TagOptions::new().with_sink(sink.clone());
    let paths = frames(Path::new("/frames"), &["f1.jpg", "f2.jpg", "f3.jpg"]);

    let summary = tag_frames(&records, &paths, &params, &writer, &options).unwrap();

    assert_eq!(
        summary,
        BatchSummary {
            processed: 2,
            skipped: 0,
            failed: 1
        }
    );
    let failures: Vec<Event> = sink.events().into_iter().filter(Event::is_failure).collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(&failures[0], Event::WriteFailed { frame, .. } if frame.ends_with("f2.jpg")));
}

#[test]
fn frames_without_telemetry_are_skipped() {
    let params = AlignmentParams::new(30.0, 1.0).unwrap();
    let writer = RecordingWriter::default();
    let sink = Arc::new(CollectingSink::new());
    let paths = frames(Path::new("/frames"), &["f1.jpg", "f2.jpg"]);

    let summary = tag_frames(&[], &paths, &params, &writer, &TagOptions::new().with_sink(sink.clone()))
        .unwrap();

    assert_eq!(summary.skipped, 2);
    assert!(writer.writes().is_empty());
    assert_eq!(sink.events().len(), 2);
}

#[test]
fn cancelled_batch_stops_before_writing() {
    let records = parse_telemetry(&telemetry()).records;
    let params = AlignmentParams::new(1.0, 1.0).unwrap();
    let writer = RecordingWriter::default();
    let token = CancellationToken::new();
    token.cancel();
    let paths = frames(Path::new("/frames"), &["f1.jpg"]);

    let result = tag_frames(
        &records,
        &paths,
        &params,
        &writer,
        &TagOptions::new().with_cancellation(token),
    );

    assert!(matches!(result, Err(FlightSrtError::Cancelled)));
    assert!(writer.writes().is_empty());
}

// ── tag_directory ──────────────────────────────────────────────────

#[test]
fn tags_every_matching_frame_in_name_order() {
    let work = tempfile::tempdir().unwrap();
    let telemetry_path = work.path().join("flight.SRT");
    fs::write(&telemetry_path, telemetry()).unwrap();
    let directory = frame_dir(&["frame_0002.jpg", "frame_0001.jpg", "frame_0001.png"]);
    let params = AlignmentParams::new(1.0, 1.0).unwrap();
    let writer = RecordingWriter::default();

    let summary = tag_directory(
        &telemetry_path,
        directory.path(),
        ".jpg",
        &params,
        &writer,
        &TagOptions::new(),
    )
    .unwrap();

    assert_eq!(summary.total(), 2);
    let written: Vec<PathBuf> = writer.writes().into_iter().map(|(path, _)| path).collect();
    assert!(written[0].ends_with("frame_0001.jpg"));
    assert!(written[1].ends_with("frame_0002.jpg"));
}

#[test]
fn malformed_telemetry_blocks_are_reported() {
    let work = tempfile::tempdir().unwrap();
    let telemetry_path = work.path().join("flight.SRT");
    fs::write(&telemetry_path, "garbage\n\n".to_string() + &telemetry()).unwrap();
    let directory = frame_dir(&["frame_0001.jpg"]);
    let params = AlignmentParams::new(1.0, 1.0).unwrap();
    let sink = Arc::new(CollectingSink::new());

    let summary = tag_directory(
        &telemetry_path,
        directory.path(),
        "jpg",
        &params,
        &RecordingWriter::default(),
        &TagOptions::new().with_sink(sink.clone()),
    )
    .unwrap();

    assert_eq!(summary.processed, 1);
    let skipped: Vec<(Option<PathBuf>, usize)> = sink
        .events()
        .into_iter()
        .filter_map(|event| match event {
            Event::BlockSkipped {
                source,
                block_number,
                ..
            } => Some((source, block_number)),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec![(Some(telemetry_path.clone()), 1)]);
}

#[test]
fn telemetry_without_gps_is_fatal() {
    let work = tempfile::tempdir().unwrap();
    let telemetry_path = work.path().join("flight.SRT");
    fs::write(&telemetry_path, "1\n00:00:00,000 --> 00:00:01,000\nno fix\n").unwrap();
    let directory = frame_dir(&["a.jpg"]);
    let params = AlignmentParams::new(30.0, 1.0).unwrap();

    let result = tag_directory(
        &telemetry_path,
        directory.path(),
        "jpg",
        &params,
        &RecordingWriter::default(),
        &TagOptions::new(),
    );
    assert!(matches!(result, Err(FlightSrtError::EmptyTelemetry { .. })));
}

#[test]
fn empty_frame_directory_is_fatal() {
    let work = tempfile::tempdir().unwrap();
    let telemetry_path = work.path().join("flight.SRT");
    fs::write(&telemetry_path, telemetry()).unwrap();
    let directory = frame_dir(&["a.png"]);
    let params = AlignmentParams::new(30.0, 1.0).unwrap();

    let error = tag_directory(
        &telemetry_path,
        directory.path(),
        "jpg",
        &params,
        &RecordingWriter::default(),
        &TagOptions::new(),
    )
    .unwrap_err();
    assert!(error.to_string().starts_with("No .jpg files found in"));
}

#[test]
fn unavailable_writer_is_fatal() {
    let work = tempfile::tempdir().unwrap();
    let telemetry_path = work.path().join("flight.SRT");
    fs::write(&telemetry_path, telemetry()).unwrap();
    let directory = frame_dir(&["a.jpg"]);
    let params = AlignmentParams::new(30.0, 1.0).unwrap();
    let writer = RecordingWriter {
        unavailable: true,
        ..RecordingWriter::default()
    };

    let result = tag_directory(
        &telemetry_path,
        directory.path(),
        "jpg",
        &params,
        &writer,
        &TagOptions::new(),
    );
    assert!(matches!(result, Err(FlightSrtError::ToolUnavailable { .. })));
}
