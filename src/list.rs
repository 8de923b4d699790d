//! Concat list files.
//!
//! A list file names the segments of one flight, in order, one per line:
//!
//! ```text
//! # morning flight
//! file 'DJI_0001.MP4'
//! file 'DJI_0002.MP4'
//! extra/DJI_0003.SRT
//! ```
//!
//! A `file '<media>'` directive (the FFmpeg concat-demuxer syntax, single or
//! double quotes, or unquoted) points at a recording; its telemetry sidecar is
//! the same path with the extension replaced by `.SRT`, or `.srt` if the
//! upper-case file does not exist. Any other non-comment line is a direct
//! telemetry path. Relative paths resolve against the list file's directory.
//! Only media from `file` directives is probed for a duration hint.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::configuration::ConcatOptions;
use crate::error::FlightSrtError;
use crate::parser::parse_telemetry_file;
use crate::probe::{DurationProbe, probe_hint};
use crate::progress::{OperationType, ProgressTracker};
use crate::record::Segment;
use crate::report::Event;
use crate::timeline::{Timeline, TimelineBuilder};

static FILE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^file\s+(?:'([^']+)'|"([^"]+)"|(\S+))\s*$"#).expect("file directive pattern is valid")
});

/// Sidecar extensions, in lookup order.
const SIDECAR_EXTENSIONS: [&str; 2] = ["SRT", "srt"];

/// One meaningful line of a list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEntry {
    /// A `file '<media>'` directive.
    Media(PathBuf),
    /// A direct telemetry path.
    Telemetry(PathBuf),
}

impl ListEntry {
    fn label(&self) -> String {
        match self {
            ListEntry::Media(path) | ListEntry::Telemetry(path) => path.display().to_string(),
        }
    }
}

/// A list entry whose telemetry file exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSource {
    /// Telemetry sidecar to parse.
    pub telemetry: PathBuf,
    /// Media file to probe, when the entry named one.
    pub media: Option<PathBuf>,
}

/// Parse list-file text into entries.
///
/// Blank lines and lines starting with `#` are ignored. Relative paths are
/// joined onto `base_dir`.
pub fn parse_list(text: &str, base_dir: &Path) -> Vec<ListEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match FILE_DIRECTIVE.captures(line) {
            Some(captures) => {
                let media = captures
                    .get(1)
                    .or_else(|| captures.get(2))
                    .or_else(|| captures.get(3))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                ListEntry::Media(base_dir.join(media))
            }
            None => ListEntry::Telemetry(base_dir.join(line)),
        })
        .collect()
}

/// Find the telemetry sidecar next to `media`.
///
/// Tries the upper-case extension first, then lower-case.
pub fn sidecar_for(media: &Path) -> Option<PathBuf> {
    SIDECAR_EXTENSIONS
        .iter()
        .map(|extension| media.with_extension(extension))
        .find(|candidate| candidate.is_file())
}

/// Resolve an entry to an existing telemetry file.
pub fn resolve_entry(entry: &ListEntry) -> Option<SegmentSource> {
    match entry {
        ListEntry::Media(media) => sidecar_for(media).map(|telemetry| SegmentSource {
            telemetry,
            media: Some(media.clone()),
        }),
        ListEntry::Telemetry(path) => path.is_file().then(|| SegmentSource {
            telemetry: path.clone(),
            media: None,
        }),
    }
}

/// Read a list file, resolve every segment and chain them into a timeline.
///
/// Media durations come from `probe`, queried one segment at a time in list
/// order and only for media files that exist. Missing sidecars, unreadable
/// telemetry and empty segments are reported to the options' sink and
/// skipped.
///
/// # Errors
///
/// - [`FlightSrtError::ListFileNotFound`] if `list_path` does not exist.
/// - [`FlightSrtError::FileOpen`] if it cannot be read.
/// - [`FlightSrtError::NoSegments`] if no entry contributes any record.
pub fn concatenate_list<P: AsRef<Path>>(
    list_path: P,
    probe: &dyn DurationProbe,
    options: &ConcatOptions,
) -> Result<Timeline, FlightSrtError> {
    let list_path = list_path.as_ref();
    if !list_path.is_file() {
        return Err(FlightSrtError::ListFileNotFound(list_path.to_path_buf()));
    }

    let text = std::fs::read_to_string(list_path).map_err(|error| FlightSrtError::FileOpen {
        path: list_path.to_path_buf(),
        reason: error.to_string(),
    })?;
    let base_dir = list_path.parent().unwrap_or(Path::new(""));
    let entries = parse_list(&text, base_dir);
    log::debug!("{} entries in {}", entries.len(), list_path.display());

    let mut tracker = ProgressTracker::new(
        Arc::clone(&options.progress),
        OperationType::Concatenation,
        Some(entries.len() as u64),
        options.batch_size,
    );
    let mut builder = TimelineBuilder::new(options);

    for entry in &entries {
        match resolve_entry(entry) {
            Some(source) => {
                if let Some(segment) = load_segment(&source, probe, options) {
                    builder.push_segment(segment);
                } else {
                    builder.note_skipped();
                }
            }
            None => {
                options.sink.on_event(&Event::MissingSidecar {
                    entry: entry.label(),
                });
                builder.note_skipped();
            }
        }
        tracker.advance();
    }
    tracker.finish();

    let timeline = builder.finish();
    if timeline.is_empty() {
        return Err(FlightSrtError::NoSegments {
            list: list_path.to_path_buf(),
            summary: timeline.summary(),
        });
    }
    Ok(timeline)
}

fn load_segment(
    source: &SegmentSource,
    probe: &dyn DurationProbe,
    options: &ConcatOptions,
) -> Option<Segment> {
    let report = match parse_telemetry_file(&source.telemetry) {
        Ok(report) => report,
        Err(error) => {
            options.sink.on_event(&Event::SegmentUnreadable {
                path: source.telemetry.clone(),
                reason: error.to_string(),
            });
            return None;
        }
    };

    for (block_number, reason) in report.skipped {
        options.sink.on_event(&Event::BlockSkipped {
            source: Some(source.telemetry.clone()),
            block_number,
            reason,
        });
    }

    // An empty segment is skipped by the builder; don't waste a probe on it.
    let hint = if report.records.is_empty() {
        None
    } else {
        source
            .media
            .as_deref()
            .filter(|media| media.is_file())
            .and_then(|media| probe_hint(probe, media))
    };

    Some(
        Segment::new(report.records)
            .with_duration_hint(hint)
            .with_source(&source.telemetry),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directives_paths_and_comments() {
        let text = "# flight\n\nfile 'a/DJI_0001.MP4'\nfile \"DJI_0002.MP4\"\nfile DJI_0003.MP4\n  logs/DJI_0004.SRT  \n";
        let entries = parse_list(text, Path::new("/data"));
        assert_eq!(
            entries,
            vec![
                ListEntry::Media(PathBuf::from("/data/a/DJI_0001.MP4")),
                ListEntry::Media(PathBuf::from("/data/DJI_0002.MP4")),
                ListEntry::Media(PathBuf::from("/data/DJI_0003.MP4")),
                ListEntry::Telemetry(PathBuf::from("/data/logs/DJI_0004.SRT")),
            ]
        );
    }

    #[test]
    fn absolute_paths_ignore_base_dir() {
        let entries = parse_list("file '/abs/clip.mp4'", Path::new("/data"));
        assert_eq!(entries, vec![ListEntry::Media(PathBuf::from("/abs/clip.mp4"))]);
    }

    #[test]
    fn path_starting_with_file_is_not_a_directive() {
        let entries = parse_list("files/DJI_0001.SRT", Path::new(""));
        assert_eq!(
            entries,
            vec![ListEntry::Telemetry(PathBuf::from("files/DJI_0001.SRT"))]
        );
    }

    #[test]
    fn sidecar_prefers_upper_case_extension() {
        let directory = tempfile::tempdir().unwrap();
        let media = directory.path().join("DJI_0001.MP4");
        std::fs::write(directory.path().join("DJI_0001.srt"), "x").unwrap();
        assert_eq!(sidecar_for(&media), Some(directory.path().join("DJI_0001.srt")));

        std::fs::write(directory.path().join("DJI_0001.SRT"), "x").unwrap();
        let found = sidecar_for(&media).unwrap();
        // Case-insensitive filesystems may report either; the file must exist.
        assert!(found.is_file());
    }

    #[test]
    fn unresolvable_entries_yield_none() {
        let directory = tempfile::tempdir().unwrap();
        let missing_media = ListEntry::Media(directory.path().join("gone.MP4"));
        let missing_srt = ListEntry::Telemetry(directory.path().join("gone.SRT"));
        assert!(resolve_entry(&missing_media).is_none());
        assert!(resolve_entry(&missing_srt).is_none());
    }
}
