//! Telemetry sidecar parsing.
//!
//! A sidecar is a sequence of blocks separated by one or more blank lines:
//!
//! ```text
//! 1
//! 00:00:00,000 --> 00:00:00,033
//! <font size="28">FrameCnt: 1, DiffTime: 33ms
//! [latitude: 47.6205] [longitude: -122.3493] [altitude: 120.5]</font>
//! ```
//!
//! Parsing is lenient. A block that cannot be read is skipped and the rest
//! of the file is still used; [`parse_blocks`] reports each block's
//! [`BlockOutcome`] so callers can audit what was dropped.
//!
//! # Example
//!
//! ```
//! use flightsrt::parse_telemetry;
//!
//! let text = "1\n00:00:00,000 --> 00:00:01,000\n[latitude: 1.5] [longitude: 2.5]\n\nbogus\n";
//! let report = parse_telemetry(text);
//! assert_eq!(report.records.len(), 1);
//! assert_eq!(report.skipped.len(), 1);
//! assert_eq!(report.records[0].altitude, Some(0.0));
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::FlightSrtError;
use crate::record::TelemetryRecord;
use crate::timestamp::parse_timestamp;

static BLOCK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("block separator pattern is valid"));

static TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3})\s*-->\s*([0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3})")
        .expect("time range pattern is valid")
});

static LATITUDE: LazyLock<Regex> = LazyLock::new(|| coordinate_pattern("latitude"));
static LONGITUDE: LazyLock<Regex> = LazyLock::new(|| coordinate_pattern("longitude"));
static ALTITUDE: LazyLock<Regex> = LazyLock::new(|| coordinate_pattern("altitude"));

/// Matches `key: value` and `[key: value]`, case-insensitively.
fn coordinate_pattern(key: &str) -> Regex {
    Regex::new(&format!(r"(?i)\[?{key}\s*:\s*([-+]?[0-9]+\.?[0-9]*)"))
        .expect("coordinate pattern is valid")
}

/// Why a block was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkipReason {
    /// The block has fewer than three lines (index, time range, payload).
    TooFewLines(usize),
    /// The first line is not a non-negative integer.
    InvalidIndex(String),
    /// The second line is not an `HH:MM:SS,mmm --> HH:MM:SS,mmm` range.
    InvalidTimeRange(String),
    /// The range ends before it starts.
    InvertedTimeRange(String),
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SkipReason::TooFewLines(count) => write!(f, "expected at least 3 lines, found {count}"),
            SkipReason::InvalidIndex(line) => write!(f, "invalid index line {line:?}"),
            SkipReason::InvalidTimeRange(line) => write!(f, "invalid time range {line:?}"),
            SkipReason::InvertedTimeRange(line) => write!(f, "time range ends before it starts {line:?}"),
        }
    }
}

/// The result of parsing a single block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    /// The block produced a record.
    Parsed(TelemetryRecord),
    /// The block was dropped.
    Skipped {
        /// 1-based position of the block in the text.
        block_number: usize,
        /// Why it was dropped.
        reason: SkipReason,
    },
}

/// Records parsed from one text, plus the blocks that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    /// Records in source order.
    pub records: Vec<TelemetryRecord>,
    /// `(block_number, reason)` for every dropped block.
    pub skipped: Vec<(usize, SkipReason)>,
}

impl ParseReport {
    /// Number of blocks seen, parsed or not.
    pub fn block_count(&self) -> usize {
        self.records.len() + self.skipped.len()
    }
}

/// Split `text` into blocks and parse each one.
///
/// Whitespace-only input yields no outcomes. Outcomes are returned in
/// source order.
pub fn parse_blocks(text: &str) -> Vec<BlockOutcome> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    BLOCK_SEPARATOR
        .split(trimmed)
        .enumerate()
        .map(|(position, block)| match parse_block(block) {
            Ok(record) => BlockOutcome::Parsed(record),
            Err(reason) => BlockOutcome::Skipped {
                block_number: position + 1,
                reason,
            },
        })
        .collect()
}

/// Parse `text` into records, collecting skipped blocks on the side.
pub fn parse_telemetry(text: &str) -> ParseReport {
    let mut report = ParseReport::default();
    for outcome in parse_blocks(text) {
        match outcome {
            BlockOutcome::Parsed(record) => report.records.push(record),
            BlockOutcome::Skipped {
                block_number,
                reason,
            } => report.skipped.push((block_number, reason)),
        }
    }
    report
}

/// Read and parse a telemetry file.
///
/// # Errors
///
/// Returns [`FlightSrtError::FileOpen`] if the file cannot be read as UTF-8
/// text. Malformed blocks are not errors.
pub fn parse_telemetry_file<P: AsRef<Path>>(path: P) -> Result<ParseReport, FlightSrtError> {
    let path = path.as_ref();
    log::debug!("Parsing telemetry file: {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|error| FlightSrtError::FileOpen {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    Ok(parse_telemetry(&text))
}

/// Parse one block (without surrounding blank lines).
///
/// The payload is every line after the time range, joined with `\n`.
pub fn parse_block(block: &str) -> Result<TelemetryRecord, SkipReason> {
    let lines: Vec<&str> = block.trim().lines().collect();
    if lines.len() < 3 {
        return Err(SkipReason::TooFewLines(lines.len()));
    }

    let sequence_index: u64 = lines[0]
        .trim()
        .parse()
        .map_err(|_| SkipReason::InvalidIndex(lines[0].to_string()))?;

    let invalid_range = || SkipReason::InvalidTimeRange(lines[1].to_string());
    let captures = TIME_RANGE.captures(lines[1]).ok_or_else(invalid_range)?;
    let start_offset = parse_timestamp(&captures[1]).ok_or_else(invalid_range)?;
    let end_offset = parse_timestamp(&captures[2]).ok_or_else(invalid_range)?;
    if start_offset > end_offset {
        return Err(SkipReason::InvertedTimeRange(lines[1].to_string()));
    }

    let payload = lines[2..].join("\n");
    let latitude = first_value(&LATITUDE, &payload);
    let longitude = first_value(&LONGITUDE, &payload);
    let altitude = match (latitude, longitude) {
        (Some(_), Some(_)) => first_value(&ALTITUDE, &payload).or(Some(0.0)),
        _ => first_value(&ALTITUDE, &payload),
    };

    Ok(TelemetryRecord {
        sequence_index,
        start_offset,
        end_offset,
        payload,
        latitude,
        longitude,
        altitude,
    })
}

fn first_value(pattern: &Regex, payload: &str) -> Option<f64> {
    pattern
        .captures(payload)
        .and_then(|captures| captures[1].parse().ok())
}
