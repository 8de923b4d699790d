//! Telemetry rendering.
//!
//! Serializes records back to sidecar text. Indices are always reassigned
//! as `1..=N` in input order; whatever `sequence_index` the records carry is
//! ignored. Payloads are written verbatim.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::FlightSrtError;
use crate::record::TelemetryRecord;
use crate::timestamp::format_timestamp;

/// Write records as sidecar blocks to any writer.
///
/// Each block is the index line, the time range line, the payload and a
/// trailing blank line.
pub fn write_records<W: Write>(writer: &mut W, records: &[TelemetryRecord]) -> io::Result<()> {
    for (position, record) in records.iter().enumerate() {
        writeln!(writer, "{}", position + 1)?;
        writeln!(
            writer,
            "{} --> {}",
            format_timestamp(record.start_offset),
            format_timestamp(record.end_offset),
        )?;
        writeln!(writer, "{}", record.payload)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Render records to a string.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use flightsrt::{TelemetryRecord, render_records};
///
/// let record = TelemetryRecord::new(42, Duration::ZERO, Duration::from_millis(33), "hello");
/// assert_eq!(
///     render_records(&[record]),
///     "1\n00:00:00,000 --> 00:00:00,033\nhello\n\n"
/// );
/// ```
pub fn render_records(records: &[TelemetryRecord]) -> String {
    let mut output = Vec::new();
    // Writing into a Vec<u8> cannot fail.
    let _ = write_records(&mut output, records);
    String::from_utf8(output).unwrap_or_default()
}

/// Render records and write them to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`FlightSrtError::IoError`] if the directory or file cannot be
/// written.
pub fn save_records<P: AsRef<Path>>(path: P, records: &[TelemetryRecord]) -> Result<(), FlightSrtError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    log::debug!("Writing {} records to {}", records.len(), path.display());
    fs::write(path, render_records(records))?;
    Ok(())
}
