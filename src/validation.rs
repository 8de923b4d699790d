//! Telemetry validation.
//!
//! [`validate_telemetry`] inspects a parsed sidecar and returns a
//! [`ValidationReport`] describing its contents and anything that will
//! degrade concatenation or alignment.
//!
//! # Example
//!
//! ```
//! use flightsrt::{parse_telemetry, validate_telemetry};
//!
//! let report = validate_telemetry(&parse_telemetry(
//!     "1\n00:00:00,000 --> 00:00:01,000\n[latitude: 1.0] [longitude: 2.0]\n\n\
//!      3\n00:00:01,000 --> 00:00:02,000\nno fix\n",
//! ));
//! assert!(report.is_valid());
//! assert_eq!(report.warnings.len(), 2);
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::parser::ParseReport;
use crate::timestamp::format_timestamp;

/// Summary of telemetry validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Non-fatal issues that may affect concatenation or alignment.
    pub warnings: Vec<String>,
    /// Fatal issues: the telemetry cannot be used at all.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found.
    ///
    /// Warnings do not affect this result.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of entries (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Run validation checks over a parse result.
pub fn validate_telemetry(parsed: &ParseReport) -> ValidationReport {
    let mut report = ValidationReport::default();
    let records = &parsed.records;

    // ── Blocks ─────────────────────────────────────────────────────
    report.info.push(format!(
        "{} blocks, {} records",
        parsed.block_count(),
        records.len()
    ));
    for (block_number, reason) in &parsed.skipped {
        report
            .warnings
            .push(format!("Block {block_number} skipped: {reason}"));
    }

    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        report
            .errors
            .push("No telemetry records could be parsed".to_string());
        return report;
    };

    report.info.push(format!(
        "Span: {} --> {}",
        format_timestamp(first.start_offset),
        format_timestamp(last.end_offset)
    ));

    // ── GPS ────────────────────────────────────────────────────────
    let with_position = records.iter().filter(|r| r.has_position()).count();
    report
        .info
        .push(format!("{with_position} records with GPS position"));
    if with_position == 0 {
        report
            .warnings
            .push("No record carries a GPS position; frames cannot be geotagged".to_string());
    } else if with_position < records.len() {
        report.warnings.push(format!(
            "{} records without GPS position",
            records.len() - with_position
        ));
    }

    // ── Ordering ───────────────────────────────────────────────────
    let mut unsorted = 0usize;
    let mut duplicates = 0usize;
    let mut gaps = 0usize;
    let mut rewinds = 0usize;
    for pair in records.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        match next.sequence_index.cmp(&previous.sequence_index) {
            std::cmp::Ordering::Less => unsorted += 1,
            std::cmp::Ordering::Equal => duplicates += 1,
            std::cmp::Ordering::Greater if next.sequence_index - previous.sequence_index > 1 => gaps += 1,
            std::cmp::Ordering::Greater => {}
        }
        if next.start_offset < previous.start_offset {
            rewinds += 1;
        }
    }

    if unsorted > 0 {
        report.warnings.push(format!(
            "Sequence indices decrease {unsorted} time(s); alignment falls back to a linear scan"
        ));
    }
    if duplicates > 0 {
        report
            .warnings
            .push(format!("{duplicates} repeated sequence index(es)"));
    }
    if gaps > 0 {
        report
            .warnings
            .push(format!("{gaps} gap(s) in sequence indices"));
    }
    if rewinds > 0 {
        report
            .warnings
            .push(format!("Start offsets go backwards {rewinds} time(s)"));
    }
    if first.sequence_index != 1 {
        report.info.push(format!(
            "First sequence index is {}",
            first.sequence_index
        ));
    }

    report
}
