//! SubRip-style timestamps.
//!
//! Telemetry sidecars use the `HH:MM:SS,mmm` form: two-digit hours, minutes
//! and seconds separated by colons, then a comma and exactly three digits of
//! milliseconds. Offsets are carried as [`Duration`] everywhere else in the
//! crate.

use std::time::Duration;

/// Parse an `HH:MM:SS,mmm` timestamp.
///
/// The fractional field must be exactly three digits and is read as
/// milliseconds. Minute and second fields are not range-checked, so
/// `00:75:00,000` reads as 75 minutes. Returns `None` for anything that is
/// not fixed-width.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// let offset = flightsrt::timestamp::parse_timestamp("00:01:02,345").unwrap();
/// assert_eq!(offset, Duration::from_millis(62_345));
/// ```
pub fn parse_timestamp(value: &str) -> Option<Duration> {
    let (clock, millis) = value.trim().split_once(',')?;
    if millis.len() != 3 || !millis.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut fields = clock.split(':');
    let hours = parse_two_digit(fields.next()?)?;
    let minutes = parse_two_digit(fields.next()?)?;
    let seconds = parse_two_digit(fields.next()?)?;
    if fields.next().is_some() {
        return None;
    }

    let millis: u64 = millis.parse().ok()?;
    Some(Duration::from_millis(
        ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis,
    ))
}

fn parse_two_digit(field: &str) -> Option<u64> {
    if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Format a duration as `HH:MM:SS,mmm`.
///
/// Sub-millisecond precision is truncated, never rounded. Hours are padded
/// to two digits and grow past that if needed.
pub fn format_timestamp(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = duration.subsec_millis();
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Truncate a duration to whole milliseconds.
pub fn truncate_to_millis(duration: Duration) -> Duration {
    Duration::new(duration.as_secs(), duration.subsec_millis() * 1_000_000)
}
