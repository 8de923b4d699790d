//! Media duration probing.
//!
//! A [`DurationProbe`] supplies the authoritative length of a recording so
//! the next segment of a split flight starts exactly where the media ends.
//! Probing is best effort: any failure makes the concatenator fall back to
//! the segment's last telemetry end time.
//!
//! Two probes ship with the crate: [`FfprobeDuration`] runs the `ffprobe`
//! command-line tool, and `FfmpegDuration` (feature `ffmpeg`) opens the
//! container in-process through FFmpeg's libraries. [`NoProbe`] disables
//! probing.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::error::FlightSrtError;

/// Source of media durations.
pub trait DurationProbe: Send + Sync {
    /// Length of the media file at `media`.
    ///
    /// # Errors
    ///
    /// Returns [`FlightSrtError::ProbeFailed`] (or any other error) when the
    /// duration cannot be determined. Callers treat every error as "no hint".
    fn probe_duration(&self, media: &Path) -> Result<Duration, FlightSrtError>;
}

/// Run `probe` and turn failure into `None`, logging the reason.
pub fn probe_hint(probe: &dyn DurationProbe, media: &Path) -> Option<Duration> {
    match probe.probe_duration(media) {
        Ok(duration) => {
            log::debug!("Probed {}: {:?}", media.display(), duration);
            Some(duration)
        }
        Err(error) => {
            log::debug!("Duration probe failed: {error}");
            None
        }
    }
}

/// Never produces a duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProbe;

impl DurationProbe for NoProbe {
    fn probe_duration(&self, media: &Path) -> Result<Duration, FlightSrtError> {
        Err(FlightSrtError::ProbeFailed {
            path: media.to_path_buf(),
            reason: "probing disabled".to_string(),
        })
    }
}

/// Probes durations with the `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct FfprobeDuration {
    program: PathBuf,
}

impl Default for FfprobeDuration {
    fn default() -> Self {
        Self::new()
    }
}

impl FfprobeDuration {
    /// Use `ffprobe` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffprobe"),
        }
    }

    /// Use a specific `ffprobe` binary.
    #[must_use]
    pub fn with_program<P: AsRef<Path>>(mut self, program: P) -> Self {
        self.program = program.as_ref().to_path_buf();
        self
    }

    /// Returns `true` if the configured program can be found.
    pub fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }
}

impl DurationProbe for FfprobeDuration {
    fn probe_duration(&self, media: &Path) -> Result<Duration, FlightSrtError> {
        let failed = |reason: String| FlightSrtError::ProbeFailed {
            path: media.to_path_buf(),
            reason,
        };

        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(media)
            .output()
            .map_err(|error| failed(format!("could not run {}: {error}", self.program.display())))?;

        if !output.status.success() {
            return Err(failed(String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_probe_output(&stdout)
            .ok_or_else(|| failed(format!("unexpected ffprobe output {:?}", stdout.trim())))
    }
}

/// Parse the bare seconds value `ffprobe` prints.
///
/// Zero, negative, non-numeric (such as `N/A`) and unrepresentably large
/// values are rejected.
pub(crate) fn parse_probe_output(output: &str) -> Option<Duration> {
    let seconds: f64 = output.trim().parse().ok()?;
    (seconds > 0.0)
        .then_some(seconds)
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
}

/// Probes durations in-process with FFmpeg's demuxers.
#[cfg(feature = "ffmpeg")]
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegDuration;

#[cfg(feature = "ffmpeg")]
impl DurationProbe for FfmpegDuration {
    fn probe_duration(&self, media: &Path) -> Result<Duration, FlightSrtError> {
        ffmpeg_next::init()?;

        let input_context =
            ffmpeg_next::format::input(&media).map_err(|error| FlightSrtError::ProbeFailed {
                path: media.to_path_buf(),
                reason: error.to_string(),
            })?;

        // Container duration is in AV_TIME_BASE units (microseconds).
        let duration_microseconds = input_context.duration();
        if duration_microseconds > 0 {
            Ok(Duration::from_micros(duration_microseconds as u64))
        } else {
            Err(FlightSrtError::ProbeFailed {
                path: media.to_path_buf(),
                reason: "container reports no duration".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ffprobe_seconds() {
        assert_eq!(parse_probe_output("5.000000\n"), Some(Duration::from_secs(5)));
        assert_eq!(
            parse_probe_output("12.5"),
            Some(Duration::from_millis(12_500))
        );
    }

    #[test]
    fn rejects_unusable_output() {
        assert_eq!(parse_probe_output("N/A"), None);
        assert_eq!(parse_probe_output(""), None);
        assert_eq!(parse_probe_output("0.000000"), None);
        assert_eq!(parse_probe_output("-3"), None);
        assert_eq!(parse_probe_output("NaN"), None);
        assert_eq!(parse_probe_output("inf"), None);
        assert_eq!(parse_probe_output("1e20"), None);
    }

    #[test]
    fn no_probe_always_fails() {
        assert!(probe_hint(&NoProbe, Path::new("clip.MP4")).is_none());
    }

    #[test]
    fn missing_program_is_a_probe_failure() {
        let probe = FfprobeDuration::new().with_program("/nonexistent/ffprobe-for-tests");
        assert!(!probe.is_available());
        assert!(matches!(
            probe.probe_duration(Path::new("clip.MP4")),
            Err(FlightSrtError::ProbeFailed { .. })
        ));
    }
}
