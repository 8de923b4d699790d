//! Geotag writing.
//!
//! [`GeotagWriter`] is the seam between alignment and whatever stores GPS
//! metadata in an image. [`ExifToolWriter`] drives Phil Harvey's ExifTool,
//! writing the EXIF GPS tags in place.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::FlightSrtError;
use crate::record::GeoPosition;

/// Writes a GPS position into an image file.
pub trait GeotagWriter: Send + Sync {
    /// Check that the writer can run at all, before any image is touched.
    ///
    /// # Errors
    ///
    /// Returns [`FlightSrtError::ToolUnavailable`] when a required tool is
    /// missing.
    fn check_available(&self) -> Result<(), FlightSrtError> {
        Ok(())
    }

    /// Store `position` in `image`.
    ///
    /// # Errors
    ///
    /// Returns [`FlightSrtError::GeotagWrite`] (or an I/O error) if the
    /// image could not be tagged. The batch continues with the next image.
    fn write_geotag(&self, image: &Path, position: &GeoPosition) -> Result<(), FlightSrtError>;
}

/// Writes GPS tags with the `exiftool` executable.
#[derive(Debug, Clone)]
pub struct ExifToolWriter {
    program: PathBuf,
}

impl Default for ExifToolWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExifToolWriter {
    /// Use `exiftool` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("exiftool"),
        }
    }

    /// Use a specific `exiftool` binary.
    #[must_use]
    pub fn with_program<P: AsRef<Path>>(mut self, program: P) -> Self {
        self.program = program.as_ref().to_path_buf();
        self
    }

    fn unavailable(reason: String) -> FlightSrtError {
        FlightSrtError::ToolUnavailable {
            tool: "exiftool",
            reason,
        }
    }
}

/// ExifTool arguments that set the GPS tags for `position`.
pub(crate) fn exiftool_arguments(position: &GeoPosition) -> Vec<String> {
    vec![
        "-overwrite_original".to_string(),
        format!("-GPSLatitude={}", position.latitude),
        format!("-GPSLongitude={}", position.longitude),
        format!("-GPSAltitude={}", position.altitude),
        format!("-GPSLatitudeRef={}", position.latitude_ref()),
        format!("-GPSLongitudeRef={}", position.longitude_ref()),
        "-GPSAltitudeRef=0".to_string(),
    ]
}

impl GeotagWriter for ExifToolWriter {
    fn check_available(&self) -> Result<(), FlightSrtError> {
        let resolved = which::which(&self.program).map_err(|error| {
            Self::unavailable(format!(
                "{error}. Please install it from https://exiftool.org/"
            ))
        })?;

        let output = Command::new(&resolved)
            .arg("-ver")
            .output()
            .map_err(|error| Self::unavailable(error.to_string()))?;
        if !output.status.success() {
            return Err(Self::unavailable(format!(
                "`{} -ver` exited with {}",
                resolved.display(),
                output.status
            )));
        }

        log::debug!(
            "Using exiftool {} at {}",
            String::from_utf8_lossy(&output.stdout).trim(),
            resolved.display()
        );
        Ok(())
    }

    fn write_geotag(&self, image: &Path, position: &GeoPosition) -> Result<(), FlightSrtError> {
        let output = Command::new(&self.program)
            .args(exiftool_arguments(position))
            .arg(image)
            .output()
            .map_err(|error| FlightSrtError::GeotagWrite {
                path: image.to_path_buf(),
                reason: error.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(FlightSrtError::GeotagWrite {
                path: image.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
