//! # flightsrt
//!
//! Drone telemetry sidecars for split recordings: chain them into one
//! track and geotag the stills extracted from the video.
//!
//! Drones write a subtitle-format sidecar next to every video segment, one
//! block per frame, carrying a time range and a payload with GPS values. A
//! long flight is split across several files. `flightsrt` provides:
//!
//! - **Parsing**: lenient, block-by-block, with an auditable record of
//!   every dropped block ([`parse_blocks`], [`parse_telemetry`])
//! - **Concatenation**: offset chaining across segments, using the media
//!   duration when a [`DurationProbe`] can supply it ([`concatenate`],
//!   [`concatenate_list`])
//! - **Rendering**: back to sidecar text with indices renumbered `1..=N`
//!   ([`render_records`])
//! - **Alignment**: nearest-record lookup for frames extracted at a fixed
//!   cadence ([`align_frames`])
//! - **Geotagging**: aligned positions written through a [`GeotagWriter`]
//!   such as [`ExifToolWriter`] ([`tag_directory`])
//! - **Validation**: a readable report on a sidecar's health
//!   ([`validate_telemetry`])
//!
//! ## Quick Start
//!
//! ### Merge the sidecars of a split flight
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use flightsrt::{ConcatOptions, FfprobeDuration, LogSink, concatenate_list};
//!
//! let options = ConcatOptions::new().with_sink(Arc::new(LogSink));
//! let timeline = concatenate_list("flight.txt", &FfprobeDuration::new(), &options)?;
//! timeline.save("flight.SRT")?;
//! # Ok::<(), flightsrt::FlightSrtError>(())
//! ```
//!
//! ### Align frames without touching any file
//!
//! ```
//! use flightsrt::{AlignmentParams, align_frames, parse_telemetry};
//!
//! let report = parse_telemetry("1\n00:00:00,000 --> 00:00:00,033\n[latitude: 1.0] [longitude: 2.0]\n");
//! let params = AlignmentParams::new(30.0, 1.0)?;
//! let assignments = align_frames(3, &report.records, &params);
//! assert!(assignments.iter().all(|a| a.record().is_some()));
//! # Ok::<(), flightsrt::FlightSrtError>(())
//! ```
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ffmpeg` | `FfmpegDuration` probes media length in-process via `ffmpeg-next` |
//! | `rayon` | `align_frames_parallel()` spreads per-frame lookups across rayon threads |
//! | `full` | Enables all of the above |

pub mod align;
pub mod configuration;
pub mod error;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
pub mod frames;
pub mod geotag;
pub mod list;
#[cfg(feature = "rayon")]
pub mod parallel;
pub mod parser;
pub mod probe;
pub mod progress;
pub mod record;
pub mod render;
pub mod report;
pub mod tag;
pub mod timeline;
pub mod timestamp;
pub mod validation;

pub use align::{AlignmentParams, FrameAssignment, NearestRecord, align_frames};
pub use configuration::{ConcatOptions, TagOptions};
pub use error::FlightSrtError;
#[cfg(feature = "ffmpeg")]
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frames::list_frames;
pub use geotag::{ExifToolWriter, GeotagWriter};
pub use list::{ListEntry, SegmentSource, concatenate_list, parse_list, resolve_entry, sidecar_for};
#[cfg(feature = "rayon")]
pub use parallel::align_frames_parallel;
pub use parser::{
    BlockOutcome, ParseReport, SkipReason, parse_block, parse_blocks, parse_telemetry,
    parse_telemetry_file,
};
#[cfg(feature = "ffmpeg")]
pub use probe::FfmpegDuration;
pub use probe::{DurationProbe, FfprobeDuration, NoProbe, probe_hint};
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use record::{GeoPosition, Segment, TelemetryRecord};
pub use render::{render_records, save_records, write_records};
pub use report::{BatchSummary, CollectingSink, Event, EventSink, LogSink, NoOpSink};
pub use tag::{tag_directory, tag_frames};
pub use timeline::{Timeline, TimelineBuilder, concatenate};
pub use validation::{ValidationReport, validate_telemetry};
