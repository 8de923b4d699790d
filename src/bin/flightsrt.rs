use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use flightsrt::{
    AlignmentParams, BatchSummary, ConcatOptions, DurationProbe, ExifToolWriter, FfprobeDuration,
    FlightSrtError, LogSink, NoProbe, ProgressCallback, ProgressInfo, TagOptions, Timeline,
    concatenate_list, parse_telemetry_file, tag_directory, validate_telemetry,
};

#[cfg(feature = "ffmpeg")]
use flightsrt::{FfmpegDuration, FfmpegLogLevel};

const CLI_AFTER_HELP: &str = "Examples:\n  flightsrt concat --input flight.txt --output flight.SRT\n  flightsrt tag --telemetry flight.SRT --frames-dir frames --fps-original 29.97 --extension jpg --fps-extracted 1 --progress\n  flightsrt inspect DJI_0001.SRT --json\n  flightsrt completions zsh > _flightsrt";

#[derive(Debug, Parser)]
#[command(
    name = "flightsrt",
    version,
    about = "Concatenate drone SRT telemetry and geotag extracted frames",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while tagging.
    #[arg(long, global = true)]
    progress: bool,

    /// Print results as machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Media duration provider (auto, ffprobe, ffmpeg, none).
    #[arg(long, global = true, default_value = "auto")]
    probe: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Chain the telemetry of a split flight into one file.
    #[command(
        about = "Concatenate telemetry segments",
        after_help = "List file lines are either a telemetry path or file '<media>'.\nLines starting with # are comments.\n\nExamples:\n  flightsrt concat --input flight.txt --output merged/flight.SRT"
    )]
    Concat {
        /// List file naming the segments in order.
        #[arg(short, long)]
        input: PathBuf,
        /// Output telemetry path.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write GPS positions into extracted frames.
    #[command(
        about = "Geotag extracted frames",
        after_help = "Examples:\n  flightsrt tag --telemetry flight.SRT --frames-dir frames --fps-original 30 --extension jpg --fps-extracted 1"
    )]
    Tag {
        /// Telemetry file covering the whole recording.
        #[arg(long)]
        telemetry: PathBuf,
        /// Directory holding the extracted frames.
        #[arg(long)]
        frames_dir: PathBuf,
        /// Frame rate of the source video.
        #[arg(long)]
        fps_original: f64,
        /// Extension of the frame files (jpg, png, ...).
        #[arg(long)]
        extension: String,
        /// Rate at which frames were extracted.
        #[arg(long)]
        fps_extracted: f64,
        /// Report progress every N frames.
        #[arg(long, default_value_t = 10)]
        batch_size: u64,
    },

    /// Parse a telemetry file and report on its health.
    #[command(
        about = "Inspect a telemetry file",
        after_help = "Examples:\n  flightsrt inspect DJI_0001.SRT\n  flightsrt inspect DJI_0001.SRT --json"
    )]
    Inspect {
        /// Telemetry file path.
        path: PathBuf,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeMode {
    Auto,
    Ffprobe,
    Ffmpeg,
    None,
}

impl FromStr for ProbeMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Ok(ProbeMode::Auto),
            "ffprobe" => Ok(ProbeMode::Ffprobe),
            "ffmpeg" | "libav" => Ok(ProbeMode::Ffmpeg),
            "none" | "off" => Ok(ProbeMode::None),
            other => Err(format!("unsupported --probe: {other}")),
        }
    }
}

fn build_probe(mode: ProbeMode) -> Result<Box<dyn DurationProbe>, Box<dyn std::error::Error>> {
    match mode {
        ProbeMode::None => Ok(Box::new(NoProbe)),
        ProbeMode::Ffprobe => Ok(Box::new(FfprobeDuration::new())),
        #[cfg(feature = "ffmpeg")]
        ProbeMode::Ffmpeg => {
            flightsrt::set_ffmpeg_log_level(FfmpegLogLevel::Error);
            Ok(Box::new(FfmpegDuration))
        }
        #[cfg(not(feature = "ffmpeg"))]
        ProbeMode::Ffmpeg => Err("--probe ffmpeg requires building with the `ffmpeg` feature".into()),
        ProbeMode::Auto => {
            #[cfg(feature = "ffmpeg")]
            {
                flightsrt::set_ffmpeg_log_level(FfmpegLogLevel::Error);
                Ok(Box::new(FfmpegDuration))
            }
            #[cfg(not(feature = "ffmpeg"))]
            {
                let ffprobe = FfprobeDuration::new();
                if ffprobe.is_available() {
                    Ok(Box::new(ffprobe))
                } else {
                    warn("ffprobe not found; segment offsets will come from the telemetry itself");
                    Ok(Box::new(NoProbe))
                }
            }
        }
    }
}

fn default_log_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

fn warn(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Chain the segments named by `input` and write them to `output`,
/// replacing any file already there.
fn write_concatenation(
    input: &Path,
    output: &Path,
    probe: &dyn DurationProbe,
) -> Result<Timeline, FlightSrtError> {
    let options = ConcatOptions::new().with_sink(Arc::new(LogSink));
    let timeline = concatenate_list(input, probe, &options)?;
    if output.exists() {
        log::info!("Replacing {}", output.display());
    }
    timeline.save(output)?;
    Ok(timeline)
}

fn print_segment_summary(summary: &BatchSummary, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(&summary_json("concat", summary))?);
    } else {
        println!("Segments: {summary}");
    }
    Ok(())
}

fn summary_json(command: &str, summary: &BatchSummary) -> serde_json::Value {
    json!({
        "command": command,
        "processed": summary.processed,
        "skipped": summary.skipped,
        "failed": summary.failed,
    })
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        if let Some(remaining) = info.estimated_remaining {
            self.bar.set_message(format!("~{}s left", remaining.as_secs()));
        }
        if info.total.is_some_and(|total| info.current >= total) {
            self.bar.finish_and_clear();
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(cli.global.verbose)),
    )
    .init();

    match cli.command {
        Commands::Concat { input, output } => {
            let probe = build_probe(cli.global.probe.parse()?)?;

            let result = write_concatenation(&input, &output, probe.as_ref());
            if let Err(FlightSrtError::NoSegments { summary, .. }) = &result {
                print_segment_summary(summary, cli.global.json)?;
            }
            let timeline = result?;

            let summary = timeline.summary();
            if cli.global.json {
                let mut payload = summary_json("concat", &summary);
                payload["records"] = json!(timeline.len());
                payload["output"] = json!(output.display().to_string());
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Segments: {summary}");
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!("Wrote {} record(s) to {}", timeline.len(), output.display()).green()
                );
            }
        }
        Commands::Tag {
            telemetry,
            frames_dir,
            fps_original,
            extension,
            fps_extracted,
            batch_size,
        } => {
            let params = AlignmentParams::new(fps_original, fps_extracted)?;

            let mut options = TagOptions::new()
                .with_sink(Arc::new(LogSink))
                .with_batch_size(batch_size);
            if cli.global.progress {
                options = options.with_progress(Arc::new(TerminalProgress::new()));
            }

            let summary = tag_directory(
                &telemetry,
                &frames_dir,
                &extension,
                &params,
                &ExifToolWriter::new(),
                &options,
            )?;

            if cli.global.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary_json("tag", &summary))?
                );
            } else {
                println!("Frames: {summary}");
                if summary.failed > 0 {
                    warn(&format!("{} frame(s) could not be tagged", summary.failed));
                } else {
                    println!(
                        "{} {}",
                        "success:".green().bold(),
                        format!("Tagged {} frame(s) in {}", summary.processed, frames_dir.display())
                            .green()
                    );
                }
            }
        }
        Commands::Inspect { path } => {
            let parsed = parse_telemetry_file(&path)?;
            let report = validate_telemetry(&parsed);
            let valid = report.is_valid();
            if cli.global.json {
                let payload = json!({
                    "path": path.display().to_string(),
                    "blocks": parsed.block_count(),
                    "records": parsed.records.len(),
                    "skipped": parsed
                        .skipped
                        .iter()
                        .map(|(block, reason)| json!({ "block": block, "reason": reason.to_string() }))
                        .collect::<Vec<_>>(),
                    "info": report.info,
                    "warnings": report.warnings,
                    "errors": report.errors,
                    "valid": valid,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print!("{report}");
            }
            if !valid {
                return Err(format!("{} is not usable telemetry", path.display()).into());
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "flightsrt", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
