use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use retro_target::{
    FrameLoop, ImageSequenceSource, JsonLinesTelemetry, LoggingExposure, OpenRetry,
    SessionConfig, SharedConfig, TargetDetector,
};

#[cfg(feature = "tracing")]
use retro_target::core::init_tracing;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;
#[cfg(not(feature = "tracing"))]
use retro_target::core::{init_with_level, level_from_env};

#[derive(Parser, Debug)]
#[command(name = "retro-target", version, about = "Retro-reflective target tracker")]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace). Overrides
    /// RETRO_TARGET_LOG, or RUST_LOG when built with tracing.
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect the target in one image and print the detection as JSON.
    Detect(DetectArgs),
    /// Run the frame loop over replayed images, telemetry as JSON lines on stdout.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct DetectArgs {
    image: PathBuf,
    /// Parameter file (`key = value`) or `.json` config.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Image files or directories of images, replayed in order.
    #[arg(long, required = true, num_args = 1..)]
    frames: Vec<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Hold the remote `autoCam` flag high for the whole run.
    #[arg(long)]
    auto: bool,
    /// Give up opening the source after this many attempts (default: never).
    #[arg(long)]
    open_attempts: Option<usize>,
    #[arg(long, default_value_t = 2000)]
    backoff_ms: u64,
}

fn load_config(path: Option<&PathBuf>) -> Result<SessionConfig, retro_target::ConfigError> {
    match path {
        Some(path) => SessionConfig::load_or_default(path),
        None => Ok(SessionConfig::default()),
    }
}

fn detect(args: &DetectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = load_config(args.config.as_ref())?;
    let frame = image::open(&args.image)?.to_rgb8();
    let detection = TargetDetector::new(cfg.detector_params()).detect(&frame);
    println!("{}", serde_json::to_string_pretty(&detection)?);
    Ok(())
}

fn run(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = load_config(args.config.as_ref())?;
    let source = ImageSequenceSource::from_paths(&args.frames)?;
    let telemetry = JsonLinesTelemetry::new(std::io::stdout().lock(), args.auto);

    let mut tracker = FrameLoop::new(
        source,
        LoggingExposure::default(),
        telemetry,
        SharedConfig::new(cfg),
    );
    tracker.start(&OpenRetry {
        backoff: Duration::from_millis(args.backoff_ms),
        max_attempts: args.open_attempts,
    })?;

    let summary = tracker.run();
    log::info!(
        "processed {} frames: {} with a target, {} reports published",
        summary.frames,
        summary.detections,
        summary.published
    );
    Ok(())
}

/// `--log-level` as a tracing filter applied to every target.
#[cfg(feature = "tracing")]
fn level_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::new(level.as_str().to_ascii_lowercase())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        init_tracing(false, cli.log_level.map(level_filter));
    }
    #[cfg(not(feature = "tracing"))]
    {
        let level = cli
            .log_level
            .unwrap_or_else(|| level_from_env("RETRO_TARGET_LOG", LevelFilter::Info));
        init_with_level(level)?;
    }

    match &cli.command {
        Command::Detect(args) => detect(args),
        Command::Run(args) => run(args),
    }
}
