//! Real-time tracker for a colored retro-reflective target.
//!
//! This crate wraps the per-frame detector from `retro-target-detector` in
//! the session machinery of an unattended tracker:
//! - [`SessionConfig`] / [`SharedConfig`]: startup configuration with per-field
//!   defaults, snapshotted once per cycle.
//! - [`FrameSource`], [`ExposureController`], [`TelemetryLink`]: capabilities
//!   for the camera, its exposure registers, and the remote controller link.
//! - [`ExposureModePolicy`]: edge-triggered exposure switching driven by the
//!   remote `autoCam` flag.
//! - [`FrameLoop`]: the single-threaded cycle tying it all together.
//!
//! ## Quickstart
//!
//! ```no_run
//! use retro_target::{
//!     FrameLoop, ImageSequenceSource, JsonLinesTelemetry, LoggingExposure, OpenRetry,
//!     SessionConfig, SharedConfig,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::load_or_default("chillOut_params.txt")?;
//! let source = ImageSequenceSource::from_paths(["recording/"])?;
//! let telemetry = JsonLinesTelemetry::new(std::io::stdout(), true);
//!
//! let mut tracker = FrameLoop::new(source, LoggingExposure::default(), telemetry, SharedConfig::new(config));
//! tracker.start(&OpenRetry::default())?;
//! let summary = tracker.run();
//! println!("{} frames, {} with a target", summary.frames, summary.detections);
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod config;
mod error;
pub mod exposure;
pub mod frame_loop;
pub mod telemetry;

pub use retro_target_core as core;
pub use retro_target_detector as detector;

pub use capture::{open_with_retry, FrameSource, ImageSequenceSource, OpenRetry};
pub use config::{SessionConfig, SharedConfig};
pub use error::{CaptureError, ConfigError, ExposureError, RuntimeError, TelemetryError};
pub use exposure::{ExposureController, ExposureMode, ExposureModePolicy, LoggingExposure};
pub use frame_loop::{CycleOutcome, FrameLoop, LoopSummary};
pub use telemetry::{JsonLinesTelemetry, MemoryTelemetry, TargetReport, TelemetryLink};

pub use retro_target_detector::{Frame, TargetDetection, TargetDetector, TargetDetectorParams};
