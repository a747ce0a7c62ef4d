//! Link to the remote controller.
//!
//! The controller exposes a flat key/value table. The tracker reads one
//! boolean (`autoCam`) per cycle and, in auto-targeting mode, writes the
//! target report as doubles.

use std::collections::BTreeMap;
use std::io::Write;

use retro_target_detector::TargetDetection;
use serde::{Deserialize, Serialize};

use crate::TelemetryError;

/// Table keys shared with the controller.
pub mod keys {
    pub const AUTO_CAM: &str = "autoCam";
    pub const TARGETS: &str = "targets";
    pub const TARGET_X: &str = "targetX";
    pub const TARGET_Y: &str = "targetY";
    pub const TARGET_AREA: &str = "targetArea";
    pub const FRAME_WIDTH: &str = "frameWidth";
    pub const FRAME_HEIGHT: &str = "frameHeight";
}

/// What one cycle tells the controller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TargetReport {
    NoTarget,
    Target {
        /// Centroid in frame pixels, origin at the top-left corner.
        x: f64,
        y: f64,
        area: f64,
        frame_width: f64,
        frame_height: f64,
    },
}

impl TargetReport {
    /// Report for `detection`, with the frame size the controller should
    /// scale against.
    pub fn from_detection(detection: &TargetDetection, frame_width: u32, frame_height: u32) -> Self {
        let Some(target) = detection.target() else {
            return Self::NoTarget;
        };
        let Some(centroid) = target.centroid else {
            return Self::NoTarget;
        };
        Self::Target {
            x: centroid.x,
            y: centroid.y,
            area: target.area,
            frame_width: frame_width as f64,
            frame_height: frame_height as f64,
        }
    }

    #[inline]
    pub fn is_target(&self) -> bool {
        matches!(self, Self::Target { .. })
    }

    /// Table entries to write. Without a target only `targets = 0` is sent;
    /// the previous position entries stay as they were.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Self::NoTarget => vec![(keys::TARGETS, 0.0)],
            Self::Target {
                x,
                y,
                area,
                frame_width,
                frame_height,
            } => vec![
                (keys::TARGETS, 1.0),
                (keys::TARGET_X, x),
                (keys::TARGET_Y, y),
                (keys::TARGET_AREA, area),
                (keys::FRAME_WIDTH, frame_width),
                (keys::FRAME_HEIGHT, frame_height),
            ],
        }
    }
}

/// The remote controller's table.
pub trait TelemetryLink {
    /// Current value of the `autoCam` flag; `false` when unset.
    fn auto_targeting_requested(&mut self) -> bool;

    fn publish(&mut self, report: &TargetReport) -> Result<(), TelemetryError>;
}

/// In-process table, for tests and for embedding the tracker.
#[derive(Clone, Debug, Default)]
pub struct MemoryTelemetry {
    auto_cam: bool,
    table: BTreeMap<&'static str, f64>,
    publishes: usize,
}

impl MemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `autoCam` flag as the controller would.
    pub fn set_auto_cam(&mut self, value: bool) {
        self.auto_cam = value;
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.table.get(key).copied()
    }

    /// Number of `publish` calls so far.
    pub fn publishes(&self) -> usize {
        self.publishes
    }
}

impl TelemetryLink for MemoryTelemetry {
    fn auto_targeting_requested(&mut self) -> bool {
        self.auto_cam
    }

    fn publish(&mut self, report: &TargetReport) -> Result<(), TelemetryError> {
        self.table.extend(report.entries());
        self.publishes += 1;
        Ok(())
    }
}

/// Writes each report as one JSON object per line, e.g. to stdout.
///
/// The `autoCam` flag is fixed at construction.
#[derive(Debug)]
pub struct JsonLinesTelemetry<W: Write> {
    out: W,
    auto_cam: bool,
}

impl<W: Write> JsonLinesTelemetry<W> {
    pub fn new(out: W, auto_cam: bool) -> Self {
        Self { out, auto_cam }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TelemetryLink for JsonLinesTelemetry<W> {
    fn auto_targeting_requested(&mut self) -> bool {
        self.auto_cam
    }

    fn publish(&mut self, report: &TargetReport) -> Result<(), TelemetryError> {
        let row: BTreeMap<&str, f64> = report.entries().into_iter().collect();
        serde_json::to_writer(&mut self.out, &row)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}
