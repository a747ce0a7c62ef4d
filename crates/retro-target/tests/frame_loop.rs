use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use image::Rgb;
use retro_target::core::ColorRange;
use retro_target::telemetry::keys;
use retro_target::{
    CaptureError, ExposureMode, Frame, FrameLoop, FrameSource, LoggingExposure, MemoryTelemetry,
    OpenRetry, SessionConfig, SharedConfig, TargetReport,
};

/// Scripted camera: fails to open a few times, then yields queued frames.
#[derive(Default)]
struct ScriptedCamera {
    frames: VecDeque<Frame>,
    failing_opens: usize,
    opens: usize,
    resolution: Option<(u32, u32)>,
}

impl ScriptedCamera {
    fn with_frames(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            ..Self::default()
        }
    }
}

impl FrameSource for ScriptedCamera {
    fn open(&mut self) -> Result<(), CaptureError> {
        self.opens += 1;
        if self.failing_opens > 0 {
            self.failing_opens -= 1;
            return Err(CaptureError::Unavailable("/dev/video0 busy".into()));
        }
        Ok(())
    }

    fn set_resolution(&mut self, width: u32, height: u32) -> Result<(), CaptureError> {
        self.resolution = Some((width, height));
        Ok(())
    }

    fn read(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }
}

/// 160x120 black frame with a white square spanning [x0, x0 + side).
fn square_frame(x0: u32, y0: u32, side: u32) -> Frame {
    let mut frame = Frame::from_pixel(160, 120, Rgb([0, 0, 0]));
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            frame.put_pixel(x, y, Rgb([255, 255, 255]));
        }
    }
    frame
}

fn bright_config() -> SessionConfig {
    SessionConfig {
        frame_width: 160,
        frame_height: 120,
        color_range: ColorRange::new([0, 0, 200], [255, 255, 255]),
        dilation_radius: 0,
        ..SessionConfig::default()
    }
}

fn no_wait() -> OpenRetry {
    OpenRetry {
        backoff: Duration::ZERO,
        max_attempts: Some(10),
    }
}

#[test]
fn start_retries_open_and_sets_resolution() {
    let camera = ScriptedCamera {
        failing_opens: 3,
        ..ScriptedCamera::default()
    };
    let mut tracker = FrameLoop::new(
        camera,
        LoggingExposure::default(),
        MemoryTelemetry::new(),
        SharedConfig::new(bright_config()),
    );
    tracker.start(&no_wait()).unwrap();

    assert_eq!(tracker.source().opens, 4);
    assert_eq!(tracker.source().resolution, Some((160, 120)));
    assert_eq!(tracker.exposure().last_absolute(), Some(100.0));
    assert_eq!(tracker.mode(), ExposureMode::Manual);
}

#[test]
fn start_fails_when_retries_are_exhausted() {
    let camera = ScriptedCamera {
        failing_opens: 100,
        ..ScriptedCamera::default()
    };
    let mut tracker = FrameLoop::new(
        camera,
        LoggingExposure::default(),
        MemoryTelemetry::new(),
        SharedConfig::new(bright_config()),
    );
    assert!(tracker.start(&no_wait()).is_err());
    assert_eq!(tracker.source().opens, 10);
}

#[test]
fn manual_mode_detects_but_never_publishes() {
    let camera = ScriptedCamera::with_frames(vec![square_frame(10, 20, 20); 3]);
    let mut tracker = FrameLoop::new(
        camera,
        LoggingExposure::default(),
        MemoryTelemetry::new(),
        SharedConfig::new(bright_config()),
    );
    tracker.start(&no_wait()).unwrap();
    let summary = tracker.run();

    assert_eq!(summary.frames, 3);
    assert_eq!(summary.detections, 3);
    assert_eq!(summary.published, 0);
    assert!(!summary.stopped);
    assert_eq!(tracker.telemetry().publishes(), 0);
}

#[test]
fn auto_targeting_publishes_raw_pixel_centroid() {
    let camera = ScriptedCamera::with_frames(vec![square_frame(10, 20, 20)]);
    let mut telemetry = MemoryTelemetry::new();
    telemetry.set_auto_cam(true);
    let mut tracker = FrameLoop::new(
        camera,
        LoggingExposure::default(),
        telemetry,
        SharedConfig::new(bright_config()),
    );
    tracker.start(&no_wait()).unwrap();

    let outcome = tracker.run_cycle().expect("one frame");
    assert_eq!(outcome.mode, ExposureMode::AutoTargeting);
    assert!(outcome.report.is_some_and(|r| r.is_target()));

    let table = tracker.telemetry();
    assert_eq!(table.get(keys::TARGETS), Some(1.0));
    assert_abs_diff_eq!(table.get(keys::TARGET_X).unwrap(), 19.5, epsilon = 1e-9);
    assert_abs_diff_eq!(table.get(keys::TARGET_Y).unwrap(), 29.5, epsilon = 1e-9);
    assert_abs_diff_eq!(table.get(keys::TARGET_AREA).unwrap(), 361.0, epsilon = 1e-9);
    assert_eq!(table.get(keys::FRAME_WIDTH), Some(160.0));
    assert_eq!(table.get(keys::FRAME_HEIGHT), Some(120.0));

    // Exposure went to minimum exactly once, after the startup write.
    assert_eq!(tracker.exposure().absolute_writes(), 2);
    assert_eq!(tracker.exposure().last_absolute(), Some(0.0));

    assert!(tracker.run_cycle().is_none());
}

#[test]
fn missing_target_in_auto_mode_reports_zero() {
    let camera = ScriptedCamera::with_frames(vec![square_frame(10, 20, 5)]);
    let mut telemetry = MemoryTelemetry::new();
    telemetry.set_auto_cam(true);
    let mut tracker = FrameLoop::new(
        camera,
        LoggingExposure::default(),
        telemetry,
        SharedConfig::new(bright_config()),
    );
    tracker.start(&no_wait()).unwrap();

    let outcome = tracker.run_cycle().unwrap();
    assert_eq!(outcome.report, Some(TargetReport::NoTarget));
    assert_eq!(tracker.telemetry().get(keys::TARGETS), Some(0.0));
    assert_eq!(tracker.telemetry().get(keys::TARGET_X), None);
}

#[test]
fn flag_is_read_every_cycle_and_exposure_follows_edges() {
    let camera = ScriptedCamera::with_frames(vec![square_frame(10, 20, 20); 4]);
    let mut tracker = FrameLoop::new(
        camera,
        LoggingExposure::default(),
        MemoryTelemetry::new(),
        SharedConfig::new(bright_config()),
    );
    tracker.start(&no_wait()).unwrap();

    let modes: Vec<ExposureMode> = [false, true, true, false]
        .into_iter()
        .map(|flag| {
            tracker.telemetry_mut().set_auto_cam(flag);
            tracker.run_cycle().unwrap().mode
        })
        .collect();

    assert_eq!(
        modes,
        vec![
            ExposureMode::Manual,
            ExposureMode::AutoTargeting,
            ExposureMode::AutoTargeting,
            ExposureMode::Manual,
        ]
    );
    // startup + two edges
    assert_eq!(tracker.exposure().absolute_writes(), 3);
    assert_eq!(tracker.telemetry().publishes(), 2);
}

#[test]
fn config_updates_apply_from_the_next_cycle() {
    let camera = ScriptedCamera::with_frames(vec![square_frame(10, 20, 20); 2]);
    let shared = SharedConfig::new(bright_config());
    let mut tracker = FrameLoop::new(
        camera,
        LoggingExposure::default(),
        MemoryTelemetry::new(),
        shared.clone(),
    );
    tracker.start(&no_wait()).unwrap();

    assert!(tracker.run_cycle().unwrap().detection.detected());
    shared.update(|cfg| cfg.min_area = 1_000.0);
    assert!(!tracker.run_cycle().unwrap().detection.detected());
}

#[test]
fn stop_flag_ends_the_loop_after_the_current_cycle() {
    let camera = ScriptedCamera::with_frames(vec![square_frame(10, 20, 20); 5]);
    let mut tracker = FrameLoop::new(
        camera,
        LoggingExposure::default(),
        MemoryTelemetry::new(),
        SharedConfig::new(bright_config()),
    );
    tracker.start(&no_wait()).unwrap();
    tracker.stop_handle().store(true, Ordering::Relaxed);

    let summary = tracker.run();
    assert_eq!(summary.frames, 1);
    assert_eq!(tracker.frames_read(), 1);
    assert!(summary.stopped);

    let (camera, _, _) = tracker.into_parts();
    assert_eq!(camera.frames.len(), 4);
}
