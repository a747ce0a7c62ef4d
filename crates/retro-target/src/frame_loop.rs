//! The tracker's main cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use retro_target_detector::{TargetDetection, TargetDetector};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    open_with_retry, ExposureController, ExposureMode, ExposureModePolicy, FrameSource, OpenRetry,
    RuntimeError, SharedConfig, TargetReport, TelemetryLink,
};

/// Result of one cycle.
#[derive(Clone, Debug)]
pub struct CycleOutcome {
    /// Exposure mode in effect for this frame.
    pub mode: ExposureMode,
    pub detection: TargetDetection,
    /// Report sent to the controller, `None` in manual mode or when the
    /// publish failed.
    pub report: Option<TargetReport>,
}

/// Totals of a [`FrameLoop::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: u64,
    /// Frames with a selected target, whatever the mode.
    pub detections: u64,
    pub published: u64,
    /// `true` when the stop flag ended the loop, `false` when the source
    /// closed.
    pub stopped: bool,
}

/// Single-threaded tracker: one frame per cycle, strictly sequential.
pub struct FrameLoop<S, E, T> {
    source: S,
    exposure: E,
    telemetry: T,
    config: SharedConfig,
    policy: ExposureModePolicy,
    stop: Arc<AtomicBool>,
    frames_read: u64,
}

impl<S, E, T> FrameLoop<S, E, T>
where
    S: FrameSource,
    E: ExposureController,
    T: TelemetryLink,
{
    pub fn new(source: S, exposure: E, telemetry: T, config: SharedConfig) -> Self {
        let policy = ExposureModePolicy::new(config.snapshot().max_exposure);
        Self {
            source,
            exposure,
            telemetry,
            config,
            policy,
            stop: Arc::new(AtomicBool::new(false)),
            frames_read: 0,
        }
    }

    /// Flag checked at the end of every cycle; set it to end [`FrameLoop::run`].
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn mode(&self) -> ExposureMode {
        self.policy.mode()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn exposure(&self) -> &E {
        &self.exposure
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut T {
        &mut self.telemetry
    }

    /// Frames read since construction.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    pub fn into_parts(self) -> (S, E, T) {
        (self.source, self.exposure, self.telemetry)
    }

    /// Startup: exposure into manual mode, open the source (retrying per
    /// `retry`), request the configured resolution.
    ///
    /// Exposure and resolution failures are logged; only giving up on the
    /// source is an error.
    pub fn start(&mut self, retry: &OpenRetry) -> Result<(), RuntimeError> {
        let cfg = self.config.snapshot();
        cfg.log_summary();

        self.policy.set_max_exposure(cfg.max_exposure);
        if let Err(err) = self.policy.initialize(&mut self.exposure) {
            log::warn!("exposure init failed: {err}");
        }

        open_with_retry(&mut self.source, retry)?;
        if let Err(err) = self
            .source
            .set_resolution(cfg.frame_width, cfg.frame_height)
        {
            log::warn!(
                "could not set resolution {}x{}: {err}",
                cfg.frame_width,
                cfg.frame_height
            );
        }
        Ok(())
    }

    /// Run one cycle. `None` once the source is closed.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn run_cycle(&mut self) -> Option<CycleOutcome> {
        let cfg = self.config.snapshot();

        let auto_targeting = self.telemetry.auto_targeting_requested();
        self.policy.set_max_exposure(cfg.max_exposure);
        if let Err(err) = self.policy.observe(auto_targeting, &mut self.exposure) {
            log::warn!("exposure write failed: {err}");
        }
        let mode = self.policy.mode();

        let frame = self.source.read()?;
        self.frames_read += 1;
        retro_target_core::set_log_frame(self.frames_read);

        let detector = TargetDetector::new(cfg.detector_params());
        let detection = detector.detect(&frame);

        let report = match mode {
            ExposureMode::Manual => None,
            ExposureMode::AutoTargeting => {
                let report =
                    TargetReport::from_detection(&detection, cfg.frame_width, cfg.frame_height);
                match self.telemetry.publish(&report) {
                    Ok(()) => Some(report),
                    Err(err) => {
                        log::warn!("telemetry publish failed: {err}");
                        None
                    }
                }
            }
        };

        Some(CycleOutcome {
            mode,
            detection,
            report,
        })
    }

    /// Cycle until the source closes or the stop flag is raised.
    pub fn run(&mut self) -> LoopSummary {
        let mut summary = LoopSummary::default();
        loop {
            let Some(outcome) = self.run_cycle() else {
                log::info!("frame source closed after {} frames", summary.frames);
                break;
            };
            summary.frames += 1;
            if outcome.detection.detected() {
                summary.detections += 1;
            }
            if outcome.report.is_some() {
                summary.published += 1;
            }
            if self.stop.load(Ordering::Relaxed) {
                log::info!("stop requested after {} frames", summary.frames);
                summary.stopped = true;
                break;
            }
        }
        summary
    }
}
