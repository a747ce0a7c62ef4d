//! Camera exposure control driven by the remote mode flag.
//!
//! Auto-targeting wants the shortest exposure so only the lit retro-reflective
//! tape survives thresholding; manual (driver display) mode wants a bright
//! picture. The policy writes the hardware only when the mode changes.

use serde::{Deserialize, Serialize};

use crate::ExposureError;

/// Low-level exposure registers of the camera.
pub trait ExposureController {
    fn set_auto_mode(&mut self, enabled: bool) -> Result<(), ExposureError>;

    /// Device-scaled absolute exposure.
    fn set_absolute(&mut self, value: f64) -> Result<(), ExposureError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExposureMode {
    /// Driver display: long exposure, no telemetry.
    #[default]
    Manual,
    /// Target reporting: minimum exposure.
    AutoTargeting,
}

impl ExposureMode {
    /// Mode requested by the remote `autoCam` flag.
    #[inline]
    pub fn from_flag(auto_targeting: bool) -> Self {
        if auto_targeting {
            Self::AutoTargeting
        } else {
            Self::Manual
        }
    }

    /// Absolute exposure for this mode.
    #[inline]
    pub fn exposure(self, max_exposure: f64) -> f64 {
        match self {
            Self::Manual => max_exposure,
            Self::AutoTargeting => 0.0,
        }
    }
}

/// Edge-triggered two-state exposure policy.
#[derive(Clone, Debug)]
pub struct ExposureModePolicy {
    mode: ExposureMode,
    max_exposure: f64,
}

impl ExposureModePolicy {
    pub fn new(max_exposure: f64) -> Self {
        Self {
            mode: ExposureMode::Manual,
            max_exposure,
        }
    }

    #[inline]
    pub fn mode(&self) -> ExposureMode {
        self.mode
    }

    #[inline]
    pub fn max_exposure(&self) -> f64 {
        self.max_exposure
    }

    /// Exposure used on the next switch into manual mode. Does not touch the
    /// hardware.
    pub fn set_max_exposure(&mut self, max_exposure: f64) {
        self.max_exposure = max_exposure;
    }

    /// Put the camera into the startup state: manual mode, auto exposure off,
    /// exposure at `max_exposure`.
    pub fn initialize<C: ExposureController + ?Sized>(
        &mut self,
        controller: &mut C,
    ) -> Result<(), ExposureError> {
        self.mode = ExposureMode::Manual;
        controller.set_auto_mode(false)?;
        controller.set_absolute(self.max_exposure)
    }

    /// Feed this cycle's flag value.
    ///
    /// Returns the new mode when the flag differs from the recorded mode, after
    /// one `set_absolute` write. The mode follows the flag even if the write
    /// fails; the error is returned for logging and the write is not retried.
    pub fn observe<C: ExposureController + ?Sized>(
        &mut self,
        auto_targeting: bool,
        controller: &mut C,
    ) -> Result<Option<ExposureMode>, ExposureError> {
        let wanted = ExposureMode::from_flag(auto_targeting);
        if wanted == self.mode {
            return Ok(None);
        }
        self.mode = wanted;
        let value = wanted.exposure(self.max_exposure);
        log::info!("exposure mode {wanted:?}: setting exposure to {value}");
        controller.set_absolute(value)?;
        Ok(Some(wanted))
    }
}

/// One recorded hardware write.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExposureWrite {
    AutoMode(bool),
    Absolute(f64),
}

/// Controller that records and logs writes instead of touching hardware.
#[derive(Clone, Debug, Default)]
pub struct LoggingExposure {
    pub writes: Vec<ExposureWrite>,
}

impl LoggingExposure {
    /// Number of `set_absolute` calls so far.
    pub fn absolute_writes(&self) -> usize {
        self.writes
            .iter()
            .filter(|w| matches!(w, ExposureWrite::Absolute(_)))
            .count()
    }

    /// Last absolute exposure written.
    pub fn last_absolute(&self) -> Option<f64> {
        self.writes.iter().rev().find_map(|w| match w {
            ExposureWrite::Absolute(v) => Some(*v),
            ExposureWrite::AutoMode(_) => None,
        })
    }
}

impl ExposureController for LoggingExposure {
    fn set_auto_mode(&mut self, enabled: bool) -> Result<(), ExposureError> {
        log::debug!("exposure auto mode = {enabled}");
        self.writes.push(ExposureWrite::AutoMode(enabled));
        Ok(())
    }

    fn set_absolute(&mut self, value: f64) -> Result<(), ExposureError> {
        log::debug!("exposure absolute = {value}");
        self.writes.push(ExposureWrite::Absolute(value));
        Ok(())
    }
}
