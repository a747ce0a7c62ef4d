use retro_target_core::ColorRange;
use serde::{Deserialize, Serialize};

use crate::SelectionParams;

/// Dilation radius used when none is configured.
pub const DEFAULT_DILATION_RADIUS: u32 = 5;

fn default_dilation_radius() -> u32 {
    DEFAULT_DILATION_RADIUS
}

/// Configuration for [`crate::TargetDetector`].
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetDetectorParams {
    /// HSV bounds of the target color.
    #[serde(default)]
    pub color: ColorRange,
    /// Half side of the square dilation element; `0` disables dilation.
    #[serde(default = "default_dilation_radius")]
    pub dilation_radius: u32,
    #[serde(default)]
    pub selection: SelectionParams,
}

impl Default for TargetDetectorParams {
    fn default() -> Self {
        Self {
            color: ColorRange::default(),
            dilation_radius: DEFAULT_DILATION_RADIUS,
            selection: SelectionParams::default(),
        }
    }
}
