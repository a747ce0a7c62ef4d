use retro_target_core::{rgb_to_hsv, ColorRange};

use crate::{Frame, Mask, MASK_ON};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Threshold `frame` in HSV space.
///
/// A pixel is set iff each of its H, S and V values lies inside the inclusive
/// bounds of `range`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame, range), fields(width = frame.width(), height = frame.height()))
)]
pub fn segment(frame: &Frame, range: &ColorRange) -> Mask {
    let (width, height) = frame.dimensions();
    let mut mask = Mask::new(width, height);
    if !range.is_satisfiable() {
        return mask;
    }

    for (src, dst) in frame.pixels().zip(mask.pixels_mut()) {
        let [r, g, b] = src.0;
        if range.contains(rgb_to_hsv(r, g, b)) {
            dst.0[0] = MASK_ON;
        }
    }
    mask
}
