//! Binary dilation with a square structuring element.

use crate::{Mask, MASK_ON};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Dilate `mask` with a `(2 * radius + 1)` square anchored at its center.
///
/// Pixels outside the image never contribute. `radius == 0` returns an
/// identical mask. The square is separable, so rows and columns are processed
/// independently with a sliding count; cost does not grow with `radius`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask), fields(width = mask.width(), height = mask.height()))
)]
pub fn consolidate(mask: &Mask, radius: u32) -> Mask {
    if radius == 0 {
        return mask.clone();
    }

    let (width, height) = mask.dimensions();
    let (w, h) = (width as usize, height as usize);
    let r = radius as usize;
    let src = mask.as_raw();

    let mut rows = vec![0u8; w * h];
    for y in 0..h {
        let span = y * w..(y + 1) * w;
        dilate_line(&src[span.clone()], &mut rows[span], r);
    }

    let mut out = vec![0u8; w * h];
    let mut column = vec![0u8; h];
    let mut dilated = vec![0u8; h];
    for x in 0..w {
        for y in 0..h {
            column[y] = rows[y * w + x];
        }
        dilate_line(&column, &mut dilated, r);
        for y in 0..h {
            out[y * w + x] = dilated[y];
        }
    }

    // `out` has exactly width * height bytes.
    Mask::from_raw(width, height, out).unwrap_or_else(|| Mask::new(width, height))
}

/// 1D dilation: `output[i]` is set iff any input in `[i - r, i + r]` is set.
fn dilate_line(input: &[u8], output: &mut [u8], radius: usize) {
    let n = input.len();
    let mut count = input[..radius.saturating_add(1).min(n)]
        .iter()
        .filter(|&&v| v != 0)
        .count();

    for i in 0..n {
        output[i] = if count > 0 { MASK_ON } else { 0 };
        let enter = i.saturating_add(radius).saturating_add(1);
        if enter < n && input[enter] != 0 {
            count += 1;
        }
        if i >= radius && input[i - radius] != 0 {
            count -= 1;
        }
    }
}
