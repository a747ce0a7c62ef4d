//! HSV conversion and inclusive color-range thresholds.
//!
//! The encoding follows the 8-bit convention used by most embedded vision
//! tooling: hue is halved into `0..180` so it fits a byte, saturation and
//! value span `0..=255`.

use serde::{Deserialize, Serialize};

/// Number of distinct hue values in the 8-bit encoding.
pub const HUE_RANGE: u8 = 180;

/// One pixel in 8-bit HSV.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    #[inline]
    pub fn channels(self) -> [u8; 3] {
        [self.h, self.s, self.v]
    }
}

/// Convert one RGB pixel into 8-bit HSV.
///
/// Grey pixels (all channels equal) get hue 0; black gets saturation 0.
#[inline]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let (ri, gi, bi) = (r as i32, g as i32, b as i32);
    let v = ri.max(gi).max(bi);
    let min = ri.min(gi).min(bi);
    let diff = v - min;

    let s = if v == 0 {
        0
    } else {
        (255.0 * diff as f32 / v as f32).round() as i32
    };

    let h = if diff == 0 {
        0
    } else {
        // Sector offset in units of 60 degrees, scaled to the halved hue.
        let k = if v == ri {
            gi - bi
        } else if v == gi {
            bi - ri + 2 * diff
        } else {
            ri - gi + 4 * diff
        };
        let mut h = (30.0 * k as f32 / diff as f32).round() as i32;
        if h < 0 {
            h += HUE_RANGE as i32;
        }
        if h >= HUE_RANGE as i32 {
            h -= HUE_RANGE as i32;
        }
        h
    };

    Hsv {
        h: h as u8,
        s: s.clamp(0, 255) as u8,
        v: v as u8,
    }
}

/// Inclusive HSV thresholds.
///
/// A range with `min > max` on any channel matches nothing; it is not
/// rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ColorRange {
    /// Lower bounds as `[h, s, v]`.
    pub min: [u8; 3],
    /// Upper bounds as `[h, s, v]`.
    pub max: [u8; 3],
}

impl Default for ColorRange {
    /// Full range on every channel: every pixel matches.
    fn default() -> Self {
        Self {
            min: [0, 0, 0],
            max: [255, 255, 255],
        }
    }
}

impl ColorRange {
    pub fn new(min: [u8; 3], max: [u8; 3]) -> Self {
        Self { min, max }
    }

    /// `true` when some pixel could match (every `min <= max`).
    pub fn is_satisfiable(&self) -> bool {
        self.min.iter().zip(self.max.iter()).all(|(lo, hi)| lo <= hi)
    }

    #[inline]
    pub fn contains(&self, hsv: Hsv) -> bool {
        let c = hsv.channels();
        (0..3).all(|i| self.min[i] <= c[i] && c[i] <= self.max[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries_map_to_expected_hues() {
        assert_eq!(rgb_to_hsv(255, 0, 0), Hsv { h: 0, s: 255, v: 255 });
        assert_eq!(rgb_to_hsv(0, 255, 0), Hsv { h: 60, s: 255, v: 255 });
        assert_eq!(rgb_to_hsv(0, 0, 255), Hsv { h: 120, s: 255, v: 255 });
        assert_eq!(rgb_to_hsv(255, 255, 0).h, 30);
        assert_eq!(rgb_to_hsv(0, 255, 255).h, 90);
        assert_eq!(rgb_to_hsv(255, 0, 255).h, 150);
    }

    #[test]
    fn greys_have_no_hue_or_saturation() {
        for v in [0u8, 1, 77, 200, 255] {
            let hsv = rgb_to_hsv(v, v, v);
            assert_eq!(hsv, Hsv { h: 0, s: 0, v });
        }
    }

    #[test]
    fn hue_just_below_red_wraps_into_range() {
        // Red dominant with blue slightly above green: negative sector offset.
        let hsv = rgb_to_hsv(255, 0, 10);
        assert_eq!(hsv.h, 179);
        assert!(hsv.h < HUE_RANGE);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = ColorRange::new([50, 100, 200], [70, 255, 255]);
        assert!(range.contains(Hsv { h: 50, s: 100, v: 200 }));
        assert!(range.contains(Hsv { h: 70, s: 255, v: 255 }));
        assert!(!range.contains(Hsv { h: 49, s: 100, v: 200 }));
        assert!(!range.contains(Hsv { h: 60, s: 99, v: 220 }));
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let range = ColorRange::new([10, 0, 0], [5, 255, 255]);
        assert!(!range.is_satisfiable());
        for h in 0..HUE_RANGE {
            assert!(!range.contains(Hsv { h, s: 128, v: 128 }));
        }
    }

    #[test]
    fn default_range_is_full() {
        let range = ColorRange::default();
        assert!(range.is_satisfiable());
        assert!(range.contains(Hsv { h: 179, s: 0, v: 255 }));
        assert!(range.contains(Hsv::default()));
    }
}
