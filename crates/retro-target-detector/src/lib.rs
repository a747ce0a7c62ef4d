//! Color-blob target detection for a single frame.
//!
//! Pipeline stages, in order:
//! - [`segment`]: HSV threshold of an RGB frame into a binary mask.
//! - [`consolidate`]: square dilation that merges fragmented blobs.
//! - [`extract`]: border following and convex hull per contour.
//! - [`score`]: area and center of mass per hull.
//! - [`select`]: largest candidate above the minimum area, first seen on ties.
//!
//! [`TargetDetector`] runs them back to back.

mod candidate;
mod contours;
mod detector;
mod morphology;
mod params;
mod segment;
mod select;

pub use candidate::{score, Candidate};
pub use contours::extract;
pub use detector::{TargetDetection, TargetDetector};
pub use morphology::consolidate;
pub use params::{TargetDetectorParams, DEFAULT_DILATION_RADIUS};
pub use segment::segment;
pub use select::{select, SelectionParams, SelectionResult};

pub use retro_target_core::{ColorRange, Hull};

/// RGB camera frame.
pub type Frame = image::RgbImage;

/// Binary mask: [`MASK_ON`] for set pixels, `0` otherwise.
pub type Mask = image::GrayImage;

/// Value of a set mask pixel.
pub const MASK_ON: u8 = 255;
