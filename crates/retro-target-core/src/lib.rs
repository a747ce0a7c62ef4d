//! Core types and utilities for retro-reflective target tracking.
//!
//! This crate is intentionally small and image-agnostic. It holds the color
//! space conversion used for thresholding, the convex polygon geometry used to
//! score blobs, and the process logger. It does *not* depend on any concrete
//! image or camera type.

mod color;
mod geometry;
mod logger;

pub use color::{rgb_to_hsv, ColorRange, Hsv, HUE_RANGE};
pub use geometry::{convex_hull, Hull, PolygonMoments};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_env, set_log_frame};
