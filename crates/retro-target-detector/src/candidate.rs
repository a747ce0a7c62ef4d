use nalgebra::Point2;
use retro_target_core::Hull;
use serde::{Deserialize, Serialize};

/// A scored hull.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub hull: Hull,
    /// Enclosed hull area in square pixels.
    pub area: f64,
    /// Center of mass of the filled hull, `None` for zero-area hulls.
    pub centroid: Option<Point2<f64>>,
}

impl Candidate {
    pub fn from_hull(hull: Hull) -> Self {
        let moments = hull.moments();
        Self {
            area: moments.area(),
            centroid: moments.centroid(),
            hull,
        }
    }

    /// Degenerate hulls (point, segment) are never eligible for selection.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.centroid.is_none()
    }
}

/// Score hulls in order; one candidate per hull.
pub fn score(hulls: impl IntoIterator<Item = Hull>) -> Vec<Candidate> {
    hulls.into_iter().map(Candidate::from_hull).collect()
}
