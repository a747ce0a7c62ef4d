//! Convex hulls and polygon moments on integer pixel coordinates.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Convex polygon in pixel coordinates, vertices in monotone-chain order
/// without repeats or collinear points.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hull {
    pub points: Vec<Point2<i32>>,
}

impl Hull {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Raster moments of the filled polygon.
    pub fn moments(&self) -> PolygonMoments {
        PolygonMoments::from_polygon(&self.points)
    }
}

#[inline]
fn cross(o: Point2<i32>, a: Point2<i32>, b: Point2<i32>) -> i64 {
    let (ox, oy) = (o.x as i64, o.y as i64);
    (a.x as i64 - ox) * (b.y as i64 - oy) - (a.y as i64 - oy) * (b.x as i64 - ox)
}

/// Convex hull of a point set (Andrew's monotone chain).
///
/// Duplicate and collinear points are dropped, so a degenerate input (single
/// point, straight line) yields a hull with fewer than three vertices.
pub fn convex_hull(points: &[Point2<i32>]) -> Hull {
    let mut pts: Vec<Point2<i32>> = points.to_vec();
    pts.sort_unstable_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
    pts.dedup();

    if pts.len() < 3 {
        return Hull { points: pts };
    }

    let mut hull: Vec<Point2<i32>> = Vec::with_capacity(pts.len() + 1);

    // lower chain
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }

    // upper chain
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();

    Hull { points: hull }
}

/// Zeroth and first order moments of a filled simple polygon.
///
/// Computed with Green's theorem over the polygon edges, so the result is the
/// mass distribution of the enclosed region rather than of its vertices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl PolygonMoments {
    pub fn from_polygon(points: &[Point2<i32>]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }

        let mut a = 0.0f64;
        let mut ax = 0.0f64;
        let mut ay = 0.0f64;
        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            let (x0, y0) = (p.x as f64, p.y as f64);
            let (x1, y1) = (q.x as f64, q.y as f64);
            let c = x0 * y1 - x1 * y0;
            a += c;
            ax += (x0 + x1) * c;
            ay += (y0 + y1) * c;
        }

        // Orientation independent: flip so that m00 >= 0.
        let sign = if a < 0.0 { -1.0 } else { 1.0 };
        Self {
            m00: sign * a / 2.0,
            m10: sign * ax / 6.0,
            m01: sign * ay / 6.0,
        }
    }

    /// Enclosed area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.m00
    }

    /// Center of mass, `None` for zero-area polygons.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        if self.m00.abs() < f64::EPSILON {
            return None;
        }
        Some(Point2::new(self.m10 / self.m00, self.m01 / self.m00))
    }
}
