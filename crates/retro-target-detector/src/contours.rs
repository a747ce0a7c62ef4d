use image::imageops;
use imageproc::contours::find_contours;
use nalgebra::Point2;
use retro_target_core::{convex_hull, Hull};

use crate::Mask;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Convex hulls of every border in `mask`.
///
/// Borders come from Suzuki–Abe border following, outer borders and hole
/// borders alike, with every boundary pixel kept. The output order is the
/// order in which a top-to-bottom, left-to-right raster scan meets each
/// border; selection relies on it to break area ties.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask), fields(width = mask.width(), height = mask.height()))
)]
pub fn extract(mask: &Mask) -> Vec<Hull> {
    find_contours::<i32>(&with_margin(mask))
        .iter()
        .map(|contour| {
            let points: Vec<Point2<i32>> = contour
                .points
                .iter()
                .map(|p| Point2::new(p.x - 1, p.y - 1))
                .collect();
            convex_hull(&points)
        })
        .collect()
}

/// Copy of `mask` inside a one-pixel clear border.
///
/// The border follower never starts a border on the image frame, so a blob
/// touching two opposite edges would otherwise be missed.
fn with_margin(mask: &Mask) -> Mask {
    let mut padded = Mask::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut padded, mask, 1, 1);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MASK_ON;
    use image::Luma;

    fn fill(mask: &mut Mask, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) {
        for y in ys {
            for x in xs.clone() {
                mask.put_pixel(x, y, Luma([MASK_ON]));
            }
        }
    }

    #[test]
    fn empty_mask_has_no_hulls() {
        assert!(extract(&Mask::new(20, 20)).is_empty());
    }

    #[test]
    fn filled_rectangle_hull_is_its_corners() {
        let mut mask = Mask::new(40, 50);
        fill(&mut mask, 10..30, 20..40);
        let hulls = extract(&mask);
        assert_eq!(hulls.len(), 1);
        let hull = &hulls[0];
        assert_eq!(hull.len(), 4);
        for corner in [(10, 20), (29, 20), (29, 39), (10, 39)] {
            assert!(hull.points.contains(&Point2::new(corner.0, corner.1)));
        }
    }

    #[test]
    fn hulls_follow_raster_order() {
        let mut mask = Mask::new(60, 60);
        fill(&mut mask, 40..50, 5..15); // top right
        fill(&mut mask, 5..15, 30..40); // bottom left
        fill(&mut mask, 30..35, 30..35); // bottom, further right
        let hulls = extract(&mask);
        assert_eq!(hulls.len(), 3);
        let tops: Vec<i32> = hulls
            .iter()
            .map(|h| h.points.iter().map(|p| p.y).min().unwrap())
            .collect();
        let lefts: Vec<i32> = hulls
            .iter()
            .map(|h| h.points.iter().map(|p| p.x).min().unwrap())
            .collect();
        assert_eq!(tops, vec![5, 30, 30]);
        assert_eq!(lefts, vec![40, 5, 30]);
    }

    #[test]
    fn hole_border_is_reported_after_its_outer_border() {
        let mut mask = Mask::new(30, 30);
        fill(&mut mask, 5..25, 5..25);
        for y in 10..20 {
            for x in 10..20 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        let hulls = extract(&mask);
        assert_eq!(hulls.len(), 2);
        let outer = hulls[0].moments().area();
        let hole = hulls[1].moments().area();
        assert!(outer > hole, "outer={outer} hole={hole}");
        assert!(hole > 0.0);
    }

    #[test]
    fn blob_touching_every_edge_has_a_border() {
        let mut mask = Mask::new(12, 9);
        fill(&mut mask, 0..12, 0..9);
        let hulls = extract(&mask);
        assert_eq!(hulls.len(), 1);
        for corner in [(0, 0), (11, 0), (11, 8), (0, 8)] {
            assert!(hulls[0].points.contains(&Point2::new(corner.0, corner.1)));
        }
    }

    #[test]
    fn isolated_pixel_gives_degenerate_hull() {
        let mut mask = Mask::new(8, 8);
        mask.put_pixel(3, 4, Luma([MASK_ON]));
        let hulls = extract(&mask);
        assert_eq!(hulls.len(), 1);
        assert!(hulls[0].len() < 3);
    }
}
