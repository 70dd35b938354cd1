// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D geometry kernel
//!
//! Pure functions over [`Point2`] used by the reconciler, the grid builder and
//! the visibility solver. None of them panic on degenerate input: zero-length
//! segments, coincident points and short polygons return `None`, `0.0` or the
//! nearest endpoint.

use crate::Point2;

/// Determinant magnitude below which two segments are treated as parallel
pub const PARALLEL_EPSILON: f64 = 1e-10;

/// Default merge distance for intersection points lying on the same segment
pub const POINT_MERGE_EPSILON: f64 = 1e-6;

/// Intersect segment `a1-a2` with segment `b1-b2`
///
/// Solves the 2x2 parametric system `a1 + t(a2 - a1) = b1 + u(b2 - b1)`.
/// Returns `None` when the segments are parallel (or either is degenerate)
/// or when the intersection falls outside either segment.
#[inline]
pub fn segment_intersection(a1: Point2, a2: Point2, b1: Point2, b2: Point2) -> Option<Point2> {
    let denom = (a1.x - a2.x) * (b1.y - b2.y) - (a1.y - a2.y) * (b1.x - b2.x);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = ((a1.x - b1.x) * (b1.y - b2.y) - (a1.y - b1.y) * (b1.x - b2.x)) / denom;
    let u = -((a1.x - a2.x) * (a1.y - b1.y) - (a1.y - a2.y) * (a1.x - b1.x)) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point2::new(a1.x + t * (a2.x - a1.x), a1.y + t * (a2.y - a1.y)))
    } else {
        None
    }
}

/// Even-odd ray crossing test
///
/// The polygon is implicitly closed. Points exactly on the boundary may land
/// on either side. Polygons with fewer than 3 vertices contain nothing.
pub fn point_in_polygon(p: Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];

        // (pi.y > p.y) != (pj.y > p.y) guarantees pj.y != pi.y below
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Project `p` onto segment `a-b`, clamped to the segment
#[inline]
pub fn closest_point_on_segment(p: Point2, a: Point2, b: Point2) -> Point2 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < PARALLEL_EPSILON {
        return a;
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    Point2::new(a.x + t * dx, a.y + t * dy)
}

/// Distance from `p` to the closest point of segment `a-b`
#[inline]
pub fn point_segment_distance(p: Point2, a: Point2, b: Point2) -> f64 {
    p.distance_to(&closest_point_on_segment(p, a, b))
}

/// Polygon area using the shoelace formula
///
/// Always non-negative, independent of winding order.
pub fn polygon_area(polygon: &[Point2]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += polygon[i].x * polygon[j].y;
        area -= polygon[j].x * polygon[i].y;
    }

    (area / 2.0).abs()
}

/// Remove points lying within `eps` of an earlier point, keeping first occurrences
pub fn dedup_points(points: &[Point2], eps: f64) -> Vec<Point2> {
    let mut unique: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if !unique.iter().any(|q| q.distance_to(p) < eps) {
            unique.push(*p);
        }
    }
    unique
}

/// Split segment `a-b` at the given points
///
/// Split points are merged within `eps`, ordered by distance from `a`, and
/// pieces shorter than `eps` are dropped, so an intersection that coincides
/// with an endpoint never yields a zero-length piece.
pub fn split_segment_at_points(
    a: Point2,
    b: Point2,
    points: &[Point2],
    eps: f64,
) -> Vec<(Point2, Point2)> {
    let mut cuts = dedup_points(points, eps);
    cuts.sort_by(|p, q| a.distance_to(p).total_cmp(&a.distance_to(q)));

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut prev = a;
    for cut in cuts.into_iter().chain(std::iter::once(b)) {
        if prev.distance_to(&cut) >= eps {
            pieces.push((prev, cut));
            prev = cut;
        }
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_crossing_segments_intersect() {
        let hit = segment_intersection(p(0.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(10.0, 0.0))
            .expect("diagonals cross");

        assert_relative_eq!(hit.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(hit.y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_intersection_lies_on_both_segments() {
        let (a1, a2) = (p(-3.0, 1.0), p(7.0, 4.0));
        let (b1, b2) = (p(0.0, 6.0), p(2.0, -5.0));
        let hit = segment_intersection(a1, a2, b1, b2).expect("segments cross");

        assert!(point_segment_distance(hit, a1, a2) < 1e-9);
        assert!(point_segment_distance(hit, b1, b2) < 1e-9);
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        assert!(segment_intersection(p(0.0, 0.0), p(10.0, 0.0), p(0.0, 1.0), p(10.0, 1.0)).is_none());
        // Collinear overlap is also reported as parallel
        assert!(segment_intersection(p(0.0, 0.0), p(10.0, 0.0), p(5.0, 0.0), p(15.0, 0.0)).is_none());
    }

    #[test]
    fn test_out_of_range_intersection() {
        // Lines cross at (5, 0) but the second segment stops short of it
        assert!(segment_intersection(p(0.0, 0.0), p(10.0, 0.0), p(5.0, 1.0), p(5.0, 3.0)).is_none());
    }

    #[test]
    fn test_degenerate_segment() {
        assert!(segment_intersection(p(1.0, 1.0), p(1.0, 1.0), p(0.0, 0.0), p(2.0, 2.0)).is_none());
        assert_eq!(closest_point_on_segment(p(5.0, 5.0), p(1.0, 1.0), p(1.0, 1.0)), p(1.0, 1.0));
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)];

        assert!(point_in_polygon(p(5.0, 5.0), &square));
        assert!(!point_in_polygon(p(15.0, 5.0), &square));
        assert!(!point_in_polygon(p(5.0, 5.0), &square[..2]));
    }

    #[test]
    fn test_point_in_polygon_on_vertex_is_stable() {
        let tri = [p(0.0, 0.0), p(4.0, 0.0), p(0.0, 3.0)];
        for v in tri {
            // Either answer is acceptable; it must simply not panic
            let _ = point_in_polygon(v, &tri);
        }
    }

    #[test]
    fn test_closest_point_clamps() {
        let a = p(0.0, 0.0);
        let b = p(10.0, 0.0);

        assert_eq!(closest_point_on_segment(p(5.0, 3.0), a, b), p(5.0, 0.0));
        assert_eq!(closest_point_on_segment(p(-4.0, 3.0), a, b), a);
        assert_eq!(closest_point_on_segment(p(14.0, -3.0), a, b), b);
        assert_relative_eq!(point_segment_distance(p(5.0, 5.0), a, b), 5.0);
    }

    #[test]
    fn test_polygon_area_orientation_independent() {
        let ccw = [p(0.0, 0.0), p(4.0, 0.0), p(4.0, 3.0), p(0.0, 3.0)];
        let cw: Vec<Point2> = ccw.iter().rev().copied().collect();

        assert_relative_eq!(polygon_area(&ccw), 12.0);
        assert_relative_eq!(polygon_area(&cw), 12.0);
        assert_eq!(polygon_area(&ccw[..2]), 0.0);
    }

    #[test]
    fn test_split_merges_duplicates_and_drops_zero_length() {
        let a = p(0.0, 0.0);
        let b = p(10.0, 0.0);
        let cuts = [p(6.0, 0.0), p(4.0, 0.0), p(4.0 + 1e-9, 0.0), a];

        let pieces = split_segment_at_points(a, b, &cuts, POINT_MERGE_EPSILON);

        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0], (a, p(4.0, 0.0)));
        assert_eq!(pieces[1], (p(4.0, 0.0), p(6.0, 0.0)));
        assert_eq!(pieces[2], (p(6.0, 0.0), b));
    }
}
