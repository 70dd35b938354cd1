// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radial line-of-sight
//!
//! Casts evenly spaced rays from an observer against the open wall set and
//! keeps the nearest hit per ray. Rays are ordered by angle, so the result is
//! a star-shaped polygon around the observer.

use crate::reconcile::subtract_doors;
use floorgrid_core::{FloorPlan, Point2, WallSegment};
use floorgrid_geometry::{point_in_polygon, polygon_area, segment_intersection};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::debug;

/// Visibility solver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Maximum sight distance in world units
    pub radius: f64,
    /// Rays cast over the full circle
    pub ray_count: u32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            radius: 500.0,
            ray_count: 360,
        }
    }
}

/// Ordered ray endpoints, one per ray; the last point wraps to the first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisibilityPolygon {
    pub observer: Point2,
    pub points: Vec<Point2>,
}

impl VisibilityPolygon {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Visible area
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    pub fn contains(&self, p: Point2) -> bool {
        point_in_polygon(p, &self.points)
    }
}

/// Cast `ray_count` rays of length `radius` from `observer`
///
/// Ray `i` points at angle `2π·i/ray_count`. A hit replaces the current
/// endpoint only when strictly closer, so ties keep the first wall found.
/// Zero rays or a non-positive radius give an empty polygon.
pub fn compute_visibility(
    observer: Point2,
    radius: f64,
    ray_count: u32,
    walls: &[WallSegment],
) -> VisibilityPolygon {
    if ray_count == 0 || !(radius > 0.0) || !observer.is_finite() {
        return VisibilityPolygon {
            observer,
            points: Vec::new(),
        };
    }

    let step = TAU / ray_count as f64;
    let points = (0..ray_count)
        .map(|i| {
            let angle = i as f64 * step;
            let ray_end = Point2::new(
                observer.x + angle.cos() * radius,
                observer.y + angle.sin() * radius,
            );

            let mut closest = ray_end;
            let mut min_distance = radius;
            for wall in walls {
                if let Some(hit) = segment_intersection(observer, ray_end, wall.start, wall.end) {
                    let distance = observer.distance_to(&hit);
                    if distance < min_distance {
                        min_distance = distance;
                        closest = hit;
                    }
                }
            }
            closest
        })
        .collect();

    VisibilityPolygon { observer, points }
}

/// Reconcile the plan's walls with its doors, then cast rays
pub fn visibility_for_plan(
    plan: &FloorPlan,
    observer: Point2,
    config: &VisibilityConfig,
) -> VisibilityPolygon {
    let open_walls = subtract_doors(&plan.walls, &plan.doors);
    let polygon = compute_visibility(observer, config.radius, config.ray_count, &open_walls);

    debug!(
        observer_x = observer.x,
        observer_y = observer.y,
        rays = polygon.len(),
        area = polygon.area(),
        "computed visibility"
    );
    polygon
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn wall(a: Point2, b: Point2) -> WallSegment {
        WallSegment::new(a, b).unwrap()
    }

    #[test]
    fn test_no_walls_full_radius() {
        let observer = p(3.0, -2.0);
        let poly = compute_visibility(observer, 10.0, 8, &[]);

        assert_eq!(poly.len(), 8);
        for point in &poly.points {
            assert_relative_eq!(observer.distance_to(point), 10.0, epsilon = 1e-9);
        }
        assert_relative_eq!(poly.points[0].x, 13.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(compute_visibility(p(0.0, 0.0), 10.0, 0, &[]).is_empty());
        assert!(compute_visibility(p(0.0, 0.0), 0.0, 8, &[]).is_empty());
        assert!(compute_visibility(p(0.0, 0.0), -1.0, 8, &[]).is_empty());
    }

    #[test]
    fn test_nearest_wall_blocks() {
        let walls = [
            wall(p(8.0, -5.0), p(8.0, 5.0)),
            wall(p(4.0, -5.0), p(4.0, 5.0)),
        ];
        let poly = compute_visibility(p(0.0, 0.0), 10.0, 4, &walls);

        // Ray 0 points along +X and stops at the nearer wall
        assert_relative_eq!(poly.points[0].x, 4.0, epsilon = 1e-9);
        // Ray 2 points along -X and is unobstructed
        assert_relative_eq!(poly.points[2].x, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_closed_room_bounds_visible_area() {
        let walls = [
            wall(p(-2.0, -2.0), p(2.0, -2.0)),
            wall(p(2.0, -2.0), p(2.0, 2.0)),
            wall(p(2.0, 2.0), p(-2.0, 2.0)),
            wall(p(-2.0, 2.0), p(-2.0, -2.0)),
        ];
        let poly = compute_visibility(p(0.0, 0.0), 100.0, 360, &walls);

        assert!(poly.area() <= 16.0 + 1e-6);
        assert!(poly.area() > 15.0);
        assert!(poly.contains(p(1.0, 1.0)));
        assert!(!poly.contains(p(3.0, 0.0)));
    }

    #[test]
    fn test_door_gap_lets_sight_through() {
        let plan = FloorPlan::new(
            vec![wall(p(5.0, -10.0), p(5.0, 10.0))],
            vec![floorgrid_core::DoorOpening::from_corners([
                p(4.0, -1.0),
                p(6.0, -1.0),
                p(6.0, 1.0),
                p(4.0, 1.0),
            ])
            .unwrap()],
            vec![],
        );
        let config = VisibilityConfig {
            radius: 20.0,
            ray_count: 4,
        };

        let poly = visibility_for_plan(&plan, p(0.0, 0.0), &config);
        assert_relative_eq!(poly.points[0].x, 20.0, epsilon = 1e-9);

        let blocked = compute_visibility(p(0.0, 0.0), 20.0, 4, &plan.walls);
        assert_relative_eq!(blocked.points[0].x, 5.0, epsilon = 1e-9);
    }
}
