// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan data model
//!
//! Constructors validate the geometric invariants and return `None` for
//! degenerate input, so a value of these types is always usable downstream.

use crate::bounds::Aabb;
use floorgrid_geometry::{point_in_polygon, polygon_area, Point2};
use serde::{Deserialize, Serialize};

/// Doors with a smaller footprint than this are degenerate
pub const MIN_DOOR_AREA: f64 = 1e-9;

/// Straight wall centerline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WallSegment {
    pub start: Point2,
    pub end: Point2,
}

impl WallSegment {
    /// Returns `None` for zero-length or non-finite segments
    pub fn new(start: Point2, end: Point2) -> Option<Self> {
        if !start.is_finite() || !end.is_finite() || start.distance_to(&end) <= 0.0 {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn midpoint(&self) -> Point2 {
        self.start.midpoint(&self.end)
    }
}

/// Axis a door opening runs along
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DoorOrientation {
    /// Opening runs along X (sits in a horizontal wall)
    Horizontal,
    /// Opening runs along Y (sits in a vertical wall)
    Vertical,
}

/// Door opening given by four corner points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DoorOpening {
    corners: [Point2; 4],
}

impl DoorOpening {
    /// Returns `None` if any corner is non-finite or the bbox has no area
    ///
    /// Corners may come in any order. They are stored counter-clockwise
    /// around their centroid; if that outline still has no area (collinear
    /// corners spanning a diagonal) the bbox rectangle is used instead.
    pub fn from_corners(corners: [Point2; 4]) -> Option<Self> {
        if corners.iter().any(|p| !p.is_finite()) {
            return None;
        }
        let bbox = Aabb::from_points(&corners);
        if bbox.width() * bbox.height() < MIN_DOOR_AREA {
            return None;
        }

        let ordered = angular_order(corners);
        let corners = if polygon_area(&ordered) < MIN_DOOR_AREA {
            [
                bbox.min,
                Point2::new(bbox.max.x, bbox.min.y),
                bbox.max,
                Point2::new(bbox.min.x, bbox.max.y),
            ]
        } else {
            ordered
        };
        Some(Self { corners })
    }

    /// Widen a legacy two-point door into a quad `depth` thick, centred on the segment
    pub fn from_segment(a: Point2, b: Point2, depth: f64) -> Option<Self> {
        let length = a.distance_to(&b);
        if !(length > 0.0) || !(depth > 0.0) {
            return None;
        }

        let half = depth / 2.0;
        let nx = -(b.y - a.y) / length * half;
        let ny = (b.x - a.x) / length * half;

        Self::from_corners([
            Point2::new(a.x + nx, a.y + ny),
            Point2::new(b.x + nx, b.y + ny),
            Point2::new(b.x - nx, b.y - ny),
            Point2::new(a.x - nx, a.y - ny),
        ])
    }

    pub fn corners(&self) -> &[Point2; 4] {
        &self.corners
    }

    pub fn bbox(&self) -> Aabb {
        Aabb::from_points(&self.corners)
    }

    /// Horizontal when the bbox is wider than tall
    pub fn orientation(&self) -> DoorOrientation {
        let bbox = self.bbox();
        if bbox.width() > bbox.height() {
            DoorOrientation::Horizontal
        } else {
            DoorOrientation::Vertical
        }
    }

    /// Shorter side of the bbox
    pub fn effective_width(&self) -> f64 {
        let bbox = self.bbox();
        bbox.width().min(bbox.height())
    }

    /// The four closed edges, in corner order
    pub fn edges(&self) -> [(Point2, Point2); 4] {
        let c = &self.corners;
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    pub fn center(&self) -> Point2 {
        self.bbox().center()
    }

    pub fn contains(&self, p: Point2) -> bool {
        point_in_polygon(p, &self.corners)
    }
}

/// Sort corners counter-clockwise by angle around their centroid
fn angular_order(mut corners: [Point2; 4]) -> [Point2; 4] {
    let cx = corners.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = corners.iter().map(|p| p.y).sum::<f64>() / 4.0;
    corners.sort_by(|a, b| {
        (a.y - cy)
            .atan2(a.x - cx)
            .total_cmp(&(b.y - cy).atan2(b.x - cx))
    });
    corners
}

/// Room outline, implicitly closed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomPolygon {
    points: Vec<Point2>,
}

impl RoomPolygon {
    /// Returns `None` with fewer than 3 points or any non-finite point
    pub fn new(points: Vec<Point2>) -> Option<Self> {
        if points.len() < 3 || points.iter().any(|p| !p.is_finite()) {
            return None;
        }
        Some(Self { points })
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }
}

/// Vector floor plan: the immutable input to every stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloorPlan {
    pub walls: Vec<WallSegment>,
    pub doors: Vec<DoorOpening>,
    pub rooms: Vec<RoomPolygon>,
}

impl FloorPlan {
    pub fn new(walls: Vec<WallSegment>, doors: Vec<DoorOpening>, rooms: Vec<RoomPolygon>) -> Self {
        Self { walls, doors, rooms }
    }

    /// No walls and no doors
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty() && self.doors.is_empty()
    }

    /// Bounds over wall endpoints and door corners; invalid for an empty plan
    pub fn extent(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        for wall in &self.walls {
            bounds.expand(wall.start);
            bounds.expand(wall.end);
        }
        for door in &self.doors {
            bounds.union(&door.bbox());
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_wall_rejects_zero_length() {
        assert!(WallSegment::new(p(1.0, 1.0), p(1.0, 1.0)).is_none());
        assert!(WallSegment::new(p(0.0, 0.0), p(f64::NAN, 1.0)).is_none());

        let wall = WallSegment::new(p(0.0, 0.0), p(3.0, 4.0)).unwrap();
        assert_relative_eq!(wall.length(), 5.0);
    }

    #[test]
    fn test_door_queries() {
        let door =
            DoorOpening::from_corners([p(10.0, 4.0), p(20.0, 4.0), p(20.0, 6.0), p(10.0, 6.0)])
                .unwrap();

        assert_eq!(door.orientation(), DoorOrientation::Horizontal);
        assert_relative_eq!(door.effective_width(), 2.0);
        assert_eq!(door.center(), p(15.0, 5.0));
        assert!(door.contains(p(12.0, 5.0)));
        assert_eq!(door.edges()[3], (p(10.0, 6.0), p(10.0, 4.0)));
    }

    #[test]
    fn test_square_door_is_vertical() {
        let door =
            DoorOpening::from_corners([p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0)])
                .unwrap();
        assert_eq!(door.orientation(), DoorOrientation::Vertical);
    }

    #[test]
    fn test_zero_area_door_rejected() {
        let flat = [p(0.0, 0.0), p(5.0, 0.0), p(5.0, 0.0), p(0.0, 0.0)];
        assert!(DoorOpening::from_corners(flat).is_none());
    }

    #[test]
    fn test_corner_order_does_not_matter() {
        let crossed =
            DoorOpening::from_corners([p(18.0, -1.0), p(22.0, 1.0), p(22.0, -1.0), p(18.0, 1.0)])
                .unwrap();

        assert_relative_eq!(polygon_area(crossed.corners()), 8.0);
        assert_eq!(crossed.orientation(), DoorOrientation::Horizontal);
        assert!(crossed.contains(p(20.0, 0.0)));
        assert!(!crossed.contains(p(23.0, 0.0)));
        let edge_length: f64 = crossed.edges().iter().map(|(a, b)| a.distance_to(b)).sum();
        assert_relative_eq!(edge_length, 12.0);
    }

    #[test]
    fn test_collinear_diagonal_corners_fall_back_to_bbox() {
        let door =
            DoorOpening::from_corners([p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0), p(3.0, 3.0)])
                .unwrap();

        assert_relative_eq!(polygon_area(door.corners()), 9.0);
        assert!(door.contains(p(2.5, 0.5)));
    }

    #[test]
    fn test_legacy_segment_is_widened() {
        let door = DoorOpening::from_segment(p(0.0, 0.0), p(0.0, 10.0), 2.0).unwrap();
        let bbox = door.bbox();

        assert_relative_eq!(bbox.min.x, -1.0);
        assert_relative_eq!(bbox.max.x, 1.0);
        assert_relative_eq!(bbox.height(), 10.0);
        assert_eq!(door.orientation(), DoorOrientation::Vertical);
        assert!(DoorOpening::from_segment(p(0.0, 0.0), p(0.0, 0.0), 2.0).is_none());
    }

    #[test]
    fn test_plan_extent() {
        let plan = FloorPlan::new(
            vec![WallSegment::new(p(0.0, 0.0), p(10.0, 0.0)).unwrap()],
            vec![DoorOpening::from_corners([p(4.0, -1.0), p(6.0, -1.0), p(6.0, 12.0), p(4.0, 12.0)])
                .unwrap()],
            vec![],
        );
        let extent = plan.extent();

        assert_eq!(extent.min, p(0.0, -1.0));
        assert_eq!(extent.max, p(10.0, 12.0));
        assert!(!FloorPlan::default().extent().is_valid());
    }
}
