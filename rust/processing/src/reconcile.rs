// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall–door reconciliation in vector space
//!
//! Produces the open wall set used for line-of-sight: every wall is split
//! where it crosses a door edge and the pieces lying inside a door are
//! removed. The grid builder classifies wall and door cells on its own.

use floorgrid_core::{DoorOpening, WallSegment};
use floorgrid_geometry::{segment_intersection, split_segment_at_points, POINT_MERGE_EPSILON};
use tracing::debug;

/// Subtract door openings from walls
pub fn subtract_doors(walls: &[WallSegment], doors: &[DoorOpening]) -> Vec<WallSegment> {
    if doors.is_empty() {
        return walls.to_vec();
    }

    let mut open = Vec::with_capacity(walls.len());

    for wall in walls {
        let cuts: Vec<_> = doors
            .iter()
            .flat_map(|door| door.edges())
            .filter_map(|(e1, e2)| segment_intersection(wall.start, wall.end, e1, e2))
            .collect();

        for (a, b) in split_segment_at_points(wall.start, wall.end, &cuts, POINT_MERGE_EPSILON) {
            let mid = a.midpoint(&b);
            if doors.iter().any(|door| door.contains(mid)) {
                continue;
            }
            if let Some(piece) = WallSegment::new(a, b) {
                open.push(piece);
            }
        }
    }

    debug!(walls = walls.len(), open = open.len(), "subtracted doors from walls");
    open
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use floorgrid_core::Point2;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn rect_door(x0: f64, y0: f64, x1: f64, y1: f64) -> DoorOpening {
        DoorOpening::from_corners([p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)]).unwrap()
    }

    #[test]
    fn test_door_cuts_gap_in_wall() {
        let walls = [WallSegment::new(p(0.0, 0.0), p(10.0, 0.0)).unwrap()];
        let doors = [rect_door(4.0, -1.0, 6.0, 1.0)];

        let open = subtract_doors(&walls, &doors);

        assert_eq!(open.len(), 2);
        assert_eq!(open[0].start, p(0.0, 0.0));
        assert_relative_eq!(open[0].end.x, 4.0);
        assert_relative_eq!(open[1].start.x, 6.0);
        assert_eq!(open[1].end, p(10.0, 0.0));
    }

    #[test]
    fn test_untouched_walls_pass_through() {
        let walls = [
            WallSegment::new(p(0.0, 0.0), p(10.0, 0.0)).unwrap(),
            WallSegment::new(p(0.0, 5.0), p(0.0, 9.0)).unwrap(),
        ];
        let doors = [rect_door(4.0, 2.0, 6.0, 3.0)];

        assert_eq!(subtract_doors(&walls, &doors), walls.to_vec());
        assert_eq!(subtract_doors(&walls, &[]), walls.to_vec());
    }

    #[test]
    fn test_wall_fully_inside_door_disappears() {
        let walls = [WallSegment::new(p(4.5, 0.0), p(5.5, 0.0)).unwrap()];
        let doors = [rect_door(4.0, -1.0, 6.0, 1.0)];

        assert!(subtract_doors(&walls, &doors).is_empty());
    }

    #[test]
    fn test_wall_ending_on_door_edge() {
        // Wall stops exactly on the door's left edge; no zero-length piece
        let walls = [WallSegment::new(p(0.0, 0.0), p(4.0, 0.0)).unwrap()];
        let doors = [rect_door(4.0, -1.0, 6.0, 1.0)];

        let open = subtract_doors(&walls, &doors);
        assert_eq!(open.len(), 1);
        assert_relative_eq!(open[0].length(), 4.0);
    }
}
