// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall rasterization

use super::Grid;
use floorgrid_core::WallSegment;
use tracing::trace;

/// Integer Bresenham walk from `from` to `to`, both inclusive
///
/// Coordinates are `(row, col)`. The axis with the larger delta advances
/// every step, so the chain is 8-connected and exactly one cell wide.
pub fn line_cells(from: (i64, i64), to: (i64, i64)) -> Vec<(i64, i64)> {
    let (mut row, mut col) = from;
    let (row1, col1) = to;

    let dc = (col1 - col).abs();
    let dr = -(row1 - row).abs();
    let step_c = if col < col1 { 1 } else { -1 };
    let step_r = if row < row1 { 1 } else { -1 };
    let mut err = dc + dr;

    let mut cells = Vec::with_capacity((dc.max(-dr) + 1) as usize);
    loop {
        cells.push((row, col));
        if row == row1 && col == col1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dr {
            err += dr;
            col += step_c;
        }
        if e2 <= dc {
            err += dc;
            row += step_r;
        }
    }

    cells
}

/// Mark the cells a wall passes through, returning how many were inside the grid
///
/// Cells outside the grid are skipped; the rest of the wall is still drawn.
pub fn rasterize_wall(grid: &mut Grid, wall: &WallSegment) -> usize {
    let from = grid.cell_coords(wall.start);
    let to = grid.cell_coords(wall.end);

    let mut marked = 0;
    for (row, col) in line_cells(from, to) {
        if let Some((r, c)) = grid.in_bounds(row, col) {
            grid.set_wall(r, c);
            marked += 1;
        }
    }

    trace!(?from, ?to, marked, "rasterized wall");
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorgrid_core::Point2;

    fn is_eight_connected(cells: &[(i64, i64)]) -> bool {
        cells
            .windows(2)
            .all(|w| (w[0].0 - w[1].0).abs() <= 1 && (w[0].1 - w[1].1).abs() <= 1 && w[0] != w[1])
    }

    #[test]
    fn test_line_cells_octants() {
        for to in [(3, 7), (-3, 7), (7, -3), (-7, -3), (0, -5), (5, 0)] {
            let cells = line_cells((0, 0), to);
            let expected = to.0.abs().max(to.1.abs()) as usize + 1;

            assert_eq!(cells.len(), expected, "to {:?}", to);
            assert_eq!(cells.first(), Some(&(0, 0)));
            assert_eq!(cells.last(), Some(&to));
            assert!(is_eight_connected(&cells));
        }
    }

    #[test]
    fn test_horizontal_wall_stays_in_one_row() {
        let mut grid = Grid::empty(Point2::new(-5.0, -5.0), 10, 20, 1.0, 1.0);
        let wall = WallSegment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)).unwrap();

        let marked = rasterize_wall(&mut grid, &wall);

        assert_eq!(marked, 11);
        let rows: Vec<usize> = grid.iter().filter(|c| c.is_wall).map(|c| c.row).collect();
        assert_eq!(rows.len(), 11);
        assert!(rows.iter().all(|&r| r == 5));
    }

    #[test]
    fn test_wall_leaving_grid_is_clipped() {
        let mut grid = Grid::empty(Point2::new(0.0, 0.0), 4, 4, 1.0, 1.0);
        let wall = WallSegment::new(Point2::new(-3.0, 0.5), Point2::new(2.5, 0.5)).unwrap();

        assert_eq!(rasterize_wall(&mut grid, &wall), 3);
        assert!(grid.cell(0, 0).unwrap().is_wall);
        assert!(grid.cell(0, 2).unwrap().is_wall);
        assert!(!grid.cell(0, 3).unwrap().is_wall);
    }
}
