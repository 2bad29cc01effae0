/*
topology.rs

Copyright 2025 Hervé Quatremain

This file is part of PuzzlePath.

PuzzlePath is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

PuzzlePath is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
PuzzlePath. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Square grid topology.
//!
//! Cells are addressed by `(x, y)` where `x` is the row and `y` the column.
//! Two cells are connected when their Manhattan distance is exactly one.

/// Cell coordinates as `(row, column)`.
pub type Coord = (usize, usize);

/// Base direction order: right, down, left, up.
pub const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Whether the signed coordinates are inside a `size`×`size` grid.
pub fn in_bounds(size: usize, x: isize, y: isize) -> bool {
    x >= 0 && y >= 0 && (x as usize) < size && (y as usize) < size
}

/// Move one step from `cell` in the given direction, or None when leaving the grid.
pub fn step(size: usize, cell: Coord, direction: (isize, isize)) -> Option<Coord> {
    let x: isize = cell.0 as isize + direction.0;
    let y: isize = cell.1 as isize + direction.1;
    if in_bounds(size, x, y) {
        Some((x as usize, y as usize))
    } else {
        None
    }
}

/// Neighbors of `cell` in the given direction order.
pub fn neighbors_in(size: usize, cell: Coord, directions: &[(isize, isize)]) -> Vec<Coord> {
    directions
        .iter()
        .filter_map(|d| step(size, cell, *d))
        .collect()
}

/// Neighbors of `cell` in the base direction order.
pub fn neighbors4(size: usize, cell: Coord) -> Vec<Coord> {
    neighbors_in(size, cell, &DIRECTIONS)
}

/// Whether the two cells are 4-adjacent.
pub fn adjacent(a: Coord, b: Coord) -> bool {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1) == 1
}

/// Whether `cell` is one of the four corners.
pub fn is_corner(size: usize, cell: Coord) -> bool {
    let last: usize = size - 1;
    (cell.0 == 0 || cell.0 == last) && (cell.1 == 0 || cell.1 == last)
}

/// Whether `cell` is on the border of the grid. Corners are border cells too.
pub fn is_border(size: usize, cell: Coord) -> bool {
    let last: usize = size - 1;
    cell.0 == 0 || cell.0 == last || cell.1 == 0 || cell.1 == last
}

/// Manhattan distance from `cell` to the center cell `(size / 2, size / 2)`.
pub fn center_distance(size: usize, cell: Coord) -> usize {
    let center: usize = size / 2;
    cell.0.abs_diff(center) + cell.1.abs_diff(center)
}

/// Whether a Hamiltonian path can join the two cells.
///
/// Color the grid like a checkerboard. A path alternates colors, so with an even number of cells
/// the endpoints have different colors, and with an odd number of cells both endpoints are on the
/// majority color (the color of `(0, 0)`).
/// For grids of side 4 or more this condition is also sufficient.
pub fn endpoints_compatible(size: usize, start: Coord, end: Coord) -> bool {
    if start == end {
        return false;
    }
    let color = |c: Coord| (c.0 + c.1) % 2;
    if (size * size) % 2 == 0 {
        color(start) != color(end)
    } else {
        color(start) == 0 && color(end) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_follow_base_order() {
        assert_eq!(neighbors4(4, (1, 1)), vec![(1, 2), (2, 1), (1, 0), (0, 1)]);
        assert_eq!(neighbors4(4, (0, 0)), vec![(0, 1), (1, 0)]);
        assert_eq!(neighbors4(4, (3, 3)), vec![(3, 2), (2, 3)]);
    }

    #[test]
    fn bounds() {
        assert!(in_bounds(4, 0, 3));
        assert!(!in_bounds(4, -1, 0));
        assert!(!in_bounds(4, 0, 4));
    }

    #[test]
    fn corners_and_borders() {
        assert!(is_corner(5, (4, 0)));
        assert!(!is_corner(5, (2, 0)));
        assert!(is_border(5, (2, 0)));
        assert!(!is_border(5, (2, 2)));
        assert_eq!(center_distance(6, (0, 0)), 6);
        assert_eq!(center_distance(6, (3, 3)), 0);
    }

    #[test]
    fn endpoint_colors() {
        // Even grid: endpoints on different colors
        assert!(endpoints_compatible(4, (0, 0), (0, 3)));
        assert!(!endpoints_compatible(4, (0, 0), (3, 3)));
        // Odd grid: both endpoints on the color of the corners
        assert!(endpoints_compatible(5, (0, 0), (4, 4)));
        assert!(!endpoints_compatible(5, (0, 0), (0, 1)));
        assert!(!endpoints_compatible(5, (2, 2), (2, 2)));
    }
}
