/*
grid.rs

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

//! Labelled puzzle grid.
//!
//! A cell holds 0 when it has no label, or the label value otherwise.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

use super::topology::Coord;

/// Grid object. Cells are stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<u32>,
}

impl Grid {
    /// Create an empty `size`×`size` [`Grid`].
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Create a [`Grid`] from its rows.
    ///
    /// # Errors
    ///
    /// Return a message when the rows do not form a square matrix.
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self, String> {
        let size: usize = rows.len();
        if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(format!(
                "row {i} has {} cells instead of {size}",
                r.len()
            ));
        }
        Ok(Self {
            size,
            cells: rows.concat(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Return the label of the cell (0 when unlabelled).
    pub fn get(&self, cell: Coord) -> u32 {
        self.cells[cell.0 * self.size + cell.1]
    }

    /// Set the label of the cell.
    pub fn set(&mut self, cell: Coord, value: u32) {
        self.cells[cell.0 * self.size + cell.1] = value;
    }

    /// Number of labelled cells.
    pub fn label_count(&self) -> usize {
        self.cells.iter().filter(|v| **v > 0).count()
    }

    /// Return the grid as a list of rows.
    pub fn rows(&self) -> Vec<Vec<u32>> {
        self.cells.chunks(self.size).map(|r| r.to_vec()).collect()
    }

    /// Stable hash of the grid content.
    ///
    /// The hash covers the size and the row-major cell values, so two grids with the same labels
    /// at the same positions always have the same hash.
    pub fn content_hash(&self) -> u64 {
        let mut hasher: FxHasher = FxHasher::default();
        self.size.hash(&mut hasher);
        self.cells.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_round_trip() {
        let rows: Vec<Vec<u32>> = vec![vec![1, 0, 0], vec![0, 2, 0], vec![0, 0, 3]];
        let grid: Grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(grid.size(), 3);
        assert_eq!(grid.get((1, 1)), 2);
        assert_eq!(grid.label_count(), 3);
        assert_eq!(grid.rows(), rows);
    }

    #[test]
    fn rejects_non_square_rows() {
        assert!(Grid::from_rows(&[vec![0, 0], vec![0]]).is_err());
    }

    #[test]
    fn hash_follows_content() {
        let mut a: Grid = Grid::new(4);
        let mut b: Grid = Grid::new(4);
        a.set((0, 0), 1);
        b.set((0, 0), 1);
        assert_eq!(a.content_hash(), b.content_hash());
        b.set((3, 3), 2);
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
