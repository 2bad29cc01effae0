/*
path.rs

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

//! Path in the puzzle grid.

use rustc_hash::FxHashSet;

use super::topology::{self, Coord};

/// Path object.
#[derive(Debug, Default, Clone)]
pub struct Path {
    /// Path as an ordered list of cells.
    cells: Vec<Coord>,

    /// Stores the visited status of the cells.
    /// Instead of looking for the cell in the [`Path::cells`] vector, this
    /// [`rustc_hash::FxHashSet`] speeds up the lookup.
    visited: FxHashSet<Coord>,
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for Path {}

impl Path {
    /// Create an empty [`Path`] object for a grid of `num_cells` cells.
    pub fn new(num_cells: usize) -> Self {
        Self {
            cells: Vec::with_capacity(num_cells),
            visited: FxHashSet::with_capacity_and_hasher(num_cells, Default::default()),
        }
    }

    /// Create a [`Path`] object from a list of cells.
    pub fn from_cells(cells: &[Coord]) -> Self {
        let mut path: Path = Path::new(cells.len());
        for cell in cells {
            path.push(*cell);
        }
        path
    }

    /// Add a cell to the path.
    pub fn push(&mut self, cell: Coord) {
        self.cells.push(cell);
        self.visited.insert(cell);
    }

    /// Remove the last cell from the path.
    ///
    /// A path built by [`Path::from_cells`] can contain the same cell twice. The cell stays
    /// visited as long as one copy remains.
    pub fn pop(&mut self) {
        let unique: bool = self.visited.len() == self.cells.len();
        if let Some(c) = self.cells.pop() {
            if unique || !self.cells.contains(&c) {
                self.visited.remove(&c);
            }
        }
    }

    /// Get the number of cells in the path.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether the cell is in the path or not.
    pub fn contains(&self, cell: Coord) -> bool {
        self.visited.contains(&cell)
    }

    /// Return the ordered cells.
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Return the first cell in the path.
    pub fn first(&self) -> Option<Coord> {
        self.cells.first().copied()
    }

    /// Return the last cell in the path.
    pub fn last(&self) -> Option<Coord> {
        self.cells.last().copied()
    }

    /// Verify that the path visits every cell of a `size`×`size` grid exactly once, moving to a
    /// 4-adjacent cell at every step.
    ///
    /// # Errors
    ///
    /// Return a message describing the first problem found.
    pub fn check_hamiltonian(&self, size: usize) -> Result<(), String> {
        let expected: usize = size * size;
        if self.cells.len() != expected {
            return Err(format!(
                "path has {} cells instead of {expected}",
                self.cells.len()
            ));
        }
        if let Some(c) = self.cells.iter().find(|c| c.0 >= size || c.1 >= size) {
            return Err(format!("cell {c:?} is outside the {size}x{size} grid"));
        }
        // Duplicated cells are not recorded twice in the visited set
        if self.visited.len() != self.cells.len() {
            return Err("path visits a cell more than once".to_string());
        }
        if let Some(w) = self
            .cells
            .windows(2)
            .find(|w| !topology::adjacent(w[0], w[1]))
        {
            return Err(format!("cells {:?} and {:?} are not adjacent", w[0], w[1]));
        }
        Ok(())
    }
}
