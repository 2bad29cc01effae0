/*
placer.rs

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

//! Place the labels along a path and validate a labelled grid.
//!
//! Labels 1..K are spread evenly along the path: label 1 on the first cell, label K on the last
//! cell, and the other labels every `(len - 1) / (K - 1)` cells.
//!
//! The validator walks the path and collects the labels in order. It is used on the grids built
//! by [`place`] and on the levels that come from outside the generator.

use log::debug;

use super::grid::Grid;
use super::path::Path;

/// Type of errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// The number of labels does not fit the path.
    #[error("cannot place {count} labels on a path of {len} cells")]
    Config { count: usize, len: usize },

    /// The labels do not follow the path.
    #[error("invalid labels: {0}")]
    Validation(String),
}

/// Return the path indexes that receive the labels 1..`count`.
pub fn label_positions(len: usize, count: usize) -> Vec<usize> {
    let step: usize = if count > 1 { (len - 1) / (count - 1) } else { 1 };
    (0..count)
        .map(|i| {
            if i == count - 1 {
                len - 1
            } else {
                i * step
            }
        })
        .collect()
}

/// Build the grid for the path with `count` labels.
///
/// # Errors
///
/// The function returns [`PlacementError::Config`] when `count` is not between 2 and the path
/// length, or when the path length is not a square.
pub fn place(path: &Path, count: usize) -> Result<Grid, PlacementError> {
    let len: usize = path.len();
    let size: usize = len.isqrt();
    if count < 2 || count > len || size * size != len {
        return Err(PlacementError::Config { count, len });
    }

    let mut grid: Grid = Grid::new(size);
    for (label, index) in label_positions(len, count).into_iter().enumerate() {
        grid.set(path.cells()[index], label as u32 + 1);
    }
    debug!("Placed {count} labels on a {size}x{size} grid");
    Ok(grid)
}

/// Verify that the labels of the grid are 1..K in path order, with label 1 on the first cell of
/// the path and label K on the last cell.
///
/// # Errors
///
/// The function returns [`PlacementError::Validation`] describing the first problem found.
pub fn validate(grid: &Grid, path: &Path) -> Result<(), PlacementError> {
    let fail = |msg: String| -> Result<(), PlacementError> {
        Err(PlacementError::Validation(msg))
    };

    if grid.size() * grid.size() != path.len() {
        return fail(format!(
            "path of {} cells for a {}x{} grid",
            path.len(),
            grid.size(),
            grid.size()
        ));
    }

    let labels: Vec<(usize, u32)> = path
        .cells()
        .iter()
        .enumerate()
        .map(|(i, c)| (i, grid.get(*c)))
        .filter(|(_, v)| *v > 0)
        .collect();

    if labels.len() < 2 {
        return fail(format!("{} labels found on the path", labels.len()));
    }
    if labels.len() != grid.label_count() {
        return fail("some labels are not on the path".to_string());
    }
    if let Some((pos, (index, value))) = labels
        .iter()
        .enumerate()
        .find(|(pos, (_, value))| *value as usize != pos + 1)
    {
        return fail(format!(
            "label {value} at path index {index} where label {} was expected",
            pos + 1
        ));
    }
    if labels[0].0 != 0 {
        return fail(format!("label 1 is at path index {}", labels[0].0));
    }
    let (last_index, last_value) = labels[labels.len() - 1];
    if last_index != path.len() - 1 {
        return fail(format!("label {last_value} is at path index {last_index}"));
    }
    Ok(())
}
