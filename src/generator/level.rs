/*
level.rs

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

//! Level configuration and generated levels.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::difficulty::Tier;
use super::grid::Grid;
use super::path::Path;
use crate::config;

/// Shape of a level: grid side, number of labels, and requested tier.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleConfig {
    pub grid_size: usize,
    pub number_count: usize,
    pub tier: Tier,
}

impl PuzzleConfig {
    pub fn new(grid_size: usize, number_count: usize, tier: Tier) -> Self {
        Self {
            grid_size,
            number_count,
            tier,
        }
    }

    /// Verify that the configuration can produce a level.
    ///
    /// # Errors
    ///
    /// Return a message when the grid side is not between 4 and 8, or when the number of labels
    /// is not between 3 and the number of cells.
    pub fn check(&self) -> Result<(), String> {
        if !(config::MIN_GRID_SIZE..=config::MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(format!(
                "grid size {} is not between {} and {}",
                self.grid_size,
                config::MIN_GRID_SIZE,
                config::MAX_GRID_SIZE
            ));
        }
        let cells: usize = self.grid_size * self.grid_size;
        if !(config::MIN_NUMBERS..=cells).contains(&self.number_count) {
            return Err(format!(
                "{} numbers do not fit a {}x{} grid (between {} and {cells})",
                self.number_count,
                self.grid_size,
                self.grid_size,
                config::MIN_NUMBERS
            ));
        }
        Ok(())
    }
}

impl fmt::Display for PuzzleConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{} with {} numbers ({})",
            self.grid_size, self.grid_size, self.number_count, self.tier
        )
    }
}

/// Generated level. The content cannot change once the level is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    number: u32,
    config: PuzzleConfig,
    grid: Grid,
    path: Path,

    /// Tier computed by [`super::difficulty::classify`] for this level.
    rated: Tier,
}

impl Level {
    pub(crate) fn new(number: u32, config: PuzzleConfig, grid: Grid, path: Path, rated: Tier) -> Self {
        Self {
            number,
            config,
            grid,
            path,
            rated,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Solution path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rated(&self) -> Tier {
        self.rated
    }
}
