/*
generator.rs

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

//! Generate numbered path puzzle levels.
//!
//! A level is a square grid, between 4x4 and 8x8, with some cells labelled 1, 2, ..., K.
//! The player draws a path that visits every cell exactly once and goes through the labels in
//! order. Every level comes with its solution.
//!
//! Levels are built in three steps:
//!
//! * A Hamiltonian path is searched with a [`path_finder::PathFinder`] object.
//!   The search has a deadline, and returns an error when it takes too long.
//! * The labels are spread along the path by [`placer::place`], and the result is checked with
//!   [`placer::validate`]. The first label is always on the first cell of the path and the last
//!   label on the last cell.
//! * The level is scored by [`difficulty::classify`].
//!
//! A [`batch::LevelBatchBuilder`] object drives these steps for a whole batch, and uses a
//! [`dedup::DedupCache`] object to avoid issuing the same level twice.

pub mod batch;
pub mod dedup;
pub mod difficulty;
pub mod grid;
pub mod level;
pub mod path;
pub mod path_finder;
pub mod placer;
pub mod topology;
