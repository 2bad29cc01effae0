/*
path_finder.rs

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

//! Find a Hamiltonian path between two cells.
//!
//! The search is a depth-first backtracking that extends the path one cell at a time.
//! At each step the unvisited neighbors of the current cell are sorted so that the most
//! constrained cell is tried first (see [`PathFinder::score`]).
//!
//! Large grids can take a very long time to search, so the search stops after a wall-clock budget
//! that depends on the grid size (see [`config::search_deadline`]).

use log::debug;
use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::path;
use super::topology::{self, Coord};
use crate::config;

/// Score that forces the end cell to be selected when it completes the path.
const END_SCORE: i32 = -10000;

/// Penalty for moving to a corner that is not the end cell.
const CORNER_PENALTY: i32 = 5;

/// Penalty for moving to a border cell that is not the end cell.
const BORDER_PENALTY: i32 = 2;

/// Grids larger than this size get a penalty for cells far from the center.
const CENTER_BIAS_MIN_SIZE: usize = 5;

/// Grids larger than this size get new endpoints after [`RESAMPLE_AFTER`] failed attempts.
const RESAMPLE_MIN_SIZE: usize = 6;

const RESAMPLE_AFTER: usize = 5;

/// Type of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// No path found before the deadline.
    #[error("no path found before the deadline")]
    Timeout,

    /// All the attempts failed.
    #[error("no path found after all the attempts")]
    Exhausted,

    /// The caller raised the abort flag.
    #[error("path search cancelled")]
    Cancelled,
}

/// [`PathFinder`] object.
pub struct PathFinder {
    /// Grid side.
    pub size: usize,

    /// Number of recursive expansions during the last search.
    pub iteration: usize,

    /// Number of attempts used by the last search.
    pub attempts: usize,

    /// Duration in seconds of the last search.
    pub duration: f32,

    /// Seed of the pseudo-random generator. The generator is reset at every search so that the
    /// same inputs always give the same path.
    seed: u64,

    /// Wall-clock budget of a search.
    deadline: Duration,

    /// Maximum number of attempts of a search.
    max_attempts: usize,

    /// Optional flag that the caller can raise to stop the search.
    abort: Option<Arc<AtomicBool>>,

    /// Time when the search started.
    start: Instant,

    /// Direction order of the current attempt.
    directions: [(isize, isize); 4],

    /// End cell of the current attempt.
    end: Coord,
}

impl PathFinder {
    /// Create the object for a `size`×`size` grid.
    pub fn new(size: usize, seed: u64) -> Self {
        Self {
            size,
            iteration: 0,
            attempts: 0,
            duration: 0.0,
            seed,
            deadline: config::search_deadline(size),
            max_attempts: config::search_attempts(size),
            abort: None,
            start: Instant::now(),
            directions: topology::DIRECTIONS,
            end: (0, 0),
        }
    }

    /// Replace the default wall-clock budget.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Attach a flag that stops the search when raised.
    pub fn with_abort(mut self, abort: Arc<AtomicBool>) -> Self {
        self.abort = Some(abort);
        self
    }

    /// Find and return a path that starts at `start`, ends at `end`, and visits all the cells.
    ///
    /// For grids larger than 6, the endpoints are replaced by random ones after a few failed
    /// attempts. Use [`path::Path::first`] and [`path::Path::last`] to retrieve the endpoints of
    /// the returned path.
    ///
    /// # Errors
    ///
    /// The method returns an error when the deadline is exceeded, when all the attempts fail, or
    /// when the abort flag is raised.
    pub fn find(&mut self, start: Coord, end: Coord) -> Result<path::Path, PathError> {
        self.iteration = 0;
        self.attempts = 0;
        self.start = Instant::now();
        self.directions = topology::DIRECTIONS;

        let mut rng: ChaCha8Rng = ChaCha8Rng::seed_from_u64(self.seed);
        let num_cells: usize = self.size * self.size;
        let (mut start, mut end) = (start, end);

        let res: Result<path::Path, PathError> = loop {
            if self.attempts >= self.max_attempts {
                break Err(PathError::Exhausted);
            }
            self.attempts += 1;
            self.end = end;
            debug!(
                "Attempt {}/{}: start = {start:?}  end = {end:?}  directions = {:?}",
                self.attempts, self.max_attempts, self.directions
            );

            if topology::endpoints_compatible(self.size, start, end) {
                let mut path: path::Path = path::Path::new(num_cells);
                path.push(start);
                match self.extend(&mut path) {
                    Ok(true) => break Ok(path),
                    Ok(false) => debug!("    No path for these endpoints"),
                    Err(e) => break Err(e),
                }
            } else {
                debug!("    Endpoints cannot be joined by a Hamiltonian path");
            }

            // Try again with a different order for breaking ties
            self.directions.shuffle(&mut rng);
            if self.size > RESAMPLE_MIN_SIZE && self.attempts > RESAMPLE_AFTER {
                (start, end) = random_endpoints(self.size, &mut rng);
            }
        };

        self.duration = self.start.elapsed().as_secs_f32();
        debug!(
            "Iterations = {}  Attempts = {}  Duration = {}",
            self.iteration, self.attempts, self.duration
        );
        res
    }

    /// Recursively extend the path from its last cell.
    ///
    /// Return `Ok(true)` when the path is complete.
    fn extend(&mut self, path: &mut path::Path) -> Result<bool, PathError> {
        let num_cells: usize = self.size * self.size;
        let current: Coord = match path.last() {
            Some(c) => c,
            None => return Ok(false),
        };
        if path.len() == num_cells {
            return Ok(current == self.end);
        }

        self.iteration += 1;
        if self.start.elapsed() >= self.deadline {
            return Err(PathError::Timeout);
        }
        if let Some(abort) = &self.abort {
            if abort.load(Ordering::Relaxed) {
                return Err(PathError::Cancelled);
            }
        }

        let mut candidates: Vec<Coord> = topology::neighbors_in(self.size, current, &self.directions)
            .into_iter()
            .filter(|c| !path.contains(*c))
            // The end cell can only be the last one
            .filter(|c| *c != self.end || path.len() == num_cells - 1)
            .collect();
        // Stable sort: ties keep the direction order of the attempt
        candidates.sort_by_key(|c| self.score(path, *c));

        for next in candidates {
            path.push(next);
            if self.is_viable(path) && self.extend(path)? {
                return Ok(true);
            }
            path.pop();
        }
        Ok(false)
    }

    /// Return the ordering score of a candidate cell. Lower scores are tried first.
    pub fn score(&self, path: &path::Path, cell: Coord) -> i32 {
        if cell == self.end && path.len() == self.size * self.size - 1 {
            return END_SCORE;
        }

        let mut score: i32 = self.free_neighbors(path, cell) as i32;
        if cell != self.end {
            if topology::is_corner(self.size, cell) {
                score += CORNER_PENALTY;
            } else if topology::is_border(self.size, cell) {
                score += BORDER_PENALTY;
            }
        }
        if self.size > CENTER_BIAS_MIN_SIZE {
            score += topology::center_distance(self.size, cell) as i32;
        }
        score
    }

    /// Number of unvisited neighbors of the cell.
    fn free_neighbors(&self, path: &path::Path, cell: Coord) -> usize {
        topology::neighbors4(self.size, cell)
            .into_iter()
            .filter(|c| !path.contains(*c))
            .count()
    }

    /// Whether the remaining cells can still be covered after the last move.
    ///
    /// Only the cells around the last two cells of the path change their number of exits, so only
    /// these cells are checked. The region of unvisited cells must also stay connected.
    fn is_viable(&self, path: &path::Path) -> bool {
        let num_cells: usize = self.size * self.size;
        if path.len() == num_cells {
            return true;
        }
        let cells: &[Coord] = path.cells();
        let head: Coord = cells[cells.len() - 1];
        let previous: Coord = cells[cells.len() - 2];

        for around in [previous, head] {
            for cell in topology::neighbors4(self.size, around) {
                if path.contains(cell) {
                    continue;
                }
                let mut exits: usize = self.free_neighbors(path, cell);
                if topology::adjacent(cell, head) {
                    exits += 1;
                }
                let needed: usize = if cell == self.end { 1 } else { 2 };
                if exits < needed {
                    return false;
                }
            }
        }

        self.reachable_from(path, head) == num_cells - path.len()
    }

    /// Count the unvisited cells reachable from the given cell.
    fn reachable_from(&self, path: &path::Path, from: Coord) -> usize {
        let mut seen: Vec<bool> = vec![false; self.size * self.size];
        let mut queue: VecDeque<Coord> = VecDeque::new();
        let mut count: usize = 0;

        queue.push_back(from);
        while let Some(cell) = queue.pop_front() {
            for next in topology::neighbors4(self.size, cell) {
                let idx: usize = next.0 * self.size + next.1;
                if seen[idx] || path.contains(next) {
                    continue;
                }
                seen[idx] = true;
                count += 1;
                queue.push_back(next);
            }
        }
        count
    }
}

/// Draw a random pair of distinct cells that a Hamiltonian path can join.
pub fn random_endpoints<R: Rng>(size: usize, rng: &mut R) -> (Coord, Coord) {
    let cells: Vec<Coord> = (0..size)
        .flat_map(|x| (0..size).map(move |y| (x, y)))
        .collect();
    // On odd grids only the majority color can hold an endpoint
    let starts: Vec<Coord> = cells
        .iter()
        .copied()
        .filter(|c| (size * size) % 2 == 0 || (c.0 + c.1) % 2 == 0)
        .collect();
    let start: Coord = starts[rng.random_range(0..starts.len())];
    let ends: Vec<Coord> = cells
        .into_iter()
        .filter(|c| topology::endpoints_compatible(size, start, *c))
        .collect();
    let end: Coord = ends[rng.random_range(0..ends.len())];
    (start, end)
}
