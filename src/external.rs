/*
external.rs

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

//! Levels produced outside the generator.
//!
//! A content service can propose complete levels as JSON:
//!
//! ```json
//! {"difficulty": "normal", "gridSize": 4, "grid": [[1, 0, 0, 0], ...], "solution": [[0, 0], [0, 1], ...]}
//! ```
//!
//! Nothing in such a payload is trusted. [`decode_candidate`] only checks the JSON shape, and
//! [`RawCandidate::verify`] checks the content with the same rules as the generated levels before
//! the candidate can be used.

use log::debug;
use serde::Deserialize;

use crate::config;
use crate::generator::difficulty::Tier;
use crate::generator::grid::Grid;
use crate::generator::level::PuzzleConfig;
use crate::generator::path::Path;
use crate::generator::placer;
use crate::generator::topology::Coord;

/// Type of errors.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed candidate: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid candidate: {0}")]
    Schema(String),
}

/// Candidate as decoded from the JSON payload.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidate {
    pub difficulty: String,
    pub grid_size: i64,
    pub grid: Vec<Vec<i64>>,
    pub solution: Vec<[i64; 2]>,
}

/// Candidate that passed all the checks.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedCandidate {
    pub tier: Tier,
    pub grid: Grid,
    pub path: Path,
}

impl VerifiedCandidate {
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Configuration of the candidate.
    pub fn config(&self) -> PuzzleConfig {
        PuzzleConfig::new(self.grid.size(), self.grid.label_count(), self.tier)
    }
}

/// Source of candidate payloads, such as a content generation service.
pub trait CandidateSource {
    /// Return a JSON payload for a level with the given configuration, or None when the source
    /// has nothing to propose.
    fn fetch(&mut self, config: &PuzzleConfig) -> Option<String>;
}

/// Decode one candidate.
///
/// # Errors
///
/// Return [`DecodeError::Json`] when the payload is not valid JSON or misses a field.
pub fn decode_candidate(payload: &str) -> Result<RawCandidate, DecodeError> {
    Ok(serde_json::from_str(payload)?)
}

/// Decode a JSON array of candidates.
///
/// # Errors
///
/// Return [`DecodeError::Json`] when the payload is not a valid array of candidates.
pub fn decode_candidates(payload: &str) -> Result<Vec<RawCandidate>, DecodeError> {
    Ok(serde_json::from_str(payload)?)
}

impl RawCandidate {
    /// Check the candidate and return its typed representation.
    ///
    /// # Errors
    ///
    /// Return [`DecodeError::Schema`] describing the first problem found.
    pub fn verify(&self) -> Result<VerifiedCandidate, DecodeError> {
        let tier: Tier = Tier::from_name(&self.difficulty).ok_or_else(|| {
            DecodeError::Schema(format!("unknown difficulty {:?}", self.difficulty))
        })?;

        let size: usize = usize::try_from(self.grid_size)
            .ok()
            .filter(|s| (config::MIN_GRID_SIZE..=config::MAX_GRID_SIZE).contains(s))
            .ok_or_else(|| DecodeError::Schema(format!("grid size {}", self.grid_size)))?;

        if self.grid.len() != size {
            return Err(DecodeError::Schema(format!(
                "{} rows for a grid of size {size}",
                self.grid.len()
            )));
        }
        let rows: Vec<Vec<u32>> = self
            .grid
            .iter()
            .map(|r| r.iter().map(|v| u32::try_from(*v).ok()).collect())
            .collect::<Option<Vec<Vec<u32>>>>()
            .ok_or_else(|| DecodeError::Schema("negative or oversized cell value".to_string()))?;
        let grid: Grid = Grid::from_rows(&rows).map_err(DecodeError::Schema)?;

        let cells: Vec<Coord> = self
            .solution
            .iter()
            .map(|[x, y]| Some((usize::try_from(*x).ok()?, usize::try_from(*y).ok()?)))
            .collect::<Option<Vec<Coord>>>()
            .ok_or_else(|| DecodeError::Schema("negative solution coordinates".to_string()))?;
        let path: Path = Path::from_cells(&cells);
        path.check_hamiltonian(size).map_err(DecodeError::Schema)?;

        placer::validate(&grid, &path).map_err(|e| DecodeError::Schema(e.to_string()))?;

        let candidate: VerifiedCandidate = VerifiedCandidate { tier, grid, path };
        candidate.config().check().map_err(DecodeError::Schema)?;
        debug!("Candidate {size}x{size} ({tier}) verified");
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snake(size: usize) -> Vec<[i64; 2]> {
        let mut cells: Vec<[i64; 2]> = Vec::new();
        for x in 0..size as i64 {
            if x % 2 == 0 {
                cells.extend((0..size as i64).map(|y| [x, y]));
            } else {
                cells.extend((0..size as i64).rev().map(|y| [x, y]));
            }
        }
        cells
    }

    fn payload() -> serde_json::Value {
        // Snake path on 4x4, labels at path indexes 0, 7, 15
        json!({
            "difficulty": "normal",
            "gridSize": 4,
            "grid": [[1, 0, 0, 0], [2, 0, 0, 0], [0, 0, 0, 0], [3, 0, 0, 0]],
            "solution": snake(4),
        })
    }

    #[test]
    fn valid_candidate() {
        let raw: RawCandidate = decode_candidate(&payload().to_string()).unwrap();
        let candidate: VerifiedCandidate = raw.verify().unwrap();
        assert_eq!(candidate.size(), 4);
        assert_eq!(candidate.config(), PuzzleConfig::new(4, 3, Tier::Normal));
        assert_eq!(candidate.path.first(), Some((0, 0)));
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let mut p: serde_json::Value = payload();
        p.as_object_mut().unwrap().remove("solution");
        assert!(matches!(
            decode_candidate(&p.to_string()),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(decode_candidate("not json"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn broken_path_is_rejected() {
        let mut p: serde_json::Value = payload();
        let mut solution: Vec<[i64; 2]> = snake(4);
        solution.swap(3, 4);
        p["solution"] = json!(solution);
        let raw: RawCandidate = decode_candidate(&p.to_string()).unwrap();
        assert!(matches!(raw.verify(), Err(DecodeError::Schema(_))));
    }

    #[test]
    fn wrong_labels_are_rejected() {
        let mut p: serde_json::Value = payload();
        p["grid"] = json!([[1, 0, 0, 0], [3, 0, 0, 0], [0, 0, 0, 0], [2, 0, 0, 0]]);
        let raw: RawCandidate = decode_candidate(&p.to_string()).unwrap();
        assert!(matches!(raw.verify(), Err(DecodeError::Schema(_))));
    }

    #[test]
    fn bad_shapes_are_rejected() {
        let mut p: serde_json::Value = payload();
        p["gridSize"] = json!(9);
        assert!(decode_candidate(&p.to_string()).unwrap().verify().is_err());

        let mut p: serde_json::Value = payload();
        p["grid"] = json!([[1, 0, 0], [2, 0, 0, 0], [0, 0, 0, 0], [3, 0, 0, 0]]);
        assert!(decode_candidate(&p.to_string()).unwrap().verify().is_err());

        let mut p: serde_json::Value = payload();
        p["grid"][2][2] = json!(-1);
        assert!(decode_candidate(&p.to_string()).unwrap().verify().is_err());

        let mut p: serde_json::Value = payload();
        p["difficulty"] = json!("hard");
        assert!(decode_candidate(&p.to_string()).unwrap().verify().is_err());
    }

    #[test]
    fn too_few_labels_are_rejected() {
        // Labels 1 and 2 on the ends of the path are in order, but a level needs 3 labels
        let mut p: serde_json::Value = payload();
        p["grid"] = json!([[1, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [2, 0, 0, 0]]);
        let raw: RawCandidate = decode_candidate(&p.to_string()).unwrap();
        assert!(matches!(raw.verify(), Err(DecodeError::Schema(_))));
    }

    #[test]
    fn decode_list() {
        let list: String = json!([payload(), payload()]).to_string();
        assert_eq!(decode_candidates(&list).unwrap().len(), 2);
    }
}
