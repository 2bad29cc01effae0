/*
difficulty.rs

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

//! Difficulty tiers and level scoring.
//!
//! [`classify`] scores a level from its size, its number of labels, and its path length.
//! [`pick_tier`] draws a tier from the weights of [`config::TIER_PROFILES`].

use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{AsRefStr, FromRepr};

use crate::config;

/// Level difficulty tier.
///
/// The lowercase names are the values stored in the `difficulty` field of the level documents.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    FromRepr,
    Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[repr(usize)]
pub enum Tier {
    #[default]
    Facil,
    Normal,
    Dificil,
    Extremo,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Facil, Tier::Normal, Tier::Dificil, Tier::Extremo];

    /// Name stored in the level documents.
    pub fn name(&self) -> &str {
        self.as_ref()
    }

    /// Return the tier for a stored difficulty name. The comparison ignores case.
    pub fn from_name(name: &str) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn size_factor(size: usize) -> u32 {
    match size {
        0..=4 => 10,
        5 => 25,
        6 => 40,
        7 => 60,
        _ => 90,
    }
}

fn density_factor(density: f64) -> u32 {
    if density <= 0.25 {
        30
    } else if density <= 0.4 {
        20
    } else if density <= 0.6 {
        10
    } else {
        5
    }
}

fn efficiency_factor(efficiency: f64) -> u32 {
    if efficiency >= 0.95 {
        20
    } else if efficiency >= 0.9 {
        15
    } else if efficiency >= 0.8 {
        10
    } else {
        5
    }
}

/// Difficulty score of a level.
pub fn score(size: usize, count: usize, path_len: usize) -> u32 {
    let cells: f64 = (size * size) as f64;
    let density: f64 = count as f64 / cells;
    let efficiency: f64 = path_len as f64 / cells;
    size_factor(size) + density_factor(density) + efficiency_factor(efficiency)
}

/// Return the tier of a level.
pub fn classify(size: usize, count: usize, path_len: usize) -> Tier {
    match score(size, count, path_len) {
        0..=40 => Tier::Facil,
        41..=60 => Tier::Normal,
        61..=80 => Tier::Dificil,
        _ => Tier::Extremo,
    }
}

/// Return the tier that a uniform draw `u` in `[0, 1)` selects in the cumulative weight table.
pub fn pick_tier(u: f64) -> Tier {
    let mut cumulative: f64 = 0.0;
    for profile in &config::TIER_PROFILES {
        cumulative += profile.weight;
        if u < cumulative {
            return profile.tier;
        }
    }
    // Rounding can leave the sum slightly under 1
    Tier::Extremo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smallest_level_is_normal() {
        // 10 + 30 (density 0.1875) + 20 (full path) = 60
        assert_eq!(score(4, 3, 16), 60);
        assert_eq!(classify(4, 3, 16), Tier::Normal);
    }

    #[test]
    fn tier_boundaries() {
        // 10 + 10 (density 0.5) + 20
        assert_eq!(classify(4, 8, 16), Tier::Facil);
        // 25 + 20 (density 0.4) + 20
        assert_eq!(classify(5, 10, 25), Tier::Dificil);
        // 40 + 20 (density 0.36) + 20
        assert_eq!(classify(6, 13, 36), Tier::Dificil);
        // 40 + 30 + 20
        assert_eq!(classify(6, 6, 36), Tier::Extremo);
        // 90 + 20 (density 0.39) + 20
        assert_eq!(classify(8, 25, 64), Tier::Extremo);
    }

    #[test]
    fn partial_paths_score_lower() {
        assert_eq!(score(4, 3, 15), 55);
        assert_eq!(score(4, 3, 14), 50);
        assert_eq!(score(4, 3, 13), 50);
        assert_eq!(score(4, 3, 8), 45);
    }

    #[test]
    fn weighted_pick_uses_cumulative_table() {
        assert_eq!(pick_tier(0.0), Tier::Facil);
        assert_eq!(pick_tier(0.34), Tier::Facil);
        assert_eq!(pick_tier(0.36), Tier::Normal);
        assert_eq!(pick_tier(0.64), Tier::Normal);
        assert_eq!(pick_tier(0.66), Tier::Dificil);
        assert_eq!(pick_tier(0.91), Tier::Extremo);
        assert_eq!(pick_tier(0.999_999), Tier::Extremo);
    }

    #[test]
    fn names() {
        assert_eq!(Tier::Dificil.to_string(), "dificil");
        assert_eq!(Tier::from_name("EXTREMO"), Some(Tier::Extremo));
        assert_eq!(Tier::from_name("muy_facil"), None);
        assert_eq!(
            serde_json::to_string(&Tier::Normal).unwrap(),
            "\"normal\""
        );
        assert_eq!(Tier::from_repr(2), Some(Tier::Dificil));
    }
}
