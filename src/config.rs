/*
config.rs

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

//! Generator constants and runtime settings.
//!
//! The constants describe the shape of the levels per difficulty tier and the budgets that bound
//! the search.
//! [`BatchSettings`] groups the knobs that the command line can override.

use std::time::Duration;

use crate::generator::difficulty::Tier;

pub const COPYRIGHT_NOTICE: &str = "Copyright 2025 Hervé Quatremain
License GPLv3+: GNU GPL version 3 or later <https://gnu.org/licenses/gpl.html>.
This is free software: you are free to change and redistribute it.
There is NO WARRANTY, to the extent permitted by law.";

/// Smallest supported grid side.
pub const MIN_GRID_SIZE: usize = 4;

/// Largest supported grid side.
pub const MAX_GRID_SIZE: usize = 8;

/// Smallest number of labels in a level.
pub const MIN_NUMBERS: usize = 3;

/// Level number used for the first level when the store has no history.
pub const BASE_LEVEL: u32 = 101;

/// Every level whose number is a multiple of this value is forced to [`Tier::Extremo`].
pub const EXTREME_EVERY: u32 = 5;

/// Number of generation attempts for a single level before it is skipped.
pub const LEVEL_ATTEMPTS: usize = 20;

/// Number of times a duplicate configuration is resampled before it is used anyway.
pub const CONFIG_RESAMPLES: usize = 50;

/// Shape of the levels for a difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierProfile {
    pub tier: Tier,

    /// Inclusive range of the grid side.
    pub sizes: (usize, usize),

    /// Inclusive range of the number of labels. Capped at the number of cells when sampled.
    pub numbers: (usize, usize),

    /// Relative weight of the tier in the weighted random draw.
    pub weight: f64,
}

/// Tier profiles, in the order used by the cumulative weight table.
pub const TIER_PROFILES: [TierProfile; 4] = [
    TierProfile {
        tier: Tier::Facil,
        sizes: (4, 6),
        numbers: (3, 8),
        weight: 0.35,
    },
    TierProfile {
        tier: Tier::Normal,
        sizes: (4, 6),
        numbers: (4, 12),
        weight: 0.30,
    },
    TierProfile {
        tier: Tier::Dificil,
        sizes: (5, 7),
        numbers: (5, 15),
        weight: 0.25,
    },
    TierProfile {
        tier: Tier::Extremo,
        sizes: (6, 8),
        numbers: (6, 25),
        weight: 0.10,
    },
];

/// Return the profile of the given tier.
pub fn tier_profile(tier: Tier) -> &'static TierProfile {
    &TIER_PROFILES[tier as usize]
}

/// Wall-clock budget for a path search on a grid of the given side.
pub fn search_deadline(size: usize) -> Duration {
    let secs: u64 = match size {
        0..=4 => 5,
        5 => 10,
        6 => 15,
        7 => 20,
        _ => 25,
    };
    Duration::from_secs(secs)
}

/// Number of search attempts for a grid of the given side.
pub fn search_attempts(size: usize) -> usize {
    match size {
        0..=4 => 10,
        5 => 20,
        6 => 30,
        7 => 40,
        _ => 50,
    }
}

/// Runtime settings for a batch.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Seed for the pseudo-random generator. A random seed is used when not set.
    pub seed: Option<u64>,

    /// Level number used when neither the caller nor the store provide one.
    pub base_level: u32,

    /// See [`LEVEL_ATTEMPTS`].
    pub level_attempts: usize,

    /// See [`CONFIG_RESAMPLES`].
    pub config_resamples: usize,

    /// See [`EXTREME_EVERY`].
    pub extreme_every: u32,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            seed: None,
            base_level: BASE_LEVEL,
            level_attempts: LEVEL_ATTEMPTS,
            config_resamples: CONFIG_RESAMPLES,
            extreme_every: EXTREME_EVERY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_are_indexed_by_tier() {
        for tier in Tier::ALL {
            assert_eq!(tier_profile(tier).tier, tier);
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let total: f64 = TIER_PROFILES.iter().map(|p| p.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn budgets_scale_with_size() {
        assert_eq!(search_deadline(4), Duration::from_secs(5));
        assert_eq!(search_deadline(6), Duration::from_secs(15));
        assert_eq!(search_deadline(8), Duration::from_secs(25));
        assert_eq!(search_attempts(3), 10);
        assert_eq!(search_attempts(7), 40);
        assert_eq!(search_attempts(9), 50);
    }
}
