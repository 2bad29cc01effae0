/*
dedup.rs

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

//! Avoid issuing the same level twice.
//!
//! The [`DedupCache`] object is seeded once from the level store. It records the configuration
//! (size, number of labels, tier) of every known level and the highest level number.
//! During the run it also records the content hash of every accepted grid.
//!
//! Grids loaded from the store are not hashed: two runs can produce the same grid under different
//! configurations.

use log::{info, warn};
use rustc_hash::FxHashSet;

use super::grid::Grid;
use super::level::{Level, PuzzleConfig};
use crate::saver::store::{LevelStore, StoredLevel};

/// [`DedupCache`] object.
#[derive(Debug, Clone)]
pub struct DedupCache {
    /// Configurations of the stored levels and of the levels accepted during the run.
    configs: FxHashSet<PuzzleConfig>,

    /// Content hashes of the grids accepted during the run.
    grid_hashes: FxHashSet<u64>,

    /// Highest level number seen so far.
    max_level: Option<u32>,

    /// Number used for the first level when there is no history.
    base_level: u32,

    /// Number of levels read from the store.
    historical: usize,

    /// Whether the store could not be read.
    degraded: bool,
}

impl DedupCache {
    /// Create an empty [`DedupCache`] object.
    pub fn new(base_level: u32) -> Self {
        Self {
            configs: FxHashSet::default(),
            grid_hashes: FxHashSet::default(),
            max_level: None,
            base_level,
            historical: 0,
            degraded: false,
        }
    }

    /// Create a [`DedupCache`] object from the levels of the store.
    ///
    /// When the store cannot be read, the cache starts empty and the run continues without
    /// checking the historical levels.
    pub fn seed(store: &dyn LevelStore, base_level: u32) -> Self {
        match store.load_all() {
            Ok(levels) => Self::from_levels(&levels, base_level),
            Err(e) => {
                warn!("Cannot load the existing levels ({e}); continuing without duplicate checks against them");
                let mut cache: DedupCache = Self::new(base_level);
                cache.degraded = true;
                cache
            }
        }
    }

    /// Create a [`DedupCache`] object from a list of stored levels.
    pub fn from_levels(levels: &[StoredLevel], base_level: u32) -> Self {
        let mut cache: DedupCache = Self::new(base_level);
        for stored in levels {
            if let Some(config) = stored.config() {
                cache.configs.insert(config);
            }
            if let Some(n) = stored.level {
                cache.max_level = cache.max_level.max(Some(n));
            }
        }
        cache.historical = levels.len();
        info!(
            "Loaded {} existing levels ({} distinct configurations, next level {})",
            cache.historical,
            cache.configs.len(),
            cache.next_level_number()
        );
        cache
    }

    /// Whether a level with the same configuration already exists.
    pub fn is_duplicate_config(&self, config: &PuzzleConfig) -> bool {
        self.configs.contains(config)
    }

    /// Whether the same grid was already accepted during this run.
    pub fn is_duplicate_grid(&self, grid: &Grid) -> bool {
        self.grid_hashes.contains(&grid.content_hash())
    }

    /// Return the number for the next level.
    pub fn next_level_number(&self) -> u32 {
        match self.max_level {
            Some(n) => n + 1,
            None => self.base_level,
        }
    }

    /// Record an accepted level.
    pub fn register(&mut self, level: &Level) {
        self.configs.insert(*level.config());
        self.grid_hashes.insert(level.grid().content_hash());
        self.max_level = self.max_level.max(Some(level.number()));
    }

    /// Number of levels read from the store.
    pub fn historical(&self) -> usize {
        self.historical
    }

    /// Number of known configurations.
    pub fn config_count(&self) -> usize {
        self.configs.len()
    }

    /// Whether the store could not be read when seeding the cache.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::difficulty::Tier;
    use crate::generator::path::Path;
    use crate::generator::placer;
    use crate::generator::topology::Coord;
    use crate::saver::store::{LevelRecord, MemoryStore, StoreError};
    use serde_json::json;

    struct BrokenStore;

    impl LevelStore for BrokenStore {
        fn load_all(&self) -> Result<Vec<StoredLevel>, StoreError> {
            Err(StoreError::Schema("unreachable".to_string()))
        }

        fn write_batch(&mut self, _records: &[LevelRecord]) -> Result<(), StoreError> {
            Err(StoreError::Schema("unreachable".to_string()))
        }
    }

    fn level(number: u32, count: usize) -> Level {
        let cells: Vec<Coord> = (0..4)
            .flat_map(|x| {
                let row: Vec<Coord> = (0..4).map(|y| (x, y)).collect();
                if x % 2 == 0 {
                    row
                } else {
                    row.into_iter().rev().collect()
                }
            })
            .collect();
        let path: Path = Path::from_cells(&cells);
        let grid: Grid = placer::place(&path, count).unwrap();
        Level::new(
            number,
            PuzzleConfig::new(4, count, Tier::Facil),
            grid,
            path,
            Tier::Normal,
        )
    }

    fn store() -> MemoryStore {
        let mut store: MemoryStore = MemoryStore::new();
        store.insert(
            "level_0101",
            json!({"level": 101, "gridSize": 4, "difficulty": "facil",
                   "grid": {"0": [1, 0, 0, 0], "1": [0, 0, 0, 0], "2": [0, 0, 0, 0], "3": [2, 0, 0, 3]}}),
        );
        store.insert(
            "level_0120",
            json!({"level": 120, "gridSize": 5, "difficulty": "dificil",
                   "grid": [[1, 0, 0, 0, 0], [0, 0, 0, 0, 0], [0, 0, 0, 0, 0], [0, 0, 0, 0, 0], [0, 0, 0, 0, 2]]}),
        );
        store.insert("level_0110", json!({"level": 110, "gridSize": 6}));
        store
    }

    #[test]
    fn next_level_follows_history() {
        let cache: DedupCache = DedupCache::seed(&store(), 101);
        assert_eq!(cache.next_level_number(), 121);
        assert_eq!(cache.historical(), 3);
        assert_eq!(cache.config_count(), 2);
        assert!(!cache.is_degraded());
    }

    #[test]
    fn empty_history_uses_base_level() {
        let cache: DedupCache = DedupCache::seed(&MemoryStore::new(), 101);
        assert_eq!(cache.next_level_number(), 101);
    }

    #[test]
    fn unreadable_store_degrades() {
        let cache: DedupCache = DedupCache::seed(&BrokenStore, 101);
        assert!(cache.is_degraded());
        assert_eq!(cache.next_level_number(), 101);
        assert_eq!(cache.config_count(), 0);
    }

    #[test]
    fn historical_configs_are_duplicates() {
        let cache: DedupCache = DedupCache::seed(&store(), 101);
        assert!(cache.is_duplicate_config(&PuzzleConfig::new(4, 3, Tier::Facil)));
        assert!(cache.is_duplicate_config(&PuzzleConfig::new(5, 2, Tier::Dificil)));
        assert!(!cache.is_duplicate_config(&PuzzleConfig::new(4, 3, Tier::Normal)));
    }

    #[test]
    fn register_updates_all_sets() {
        let mut cache: DedupCache = DedupCache::seed(&store(), 101);
        let accepted: Level = level(121, 5);
        assert!(!cache.is_duplicate_config(accepted.config()));
        assert!(!cache.is_duplicate_grid(accepted.grid()));

        cache.register(&accepted);
        assert!(cache.is_duplicate_config(accepted.config()));
        assert!(cache.is_duplicate_grid(accepted.grid()));
        assert_eq!(cache.next_level_number(), 122);

        // Same shape, different labels
        assert!(!cache.is_duplicate_grid(level(122, 6).grid()));
    }

    #[test]
    fn historical_grids_are_not_hashed() {
        let cache: DedupCache = DedupCache::seed(&store(), 101);
        // Same labels as the stored level 101
        let mut grid: Grid = Grid::new(4);
        grid.set((0, 0), 1);
        grid.set((3, 0), 2);
        grid.set((3, 3), 3);
        assert!(!cache.is_duplicate_grid(&grid));
    }
}
