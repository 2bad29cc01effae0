/*
batch.rs

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

//! Generate a batch of levels.
//!
//! Every level of the batch goes through the same steps:
//! * Draw a configuration (grid size, number of labels, tier). Every fifth level number is
//!   forced to the [`Tier::Extremo`] tier, the others use the weights of
//!   [`config::TIER_PROFILES`]. Configurations already known by the [`DedupCache`] are drawn
//!   again a limited number of times.
//! * Build the level: ask the optional [`CandidateSource`] first, and otherwise search a path
//!   with [`PathFinder`] and place the labels along it.
//! * Check the level and register it in the [`DedupCache`].
//!
//! A level that cannot be built within the attempt budget is skipped, and its number stays
//! unused.

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::dedup::DedupCache;
use super::difficulty::{self, Tier};
use super::grid::Grid;
use super::level::{Level, PuzzleConfig};
use super::path::Path;
use super::path_finder::{self, PathError, PathFinder};
use super::placer::{self, PlacementError};
use crate::config::{self, BatchSettings};
use crate::external::{self, CandidateSource, VerifiedCandidate};
use crate::saver::store::{LevelRecord, LevelStore, StoreError};

/// Type of errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LevelError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no path found before the deadline")]
    SearchTimeout,

    #[error("no path found")]
    SearchExhausted,

    #[error("generation cancelled")]
    Cancelled,

    #[error("invalid level: {0}")]
    Validation(String),

    #[error("the grid was already generated")]
    Duplicate,

    #[error("level store unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<StoreError> for LevelError {
    fn from(e: StoreError) -> Self {
        LevelError::StorageUnavailable(e.to_string())
    }
}

impl From<PathError> for LevelError {
    fn from(e: PathError) -> Self {
        match e {
            PathError::Timeout => LevelError::SearchTimeout,
            PathError::Exhausted => LevelError::SearchExhausted,
            PathError::Cancelled => LevelError::Cancelled,
        }
    }
}

impl From<PlacementError> for LevelError {
    fn from(e: PlacementError) -> Self {
        match e {
            PlacementError::Config { .. } => LevelError::Config(e.to_string()),
            PlacementError::Validation(msg) => LevelError::Validation(msg),
        }
    }
}

/// [`LevelBatchBuilder`] object.
pub struct LevelBatchBuilder {
    cache: DedupCache,
    settings: BatchSettings,
    rng: ChaCha8Rng,

    /// Optional external source of levels, asked before searching a path.
    source: Option<Box<dyn CandidateSource>>,

    /// Optional flag that the caller can raise to stop the batch.
    abort: Option<Arc<AtomicBool>>,

    /// Replacement for the default search deadline.
    deadline: Option<Duration>,
}

impl LevelBatchBuilder {
    /// Create a [`LevelBatchBuilder`] object.
    ///
    /// The pseudo-random generator uses `settings.seed` when set, so that two runs with the same
    /// seed and the same store content produce the same levels.
    pub fn new(cache: DedupCache, settings: BatchSettings) -> Self {
        let rng: ChaCha8Rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Self {
            cache,
            settings,
            rng,
            source: None,
            abort: None,
            deadline: None,
        }
    }

    /// Create a [`LevelBatchBuilder`] object with a [`DedupCache`] seeded from the store.
    ///
    /// Level numbers start at `settings.base_level` when the store has no level.
    pub fn from_store(store: &dyn LevelStore, settings: BatchSettings) -> Self {
        let cache: DedupCache = DedupCache::seed(store, settings.base_level);
        Self::new(cache, settings)
    }

    pub fn with_source(mut self, source: Box<dyn CandidateSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_abort(mut self, abort: Arc<AtomicBool>) -> Self {
        self.abort = Some(abort);
        self
    }

    /// Use the same search deadline for all the grid sizes.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    fn cancelled(&self) -> bool {
        self.abort
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Generate up to `count` levels.
    ///
    /// The first level gets the number `start_level`, or the next number from the
    /// [`DedupCache`] when not set. Level `i` gets the number `start_level + i`.
    pub fn generate_batch(&mut self, count: usize, start_level: Option<u32>) -> Vec<Level> {
        let start: u32 = start_level.unwrap_or_else(|| self.cache.next_level_number());
        info!("Generating {count} levels starting at level {start}");

        let mut levels: Vec<Level> = Vec::with_capacity(count);
        for (i, number) in (start..).take(count).enumerate() {
            if self.cancelled() {
                warn!("Generation cancelled after {i} levels");
                break;
            }
            let config: PuzzleConfig = self.draw_config(number);
            debug!("Level {number}: {config}");
            match self.build_level(number, config) {
                Ok(level) => levels.push(level),
                Err(LevelError::Cancelled) => {
                    warn!("Generation cancelled at level {number}");
                    break;
                }
                Err(e) => warn!("Skipping level {number}: {e}"),
            }
        }
        info!("Generated {} levels out of {count}", levels.len());
        levels
    }

    /// Generate up to `count` levels that all have the same grid size and number of labels.
    ///
    /// The tier of the levels is the result of [`difficulty::classify`]. There is no forced
    /// [`Tier::Extremo`] level and no configuration check against the store.
    ///
    /// # Errors
    ///
    /// Return [`LevelError::Config`] when the size or the number of labels is out of range.
    pub fn generate_fixed(
        &mut self,
        size: usize,
        numbers: usize,
        count: usize,
        start_level: Option<u32>,
    ) -> Result<Vec<Level>, LevelError> {
        let tier: Tier = difficulty::classify(size, numbers, size * size);
        let config: PuzzleConfig = PuzzleConfig::new(size, numbers, tier);
        config.check().map_err(LevelError::Config)?;

        let start: u32 = start_level.unwrap_or_else(|| self.cache.next_level_number());
        info!("Generating {count} levels of {config} starting at level {start}");

        let mut levels: Vec<Level> = Vec::with_capacity(count);
        for number in (start..).take(count) {
            if self.cancelled() {
                break;
            }
            match self.build_level(number, config) {
                Ok(level) => levels.push(level),
                Err(LevelError::Cancelled) => break,
                Err(e) => warn!("Skipping level {number}: {e}"),
            }
        }
        Ok(levels)
    }

    /// Draw the configuration of a level.
    fn draw_config(&mut self, number: u32) -> PuzzleConfig {
        let forced: bool =
            self.settings.extreme_every > 0 && number % self.settings.extreme_every == 0;

        let mut config: PuzzleConfig = self.sample_config(forced);
        for _ in 0..self.settings.config_resamples {
            if !self.cache.is_duplicate_config(&config) {
                return config;
            }
            config = self.sample_config(forced);
        }
        if self.cache.is_duplicate_config(&config) {
            debug!("Level {number}: keeping the already known configuration {config}");
        }
        config
    }

    fn sample_config(&mut self, forced_extreme: bool) -> PuzzleConfig {
        let tier: Tier = if forced_extreme {
            Tier::Extremo
        } else {
            difficulty::pick_tier(self.rng.random::<f64>())
        };
        let profile: &config::TierProfile = config::tier_profile(tier);
        let size: usize = self.rng.random_range(profile.sizes.0..=profile.sizes.1);
        let numbers: usize = self
            .rng
            .random_range(profile.numbers.0..=profile.numbers.1)
            .min(size * size);
        PuzzleConfig::new(size, numbers, tier)
    }

    /// Build, check, and register one level.
    fn build_level(&mut self, number: u32, config: PuzzleConfig) -> Result<Level, LevelError> {
        config.check().map_err(LevelError::Config)?;

        let mut last_error: LevelError = LevelError::SearchExhausted;
        for attempt in 1..=self.settings.level_attempts {
            let result: Result<(Grid, Path), LevelError> = match self.from_source(&config) {
                Some(found) => Ok(found),
                None => self.search(&config),
            };
            match result {
                Ok((grid, path)) => {
                    let level_config: PuzzleConfig =
                        PuzzleConfig::new(config.grid_size, grid.label_count(), config.tier);
                    if let Err(msg) = level_config.check() {
                        debug!("Level {number}, attempt {attempt}: {msg}");
                        last_error = LevelError::Config(msg);
                        continue;
                    }
                    let rated: Tier =
                        difficulty::classify(config.grid_size, grid.label_count(), path.len());
                    if rated != config.tier {
                        debug!("Level {number}: requested {}, rated {rated}", config.tier);
                    }
                    let level: Level = Level::new(number, level_config, grid, path, rated);
                    self.cache.register(&level);
                    info!("Level {number}: {level_config} after {attempt} attempts");
                    return Ok(level);
                }
                Err(LevelError::Cancelled) => return Err(LevelError::Cancelled),
                Err(e) => {
                    debug!("Level {number}, attempt {attempt}: {e}");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Search a path and place the labels along it.
    fn search(&mut self, config: &PuzzleConfig) -> Result<(Grid, Path), LevelError> {
        let size: usize = config.grid_size;
        let (start, end) = path_finder::random_endpoints(size, &mut self.rng);

        let mut finder: PathFinder = PathFinder::new(size, self.rng.random::<u64>());
        if let Some(deadline) = self.deadline {
            finder = finder.with_deadline(deadline);
        }
        if let Some(abort) = &self.abort {
            finder = finder.with_abort(Arc::clone(abort));
        }
        let result: Result<Path, PathError> = finder.find(start, end);
        debug!(
            "Path search {size}x{size}: {} iterations, {} attempts, {:.3}s",
            finder.iteration, finder.attempts, finder.duration
        );
        let path: Path = result?;

        let grid: Grid = placer::place(&path, config.number_count)?;
        placer::validate(&grid, &path)?;
        if self.cache.is_duplicate_grid(&grid) {
            return Err(LevelError::Duplicate);
        }
        Ok((grid, path))
    }

    /// Ask the external source for a level. Return None when there is no source or when its
    /// proposal cannot be used.
    fn from_source(&mut self, config: &PuzzleConfig) -> Option<(Grid, Path)> {
        let source: &mut Box<dyn CandidateSource> = self.source.as_mut()?;
        let payload: String = source.fetch(config)?;

        let candidate: VerifiedCandidate = match external::decode_candidate(&payload)
            .and_then(|raw| raw.verify())
        {
            Ok(c) => c,
            Err(e) => {
                warn!("Rejecting the external level: {e}");
                return None;
            }
        };
        if candidate.size() != config.grid_size {
            warn!(
                "Rejecting the external level: size {} instead of {}",
                candidate.size(),
                config.grid_size
            );
            return None;
        }
        if self.cache.is_duplicate_grid(&candidate.grid) {
            warn!("Rejecting the external level: the grid was already generated");
            return None;
        }
        Some((candidate.grid, candidate.path))
    }
}

/// Write the levels to the store as one batch. Return the number of written levels.
///
/// # Errors
///
/// Return [`LevelError::StorageUnavailable`] when the store rejects the batch. The levels are
/// left untouched so that the caller can export them.
pub fn write_levels(store: &mut dyn LevelStore, levels: &[Level]) -> Result<usize, LevelError> {
    let records: Vec<LevelRecord> = levels.iter().map(LevelRecord::from).collect();
    store.write_batch(&records)?;
    Ok(records.len())
}

/// Counters for a generated batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub by_tier: BTreeMap<Tier, usize>,
    pub by_size: BTreeMap<usize, usize>,
    pub by_numbers: BTreeMap<usize, usize>,
    pub first_level: Option<u32>,
    pub last_level: Option<u32>,

    /// Numbers of the [`Tier::Extremo`] levels.
    pub extreme_levels: Vec<u32>,
}

impl BatchSummary {
    pub fn from_levels(levels: &[Level]) -> Self {
        let mut summary: BatchSummary = BatchSummary {
            total: levels.len(),
            ..Default::default()
        };
        for level in levels {
            let config: &PuzzleConfig = level.config();
            *summary.by_tier.entry(config.tier).or_default() += 1;
            *summary.by_size.entry(config.grid_size).or_default() += 1;
            *summary.by_numbers.entry(config.number_count).or_default() += 1;
            if config.tier == Tier::Extremo {
                summary.extreme_levels.push(level.number());
            }
            let number: u32 = level.number();
            summary.first_level = Some(summary.first_level.map_or(number, |n| n.min(number)));
            summary.last_level = Some(summary.last_level.map_or(number, |n| n.max(number)));
        }
        summary
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Levels generated: {}", self.total)?;
        if let (Some(first), Some(last)) = (self.first_level, self.last_level) {
            writeln!(f, "Level range: {first} - {last}")?;
        }
        writeln!(f, "By difficulty:")?;
        for (tier, count) in &self.by_tier {
            writeln!(f, "  {tier}: {count}")?;
        }
        writeln!(f, "By grid size:")?;
        for (size, count) in &self.by_size {
            writeln!(f, "  {size}x{size}: {count}")?;
        }
        writeln!(f, "By number count:")?;
        for (numbers, count) in &self.by_numbers {
            writeln!(f, "  {numbers}: {count}")?;
        }
        let extremes: Vec<String> = self.extreme_levels.iter().map(u32::to_string).collect();
        write!(f, "Extreme levels: {}", extremes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::topology::{self, Coord};
    use crate::saver::store::{MemoryStore, StoredLevel};
    use serde_json::json;

    fn settings(seed: u64) -> BatchSettings {
        BatchSettings {
            seed: Some(seed),
            ..Default::default()
        }
    }

    fn builder(seed: u64) -> LevelBatchBuilder {
        LevelBatchBuilder::new(DedupCache::new(config::BASE_LEVEL), settings(seed))
            .with_deadline(Duration::from_secs(2))
    }

    fn check_level(level: &Level) {
        let size: usize = level.config().grid_size;
        let cells: &[Coord] = level.path().cells();
        assert_eq!(cells.len(), size * size);
        assert!(level.path().check_hamiltonian(size).is_ok());
        assert!(cells.windows(2).all(|w| topology::adjacent(w[0], w[1])));

        let labels: Vec<u32> = cells
            .iter()
            .map(|c| level.grid().get(*c))
            .filter(|v| *v > 0)
            .collect();
        let expected: Vec<u32> = (1..=level.config().number_count as u32).collect();
        assert_eq!(labels, expected);
        assert_eq!(level.grid().get(cells[0]), 1);
        assert_eq!(
            level.grid().get(cells[cells.len() - 1]),
            level.config().number_count as u32
        );
        assert!(level.config().check().is_ok());
    }

    #[test]
    fn every_fifth_level_is_extreme() {
        // Default search deadlines, so that no level of this seed is skipped
        let mut b: LevelBatchBuilder =
            LevelBatchBuilder::new(DedupCache::new(config::BASE_LEVEL), settings(7));
        let levels: Vec<Level> = b.generate_batch(10, Some(101));
        assert!(levels.len() <= 10);
        for level in &levels {
            assert!((101..=110).contains(&level.number()));
            if level.number() % 5 == 0 {
                assert_eq!(level.config().tier, Tier::Extremo);
            }
            check_level(level);
        }
        let numbers: Vec<u32> = levels.iter().map(|l| l.number()).collect();
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        assert!(numbers.contains(&105));
        assert!(numbers.contains(&110));
    }

    #[test]
    fn configs_follow_tier_profiles() {
        let mut b: LevelBatchBuilder = builder(3);
        for number in 101..400 {
            let config: PuzzleConfig = b.draw_config(number);
            let profile: &config::TierProfile = config::tier_profile(config.tier);
            assert!((profile.sizes.0..=profile.sizes.1).contains(&config.grid_size));
            assert!(config.number_count >= profile.numbers.0);
            assert!(config.number_count <= profile.numbers.1);
            assert!(config.number_count <= config.grid_size * config.grid_size);
            if number % 5 == 0 {
                assert_eq!(config.tier, Tier::Extremo);
            }
        }
    }

    #[test]
    fn same_seed_same_levels() {
        let first: Vec<Level> = builder(11).generate_fixed(5, 6, 3, Some(200)).unwrap();
        let second: Vec<Level> = builder(11).generate_fixed(5, 6, 3, Some(200)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fixed_levels_are_rated() {
        let mut b: LevelBatchBuilder = builder(5);
        let levels: Vec<Level> = b.generate_fixed(4, 3, 4, Some(300)).unwrap();
        assert!(!levels.is_empty());
        for level in &levels {
            assert_eq!(level.config().tier, Tier::Normal);
            assert_eq!(level.rated(), Tier::Normal);
            check_level(level);
        }
        // Every accepted grid is unique
        for (i, a) in levels.iter().enumerate() {
            for other in &levels[i + 1..] {
                assert_ne!(a.grid(), other.grid());
            }
        }
    }

    #[test]
    fn fixed_config_out_of_range() {
        let mut b: LevelBatchBuilder = builder(5);
        assert!(matches!(
            b.generate_fixed(9, 5, 1, None),
            Err(LevelError::Config(_))
        ));
        assert!(matches!(
            b.generate_fixed(4, 17, 1, None),
            Err(LevelError::Config(_))
        ));
    }

    #[test]
    fn numbers_continue_from_cache() {
        let mut b: LevelBatchBuilder = builder(9);
        let levels: Vec<Level> = b.generate_fixed(4, 4, 2, None).unwrap();
        assert_eq!(levels[0].number(), config::BASE_LEVEL);
        assert_eq!(
            b.cache().next_level_number(),
            levels[levels.len() - 1].number() + 1
        );
    }

    #[test]
    fn raised_abort_flag_stops_the_batch() {
        let flag: Arc<AtomicBool> = Arc::new(AtomicBool::new(true));
        let mut b: LevelBatchBuilder = builder(1).with_abort(flag);
        assert!(b.generate_batch(5, Some(101)).is_empty());
    }

    struct FixedSource {
        payload: String,
    }

    impl CandidateSource for FixedSource {
        fn fetch(&mut self, _config: &PuzzleConfig) -> Option<String> {
            Some(self.payload.clone())
        }
    }

    fn snake_payload() -> String {
        snake_payload_with(json!([[1, 0, 0, 0], [2, 0, 0, 0], [0, 0, 0, 0], [3, 0, 0, 0]]))
    }

    fn snake_payload_with(grid: serde_json::Value) -> String {
        let solution: Vec<[usize; 2]> = (0..4)
            .flat_map(|x| {
                let column: Vec<[usize; 2]> = (0..4).map(|y| [x, y]).collect();
                if x % 2 == 0 {
                    column
                } else {
                    column.into_iter().rev().collect()
                }
            })
            .collect();
        json!({
            "difficulty": "normal",
            "gridSize": 4,
            "grid": grid,
            "solution": solution,
        })
        .to_string()
    }

    #[test]
    fn external_level_is_used_first() {
        let source: FixedSource = FixedSource {
            payload: snake_payload(),
        };
        let mut b: LevelBatchBuilder = builder(2).with_source(Box::new(source));
        let levels: Vec<Level> = b.generate_fixed(4, 3, 2, Some(101)).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].path().cells()[..4], [(0, 0), (0, 1), (0, 2), (0, 3)]);

        // The second proposal is a duplicate grid, so the level comes from the path search
        assert_ne!(levels[0].grid(), levels[1].grid());
        check_level(&levels[1]);
    }

    #[test]
    fn external_level_with_two_labels_falls_back_to_search() {
        // Labels 1 and 2 on the ends of the path
        let payload: String =
            snake_payload_with(json!([[1, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [2, 0, 0, 0]]));
        let source: FixedSource = FixedSource { payload };
        let mut b: LevelBatchBuilder = builder(6).with_source(Box::new(source));
        let levels: Vec<Level> = b.generate_fixed(4, 3, 1, Some(101)).unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].config().number_count, 3);
        check_level(&levels[0]);
    }

    #[test]
    fn bad_external_level_falls_back_to_search() {
        let source: FixedSource = FixedSource {
            payload: "{\"difficulty\": \"normal\"}".to_string(),
        };
        let mut b: LevelBatchBuilder = builder(4).with_source(Box::new(source));
        let levels: Vec<Level> = b.generate_fixed(5, 5, 1, Some(101)).unwrap();
        assert_eq!(levels.len(), 1);
        check_level(&levels[0]);
    }

    #[test]
    fn empty_store_starts_at_base_level() {
        let settings: BatchSettings = BatchSettings {
            seed: Some(12),
            base_level: 500,
            ..Default::default()
        };
        let mut b: LevelBatchBuilder = LevelBatchBuilder::from_store(&MemoryStore::new(), settings);
        assert_eq!(b.cache().next_level_number(), 500);
        let levels: Vec<Level> = b.generate_fixed(4, 3, 1, None).unwrap();
        assert_eq!(levels[0].number(), 500);
    }

    struct ReadOnlyStore;

    impl LevelStore for ReadOnlyStore {
        fn load_all(&self) -> Result<Vec<StoredLevel>, StoreError> {
            Ok(Vec::new())
        }

        fn write_batch(&mut self, _records: &[LevelRecord]) -> Result<(), StoreError> {
            Err(StoreError::Schema("read-only collection".to_string()))
        }
    }

    #[test]
    fn write_levels_reports_storage_errors() {
        let levels: Vec<Level> = builder(13).generate_fixed(4, 3, 2, Some(101)).unwrap();

        let mut store: MemoryStore = MemoryStore::new();
        assert_eq!(write_levels(&mut store, &levels), Ok(levels.len()));
        assert!(store.get("level_0101").is_some());

        assert!(matches!(
            write_levels(&mut ReadOnlyStore, &levels),
            Err(LevelError::StorageUnavailable(_))
        ));
    }

    #[test]
    fn summary_counts() {
        let mut b: LevelBatchBuilder = builder(8);
        let levels: Vec<Level> = b.generate_fixed(4, 3, 3, Some(104)).unwrap();
        let summary: BatchSummary = BatchSummary::from_levels(&levels);
        assert_eq!(summary.total, levels.len());
        assert_eq!(summary.by_size.get(&4), Some(&levels.len()));
        assert_eq!(summary.by_tier.get(&Tier::Normal), Some(&levels.len()));
        assert_eq!(summary.first_level, Some(104));
        assert!(summary.extreme_levels.is_empty());
        assert!(summary.to_string().starts_with("Levels generated: "));
    }
}
