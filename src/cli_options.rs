/*
cli_options.rs

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

//! Process command-line options and run the generator.
//!
//! # Examples
//!
//! Generate 100 levels and add them to the `levels.json` collection:
//!
//! ```
//! $ puzzlepath
//! ```
//!
//! Generate 20 levels with a fixed seed, without updating the collection, and save them to a
//! local file:
//!
//! ```
//! $ puzzlepath --count 20 --seed 42 --no-upload --output new_levels.json
//! ```
//!
//! Generate 10 levels of 6x6 with 9 numbers, starting at level 500:
//!
//! ```
//! $ puzzlepath --size 6 --numbers 9 --count 10 --start-level 500
//! ```
//!
//! Check a file of levels produced by another tool:
//!
//! ```
//! $ puzzlepath --verify candidates.json
//! entry 0: ok, 4x4 with 3 numbers (normal)
//! entry 1: invalid candidate: path visits a cell more than once
//! 2 entries, 1 invalid
//! ```

use clap::Parser;
use log::{LevelFilter, debug, error, warn};
use std::fs;
use std::path::{Path, PathBuf};

use puzzlepath::config::{BatchSettings, COPYRIGHT_NOTICE};
use puzzlepath::external::{self, RawCandidate};
use puzzlepath::generator::batch::{self, BatchSummary, LevelBatchBuilder};
use puzzlepath::generator::level::Level;
use puzzlepath::saver::export;
use puzzlepath::saver::store::JsonStore;

/// File used when the levels cannot be written to the store and no output file is given.
const UNSAVED_LEVELS: &str = "unsaved_levels.json";

/// Generate levels for the numbered path puzzle game.
#[derive(Parser, Debug)]
#[command(about, long_about = None, version, long_version = COPYRIGHT_NOTICE)]
struct Args {
    /// Number of levels to generate
    #[arg(short, long, default_value_t = 100)]
    count: usize,

    /// Number of the first level [default: the number after the last stored level]
    #[arg(short = 'l', long)]
    start_level: Option<u32>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Do not add the levels to the store
    #[arg(long, default_value_t = false)]
    no_upload: bool,

    /// Also save the levels to this JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Level collection file
    #[arg(long, default_value = "levels.json")]
    store: PathBuf,

    /// Grid size of all the levels (requires --numbers)
    #[arg(long, requires = "numbers")]
    size: Option<usize>,

    /// Number of labels of all the levels (requires --size)
    #[arg(short, long, requires = "size")]
    numbers: Option<usize>,

    /// Check the levels in a JSON file instead of generating levels
    #[arg(long, conflicts_with_all = ["size", "numbers", "start_level", "output"])]
    verify: Option<PathBuf>,

    /// Print every generated level
    #[arg(short, long, default_value_t = false)]
    summary: bool,

    /// Enable debug messages
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

/// Parse the command-line options and run. Return the exit status.
pub fn parse() -> u8 {
    let args: Args = Args::parse();

    let mut logger: env_logger::Builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.debug {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();
    debug!("{args:?}");

    if let Some(file) = &args.verify {
        return verify(file);
    }
    generate(&args)
}

/// Check the candidates of a JSON file.
fn verify(file: &Path) -> u8 {
    let content: String = match fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Cannot read {}: {e}", file.display());
            return 1;
        }
    };
    let candidates: Vec<RawCandidate> = match external::decode_candidates(&content) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {e}", file.display());
            return 1;
        }
    };

    let mut failures: usize = 0;
    for (i, candidate) in candidates.iter().enumerate() {
        match candidate.verify() {
            Ok(c) => println!("entry {i}: ok, {}", c.config()),
            Err(e) => {
                failures += 1;
                println!("entry {i}: {e}");
            }
        }
    }
    println!("{} entries, {failures} invalid", candidates.len());
    u8::from(failures > 0)
}

/// Generate the levels, store them, and print the summary.
fn generate(args: &Args) -> u8 {
    let mut store: JsonStore = JsonStore::new(args.store.clone());
    let settings: BatchSettings = BatchSettings {
        seed: args.seed,
        ..Default::default()
    };
    let mut builder: LevelBatchBuilder = LevelBatchBuilder::from_store(&store, settings);

    let levels: Vec<Level> = match (args.size, args.numbers) {
        (Some(size), Some(numbers)) => {
            match builder.generate_fixed(size, numbers, args.count, args.start_level) {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return 1;
                }
            }
        }
        _ => builder.generate_batch(args.count, args.start_level),
    };
    if levels.is_empty() {
        warn!("No level generated");
    }

    let mut status: u8 = 0;
    let mut export_file: Option<PathBuf> = args.output.clone();
    if !args.no_upload && !levels.is_empty() {
        match batch::write_levels(&mut store, &levels) {
            Ok(written) => println!("Added {written} levels to {}", args.store.display()),
            Err(e) => {
                error!("Cannot write the levels to {}: {e}", args.store.display());
                status = 1;
                export_file.get_or_insert_with(|| PathBuf::from(UNSAVED_LEVELS));
            }
        }
    }
    if let Some(file) = &export_file {
        if let Err(e) = export::export_levels(&levels, file) {
            eprintln!("Cannot export the levels to {}: {e}", file.display());
            status = 1;
        }
    }

    if args.summary {
        for level in &levels {
            println!(
                "level {}: {}, rated {}",
                level.number(),
                level.config(),
                level.rated()
            );
        }
    }
    println!("{}", BatchSummary::from_levels(&levels));
    status
}
