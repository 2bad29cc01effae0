/*
export.rs

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

//! Export levels to a local JSON file.
//!
//! The file is a JSON array. Each entry uses the format of the content generation service:
//!
//! ```json
//! [{"difficulty": "normal", "gridSize": 4, "grid": [[1, 0, 0, 0], ...], "solution": [[0, 0], ...], "level": 101}]
//! ```
//!
//! The same file can be checked again with the `--verify` option.

use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::generator::difficulty::Tier;
use crate::generator::level::Level;

/// Level entry of the export file.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportedLevel {
    pub difficulty: Tier,
    pub grid_size: usize,
    pub grid: Vec<Vec<u32>>,
    pub solution: Vec<[usize; 2]>,
    pub level: u32,
}

impl From<&Level> for ExportedLevel {
    fn from(level: &Level) -> Self {
        Self {
            difficulty: level.config().tier,
            grid_size: level.config().grid_size,
            grid: level.grid().rows(),
            solution: level.path().cells().iter().map(|c| [c.0, c.1]).collect(),
            level: level.number(),
        }
    }
}

/// Write the levels to the given file. An existing file is replaced.
///
/// # Errors
///
/// Return the I/O error when the file cannot be written.
pub fn export_levels(levels: &[Level], file: &Path) -> io::Result<()> {
    let entries: Vec<ExportedLevel> = levels.iter().map(ExportedLevel::from).collect();

    let f: File = File::create(file)?;
    let mut writer: BufWriter<File> = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut writer, &entries)?;
    writer.flush()?;

    info!("Exported {} levels to {}", entries.len(), file.display());
    debug!("Export file {file:?} written");
    Ok(())
}
