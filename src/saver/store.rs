/*
store.rs

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

//! Level document store.
//!
//! The generator reads the existing levels at startup to seed the [`crate::generator::dedup`]
//! cache, and writes the new levels as one batch at the end of a run.
//! The [`LevelStore`] trait is the seam between the generator and the storage backend.
//!
//! [`JsonStore`] keeps the whole collection in a JSON file: an object that maps the document IDs
//! (`level_0101`, ...) to the level documents.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use crate::generator::difficulty::Tier;
use crate::generator::level::{Level, PuzzleConfig};

/// Type of errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store content error: {0}")]
    Schema(String),
}

/// Grid of a stored document. Older documents store a plain matrix, newer ones a map indexed by
/// the row number. Empty cells may be null.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum StoredGrid {
    Rows(Vec<Vec<Option<i64>>>),
    Keyed(BTreeMap<String, Vec<Option<i64>>>),
}

impl StoredGrid {
    /// Number of labelled cells.
    pub fn label_count(&self) -> usize {
        let count = |row: &Vec<Option<i64>>| row.iter().filter(|v| v.unwrap_or(0) > 0).count();
        match self {
            StoredGrid::Rows(rows) => rows.iter().map(count).sum(),
            StoredGrid::Keyed(rows) => rows.values().map(count).sum(),
        }
    }
}

/// Fields of a stored document that the generator reads. Other fields are ignored.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoredLevel {
    pub level: Option<u32>,
    pub grid_size: Option<usize>,
    pub difficulty: Option<String>,
    pub grid: Option<StoredGrid>,
}

impl StoredLevel {
    /// Configuration of the stored level, or None when a field is missing or the difficulty name
    /// is unknown.
    pub fn config(&self) -> Option<PuzzleConfig> {
        let tier: Tier = Tier::from_name(self.difficulty.as_deref()?)?;
        Some(PuzzleConfig::new(
            self.grid_size?,
            self.grid.as_ref()?.label_count(),
            tier,
        ))
    }
}

/// Solution step in a level document.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolutionStep {
    pub x: usize,
    pub y: usize,
}

/// Level document as written to the store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecord {
    pub id: String,
    pub difficulty: Tier,
    pub grid_size: usize,
    pub level: u32,

    /// Rows indexed by their number as a string.
    pub grid: BTreeMap<String, Vec<u32>>,
    pub solution: Vec<SolutionStep>,

    /// Set by the store when the document is written.
    pub created_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Return the document ID of a level.
pub fn level_id(level: u32) -> String {
    format!("level_{level:04}")
}

impl From<&Level> for LevelRecord {
    fn from(level: &Level) -> Self {
        Self {
            id: level_id(level.number()),
            difficulty: level.config().tier,
            grid_size: level.config().grid_size,
            level: level.number(),
            grid: level
                .grid()
                .rows()
                .into_iter()
                .enumerate()
                .map(|(i, r)| (i.to_string(), r))
                .collect(),
            solution: level
                .path()
                .cells()
                .iter()
                .map(|c| SolutionStep { x: c.0, y: c.1 })
                .collect(),
            created_at: None,
            is_active: true,
        }
    }
}

/// Storage backend for the level documents.
pub trait LevelStore {
    /// Read all the stored levels.
    fn load_all(&self) -> Result<Vec<StoredLevel>, StoreError>;

    /// Write the records. Either all the records are written, or none.
    fn write_batch(&mut self, records: &[LevelRecord]) -> Result<(), StoreError>;
}

/// Decode the documents of a collection. Documents that do not have the expected shape are
/// skipped.
fn decode_documents(docs: &BTreeMap<String, serde_json::Value>) -> Vec<StoredLevel> {
    docs.iter()
        .filter_map(
            |(id, doc)| match serde_json::from_value::<StoredLevel>(doc.clone()) {
                Ok(l) => Some(l),
                Err(e) => {
                    debug!("Skipping document {id}: {e}");
                    None
                }
            },
        )
        .collect()
}

/// Return the documents with the records added, stamped with the current time.
fn merge_records(
    mut docs: BTreeMap<String, serde_json::Value>,
    records: &[LevelRecord],
) -> Result<BTreeMap<String, serde_json::Value>, StoreError> {
    let now: DateTime<Utc> = Utc::now();
    for record in records {
        let mut record: LevelRecord = record.clone();
        record.created_at = Some(now);
        docs.insert(record.id.clone(), serde_json::to_value(&record)?);
    }
    Ok(docs)
}

/// Store that keeps the collection in a JSON file.
pub struct JsonStore {
    /// Path to the collection file.
    file: PathBuf,
}

impl JsonStore {
    /// Create a [`JsonStore`] object for the given collection file.
    pub fn new(file: PathBuf) -> Self {
        debug!("Level store file: {file:?}");
        Self { file }
    }

    /// Read the raw documents. A missing file is an empty collection.
    fn read_documents(&self) -> Result<BTreeMap<String, serde_json::Value>, StoreError> {
        let file: File = match File::open(&self.file) {
            Ok(f) => f,
            Err(error) => match error.kind() {
                ErrorKind::NotFound => return Ok(BTreeMap::new()),
                _ => return Err(StoreError::Io(error)),
            },
        };
        let reader: BufReader<File> = BufReader::new(file);
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        match value {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            _ => Err(StoreError::Schema(format!(
                "{} does not contain a JSON object",
                self.file.display()
            ))),
        }
    }
}

impl LevelStore for JsonStore {
    fn load_all(&self) -> Result<Vec<StoredLevel>, StoreError> {
        let docs: BTreeMap<String, serde_json::Value> = self.read_documents()?;
        Ok(decode_documents(&docs))
    }

    fn write_batch(&mut self, records: &[LevelRecord]) -> Result<(), StoreError> {
        let docs: BTreeMap<String, serde_json::Value> =
            merge_records(self.read_documents()?, records)?;

        // Write a temporary file next to the collection, then replace the collection with it
        let mut tmp: PathBuf = self.file.clone();
        tmp.set_extension("json.tmp");
        let file: File = File::create(&tmp)?;
        let mut writer: BufWriter<File> = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &docs)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, &self.file)?;

        debug!("Wrote {} documents to {:?}", records.len(), self.file);
        Ok(())
    }
}

/// Store that keeps the collection in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    docs: BTreeMap<String, serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a raw document.
    pub fn insert(&mut self, id: &str, doc: serde_json::Value) {
        self.docs.insert(id.to_string(), doc);
    }

    /// Return a raw document.
    pub fn get(&self, id: &str) -> Option<&serde_json::Value> {
        self.docs.get(id)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl LevelStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<StoredLevel>, StoreError> {
        Ok(decode_documents(&self.docs))
    }

    fn write_batch(&mut self, records: &[LevelRecord]) -> Result<(), StoreError> {
        self.docs = merge_records(std::mem::take(&mut self.docs), records)?;
        Ok(())
    }
}
