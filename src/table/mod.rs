//! The normalized movie table and its delimited-file form
//!
//! The table is the hand-off between pipeline stages. It enforces id
//! uniqueness and persists to a CSV file with one header row and one row per
//! movie. List columns hold a JSON array of strings so any name survives a
//! round trip. Profit and ROI are written for readers of the file but
//! recomputed from budget and revenue on load.

use crate::error::{Error, Result};
use crate::normalize::NormalizedMovie;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Column order of the persisted table
pub const COLUMNS: [&str; 17] = [
    "id",
    "title",
    "release_year",
    "budget_musd",
    "revenue_musd",
    "profit_musd",
    "roi",
    "vote_average",
    "vote_count",
    "popularity",
    "runtime",
    "genres",
    "director",
    "top_cast",
    "is_franchise",
    "collection_id",
    "collection_name",
];

/// Why a normalized row was left out of the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum DropReason {
    MissingId,
    DuplicateId { id: i64 },
}

/// A normalized row that did not make it into the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRow {
    /// Position in the normalized sequence
    pub index: usize,
    pub title: String,
    #[serde(flatten)]
    pub reason: DropReason,
}

/// Normalized rows keyed uniquely by source id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieTable {
    rows: Vec<NormalizedMovie>,
    dropped: Vec<DroppedRow>,
}

impl MovieTable {
    /// Assemble a table, keeping the first row seen for each id
    pub fn from_rows(rows: Vec<NormalizedMovie>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(rows.len());
        let mut dropped = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            let reason = match row.id {
                None => Some(DropReason::MissingId),
                Some(id) if !seen.insert(id) => Some(DropReason::DuplicateId { id }),
                Some(_) => None,
            };

            match reason {
                Some(reason) => {
                    warn!(index, title = %row.title, ?reason, "Dropping row from movie table");
                    dropped.push(DroppedRow {
                        index,
                        title: row.title,
                        reason,
                    });
                }
                None => kept.push(row),
            }
        }

        Self { rows: kept, dropped }
    }

    pub fn rows(&self) -> &[NormalizedMovie] {
        &self.rows
    }

    pub fn dropped(&self) -> &[DroppedRow] {
        &self.dropped
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&NormalizedMovie> {
        self.rows.iter().find(|m| m.id == Some(id))
    }

    /// Serialize to CSV bytes, header row first
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(COLUMNS)?;
        for row in &self.rows {
            writer.serialize(TableRecord::try_from(row)?)?;
        }

        writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }

    /// Blake3 digest of the CSV form, for comparing runs
    pub fn digest(&self) -> Result<String> {
        Ok(blake3::hash(&self.to_csv_bytes()?).to_hex().to_string())
    }

    /// Write the table to a CSV file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_csv_bytes()?)?;
        info!(rows = self.rows.len(), path = %path.display(), "Saved movie table");
        Ok(())
    }

    /// Read a table written by [`MovieTable::save`]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::TableNotFound(path.to_path_buf()));
        }

        debug!("Loading movie table from {:?}", path);
        let mut reader = csv::Reader::from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers != COLUMNS {
            return Err(Error::TableSchema(format!(
                "expected columns [{}], found [{}]",
                COLUMNS.join(", "),
                headers.join(", ")
            )));
        }

        let mut rows = Vec::new();
        for record in reader.deserialize::<TableRecord>() {
            rows.push(NormalizedMovie::try_from(record?)?);
        }

        let table = Self::from_rows(rows);
        info!(rows = table.len(), path = %path.display(), "Loaded movie table");
        Ok(table)
    }
}

/// Flat on-disk row
#[derive(Debug, Serialize, Deserialize)]
struct TableRecord {
    id: Option<i64>,
    title: String,
    release_year: Option<i32>,
    budget_musd: Option<f64>,
    revenue_musd: Option<f64>,
    profit_musd: Option<f64>,
    roi: Option<f64>,
    vote_average: Option<f64>,
    vote_count: Option<i64>,
    popularity: Option<f64>,
    runtime: Option<i64>,
    genres: String,
    director: Option<String>,
    top_cast: String,
    is_franchise: bool,
    collection_id: Option<i64>,
    collection_name: Option<String>,
}

impl TryFrom<&NormalizedMovie> for TableRecord {
    type Error = Error;

    fn try_from(movie: &NormalizedMovie) -> Result<Self> {
        Ok(Self {
            id: movie.id,
            title: movie.title.clone(),
            release_year: movie.release_year,
            budget_musd: movie.budget_musd,
            revenue_musd: movie.revenue_musd,
            profit_musd: movie.profit_musd,
            roi: movie.roi,
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            popularity: movie.popularity,
            runtime: movie.runtime,
            genres: serde_json::to_string(&movie.genres)?,
            director: movie.director.clone(),
            top_cast: serde_json::to_string(&movie.top_cast)?,
            is_franchise: movie.is_franchise,
            collection_id: movie.collection_id,
            collection_name: movie.collection_name.clone(),
        })
    }
}

/// Decode a list column; an empty cell is an empty list
fn parse_list(column: &str, cell: &str) -> Result<Vec<String>> {
    if cell.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(cell)
        .map_err(|e| Error::TableSchema(format!("column {} is not a JSON list: {}", column, e)))
}

impl TryFrom<TableRecord> for NormalizedMovie {
    type Error = Error;

    fn try_from(record: TableRecord) -> Result<Self> {
        Ok(NormalizedMovie {
            id: record.id,
            title: record.title,
            release_year: record.release_year,
            vote_average: record.vote_average,
            vote_count: record.vote_count,
            popularity: record.popularity,
            runtime: record.runtime,
            genres: parse_list("genres", &record.genres)?,
            director: record.director.filter(|d| !d.is_empty()),
            top_cast: parse_list("top_cast", &record.top_cast)?,
            is_franchise: record.is_franchise,
            collection_id: record.collection_id,
            collection_name: record.collection_name.filter(|n| !n.is_empty()),
            ..NormalizedMovie::default()
        }
        .with_financials(record.budget_musd, record.revenue_musd))
    }
}
