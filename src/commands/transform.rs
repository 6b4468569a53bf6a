//! Transform command implementation

use crate::config::Config;
use crate::error::Result;
use crate::normalize::normalize;
use crate::raw::load_raw_records;
use crate::table::{DroppedRow, MovieTable};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Transform statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformStats {
    pub raw_path: String,
    pub table_path: String,
    pub records_in: usize,
    pub rows_written: usize,
    pub dropped: Vec<DroppedRow>,
    /// Blake3 digest of the written table
    pub digest: String,
}

/// Normalize the raw batch and write the movie table
pub fn cmd_transform(config: &Config) -> Result<TransformStats> {
    let raw_path = config.raw_path();
    let table_path = config.table_path();

    let records = load_raw_records(&raw_path)?;
    let table = MovieTable::from_rows(normalize(&records));
    table.save(&table_path)?;
    let digest = table.digest()?;

    info!(
        records = records.len(),
        rows = table.len(),
        dropped = table.dropped().len(),
        "Transform complete"
    );

    Ok(TransformStats {
        raw_path: raw_path.display().to_string(),
        table_path: table_path.display().to_string(),
        records_in: records.len(),
        rows_written: table.len(),
        dropped: table.dropped().to_vec(),
        digest,
    })
}

/// Print transform statistics to console
pub fn print_transform_stats(stats: &TransformStats) {
    println!("\n🧹 Transform Complete\n");
    println!("Raw records: {}", stats.records_in);
    println!("Rows written: {}", stats.rows_written);
    if !stats.dropped.is_empty() {
        println!("Rows dropped: {}", stats.dropped.len());
        for row in &stats.dropped {
            println!("  • #{} {:?}: {:?}", row.index, row.title, row.reason);
        }
    }
    println!("Table: {}", stats.table_path);
    println!("Digest: {}", stats.digest);
}
