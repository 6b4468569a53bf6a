//! Fetch command implementation

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{fetch_movies, MovieSource};
use crate::progress::fetch_progress_bar;
use crate::raw::save_raw_records;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Fetch options
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Ids to fetch instead of the configured list
    pub ids: Option<Vec<i64>>,
    /// Keep an existing raw file instead of fetching again
    pub skip_if_exists: bool,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

/// Fetch statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchStats {
    pub raw_path: String,
    pub requested: usize,
    pub fetched: usize,
    pub missing: Vec<i64>,
    pub failed: Vec<i64>,
    /// True when an existing raw file was kept
    pub skipped: bool,
}

/// Fetch raw movie records and save them as the raw JSON batch
pub async fn cmd_fetch(
    config: &Config,
    source: &dyn MovieSource,
    options: FetchOptions,
) -> Result<FetchStats> {
    let raw_path = config.raw_path();
    let ids = options.ids.unwrap_or_else(|| config.movie_ids.clone());

    if options.skip_if_exists && raw_path.exists() {
        info!(path = %raw_path.display(), "Raw data already present, skipping fetch");
        return Ok(FetchStats {
            raw_path: raw_path.display().to_string(),
            requested: ids.len(),
            skipped: true,
            ..Default::default()
        });
    }

    let progress = fetch_progress_bar(ids.len() as u64, options.show_progress);
    let outcome = fetch_movies(source, &ids, &progress).await;
    progress.finish_and_clear();
    let outcome = outcome?;

    save_raw_records(&raw_path, &outcome.records)?;

    Ok(FetchStats {
        raw_path: raw_path.display().to_string(),
        requested: ids.len(),
        fetched: outcome.records.len(),
        missing: outcome.missing,
        failed: outcome.failed.into_iter().map(|(id, _)| id).collect(),
        skipped: false,
    })
}

/// Print fetch statistics to console
pub fn print_fetch_stats(stats: &FetchStats) {
    if stats.skipped {
        println!("✓ Raw data already present at {} (fetch skipped)", stats.raw_path);
        return;
    }

    println!("\n📥 Fetch Complete\n");
    println!("Requested: {}", stats.requested);
    println!("Fetched: {}", stats.fetched);
    if !stats.missing.is_empty() {
        println!("Not found: {:?}", stats.missing);
    }
    if !stats.failed.is_empty() {
        println!("Failed: {:?}", stats.failed);
    }
    println!("Saved to: {}", stats.raw_path);
}
