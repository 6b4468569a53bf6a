//! Rank and search commands over the saved movie table

use crate::config::Config;
use crate::error::Result;
use crate::query::{filter_search, rank, Direction, Metric, Predicate, RankOptions};
use crate::report::{format_value, metric_precision, MovieSummary, RankedRow};
use crate::table::MovieTable;
use serde::Serialize;
use tracing::info;

/// Ranking result for CLI display
#[derive(Debug, Clone, Serialize)]
pub struct RankResult {
    pub metric: Metric,
    pub direction: Direction,
    pub min_budget_musd: Option<f64>,
    pub min_vote_count: Option<i64>,
    pub rows: Vec<RankedRow>,
}

/// Rank options from command-line arguments
///
/// Without an explicit `n` the configured `analysis.top_n` applies.
pub fn rank_options(
    config: &Config,
    metric: Metric,
    direction: Direction,
    n: Option<usize>,
    min_budget_musd: Option<f64>,
    min_vote_count: Option<i64>,
) -> RankOptions {
    let mut options = RankOptions::new(metric, direction, n.unwrap_or(config.analysis.top_n));
    options.min_budget_musd = min_budget_musd;
    options.min_vote_count = min_vote_count;
    options
}

/// Rank the saved table by a metric
pub fn cmd_rank(config: &Config, options: RankOptions) -> Result<RankResult> {
    let table = MovieTable::load(&config.table_path())?;
    let ranked = rank(table.rows(), &options)?;
    info!(metric = %options.metric, results = ranked.len(), "Ranked movies");

    Ok(RankResult {
        metric: options.metric,
        direction: options.direction,
        min_budget_musd: options.min_budget_musd,
        min_vote_count: options.min_vote_count,
        rows: RankedRow::from_ranked(&ranked, options.metric),
    })
}

/// Search result for CLI display
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub predicates: Vec<Predicate>,
    pub movies: Vec<MovieSummary>,
}

/// Search the saved table with every predicate required
pub fn cmd_search(config: &Config, predicates: Vec<Predicate>) -> Result<SearchResult> {
    let table = MovieTable::load(&config.table_path())?;
    let matches = filter_search(table.rows(), &predicates)?;
    info!(predicates = predicates.len(), results = matches.len(), "Searched movies");

    Ok(SearchResult {
        movies: matches.into_iter().map(MovieSummary::from).collect(),
        predicates,
    })
}

/// Print ranking results to console
pub fn print_rank_result(result: &RankResult) {
    let order = match result.direction {
        Direction::Desc => "highest",
        Direction::Asc => "lowest",
    };
    println!("\n🏆 {} ({} first)\n", result.metric.label(), order);

    if result.rows.is_empty() {
        println!("No movies with a known {}.", result.metric);
        return;
    }

    let precision = metric_precision(result.metric);
    for (i, row) in result.rows.iter().enumerate() {
        println!("{}. {} ({:.*})", i + 1, row.title, precision, row.value);
    }
}

/// Print search results to console
pub fn print_search_result(result: &SearchResult) {
    println!("\n🔍 Found {} movies:\n", result.movies.len());

    for movie in &result.movies {
        let year = movie
            .release_year
            .map_or_else(|| "?".to_string(), |y| y.to_string());
        println!("• {} ({})", movie.title, year);
        if let Some(director) = &movie.director {
            println!("  Director: {}", director);
        }
        println!("  Rating: {}", format_value(movie.vote_average, 1));
    }
}
