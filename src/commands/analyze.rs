//! Analyze command implementation

use crate::config::Config;
use crate::error::Result;
use crate::report::{build_report, format_value, metric_precision, AnalysisReport};
use crate::table::MovieTable;
use tracing::info;

/// Load the movie table and build the analysis report
pub fn cmd_analyze(config: &Config) -> Result<AnalysisReport> {
    let table = MovieTable::load(&config.table_path())?;
    let report = build_report(table.rows(), &config.analysis)?;
    info!(movies = report.movie_count, "Analysis complete");
    Ok(report)
}

/// Print the analysis report to console
pub fn print_analysis_report(report: &AnalysisReport) {
    println!("\n🎬 Movie Analysis ({} movies)\n", report.movie_count);

    for ranking in &report.rankings {
        println!("{} [{}]", ranking.title, ranking.metric.label());
        if ranking.rows.is_empty() {
            println!("  (no movies with a known value)");
        }
        let precision = metric_precision(ranking.metric);
        for (i, row) in ranking.rows.iter().enumerate() {
            println!("  {}. {} ({:.*})", i + 1, row.title, precision, row.value);
        }
        println!();
    }

    for search in &report.searches {
        println!("🔍 {}", search.title);
        if search.movies.is_empty() {
            println!("  (no matches)");
        }
        for movie in &search.movies {
            println!(
                "  • {} [{}] rating {}, runtime {}",
                movie.title,
                movie.release_year.map_or_else(|| "?".to_string(), |y| y.to_string()),
                format_value(movie.vote_average, 1),
                movie.runtime.map_or_else(|| "n/a".to_string(), |r| format!("{} min", r)),
            );
        }
        println!();
    }

    let comparison = &report.franchise_comparison;
    println!("Franchise vs Standalone");
    println!(
        "  {:<16} {:>12} {:>12}",
        "",
        format!("{} ({})", comparison.franchise.label, comparison.franchise.movie_count),
        format!("{} ({})", comparison.standalone.label, comparison.standalone.movie_count),
    );
    for mean in &comparison.franchise.means {
        println!(
            "  {:<16} {:>12} {:>12}",
            mean.metric.label(),
            format_value(mean.mean, metric_precision(mean.metric)),
            format_value(
                comparison.standalone.mean(mean.metric),
                metric_precision(mean.metric)
            ),
        );
    }
    println!();

    println!("Top franchises by revenue");
    for franchise in &report.top_franchises {
        println!(
            "  • {} ({} movies): revenue {} M$, budget {} M$, rating {}",
            franchise.name.as_deref().unwrap_or(&franchise.key),
            franchise.movie_count,
            format_value(franchise.total_revenue_musd, 1),
            format_value(franchise.total_budget_musd, 1),
            format_value(franchise.mean_rating, 2),
        );
    }
    println!();

    println!("Top directors by revenue");
    for director in &report.directors {
        println!(
            "  • {} ({} movies): revenue {} M$, rating {}",
            director.director,
            director.movie_count,
            format_value(director.total_revenue_musd, 1),
            format_value(director.mean_rating, 2),
        );
    }
    println!();

    println!("Top genres");
    for genre in &report.top_genres {
        println!("  • {}: {} movies", genre.genre, genre.movie_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fetch::tests::test_config;
    use crate::error::Error;
    use crate::normalize::NormalizedMovie;
    use tempfile::TempDir;

    #[test]
    fn test_analyze_reads_saved_table() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let rows = vec![
            NormalizedMovie {
                id: Some(1),
                title: "Big".into(),
                ..Default::default()
            }
            .with_financials(Some(20.0), Some(100.0)),
            NormalizedMovie {
                id: Some(2),
                title: "Small".into(),
                ..Default::default()
            }
            .with_financials(Some(20.0), Some(30.0)),
        ];
        MovieTable::from_rows(rows).save(&config.table_path()).unwrap();

        let report = cmd_analyze(&config).unwrap();
        assert_eq!(report.movie_count, 2);
        let profit = report.ranking("Highest profit").unwrap();
        assert_eq!(profit.rows[0].title, "Big");
        assert_eq!(profit.rows[0].value, 80.0);
    }

    #[test]
    fn test_analyze_without_table() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        assert!(matches!(cmd_analyze(&config), Err(Error::TableNotFound(_))));
    }
}
