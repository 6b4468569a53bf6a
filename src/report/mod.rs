//! Analysis report assembled from the normalized table
//!
//! The report is plain data: rankings, the canned searches, group-by
//! summaries and chart series. Rendering to the terminal lives in
//! `commands::analyze`.

use crate::config::AnalysisConfig;
use crate::derived::{
    franchise_summaries, genre_roi_summaries, top_genres, yearly_revenue,
    FranchiseSummary, GenreCount, GenreRoiSummary, YearlyRevenue,
};
use crate::error::Result;
use crate::normalize::NormalizedMovie;
use crate::query::{
    compare_franchise_vs_standalone, director_leaderboard, filter_search, rank, Direction,
    DirectorStats, FranchiseComparison, Metric, Predicate, RankOptions,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Metrics compared between franchise and standalone movies
pub const COMPARISON_METRICS: [Metric; 5] = [
    Metric::Revenue,
    Metric::Budget,
    Metric::Roi,
    Metric::Popularity,
    Metric::VoteAverage,
];

/// One row of a ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub id: Option<i64>,
    pub title: String,
    pub value: f64,
}

impl RankedRow {
    /// Pair a ranked movie with its metric value; rows without one are skipped
    pub fn from_ranked(rows: &[&NormalizedMovie], metric: Metric) -> Vec<RankedRow> {
        rows.iter()
            .filter_map(|movie| {
                metric.value(movie).map(|value| RankedRow {
                    id: movie.id,
                    title: movie.title.clone(),
                    value,
                })
            })
            .collect()
    }
}

/// A titled ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub title: String,
    pub metric: Metric,
    pub direction: Direction,
    pub rows: Vec<RankedRow>,
}

/// Movie summary used in search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: Option<i64>,
    pub title: String,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    pub vote_average: Option<f64>,
    pub runtime: Option<i64>,
}

impl From<&NormalizedMovie> for MovieSummary {
    fn from(movie: &NormalizedMovie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            release_year: movie.release_year,
            director: movie.director.clone(),
            vote_average: movie.vote_average,
            runtime: movie.runtime,
        }
    }
}

/// A titled search with its matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub title: String,
    pub predicates: Vec<Predicate>,
    pub movies: Vec<MovieSummary>,
}

/// Everything `cinemetrics analyze` reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub movie_count: usize,
    pub rankings: Vec<Ranking>,
    pub searches: Vec<SearchReport>,
    pub franchise_comparison: FranchiseComparison,
    pub top_franchises: Vec<FranchiseSummary>,
    pub directors: Vec<DirectorStats>,
    pub top_genres: Vec<GenreCount>,
    pub genre_roi: Vec<GenreRoiSummary>,
    pub yearly_revenue: Vec<YearlyRevenue>,
}

/// Order matches by a metric, keeping unknown values last and ties in table order
pub fn order_matches<'a>(
    mut rows: Vec<&'a NormalizedMovie>,
    metric: Metric,
    direction: Direction,
) -> Vec<&'a NormalizedMovie> {
    rows.sort_by(|a, b| match (metric.value(a), metric.value(b)) {
        (Some(x), Some(y)) => match direction {
            Direction::Desc => y.total_cmp(&x),
            Direction::Asc => x.total_cmp(&y),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}

fn ranking(rows: &[NormalizedMovie], title: &str, options: RankOptions) -> Result<Ranking> {
    let ranked = rank(rows, &options)?;
    Ok(Ranking {
        title: title.to_string(),
        metric: options.metric,
        direction: options.direction,
        rows: RankedRow::from_ranked(&ranked, options.metric),
    })
}

fn search(
    rows: &[NormalizedMovie],
    title: &str,
    predicates: Vec<Predicate>,
    order_by: Metric,
    direction: Direction,
) -> Result<SearchReport> {
    let matches = order_matches(filter_search(rows, &predicates)?, order_by, direction);
    Ok(SearchReport {
        title: title.to_string(),
        predicates,
        movies: matches.into_iter().map(MovieSummary::from).collect(),
    })
}

fn rankings(rows: &[NormalizedMovie], settings: &AnalysisConfig) -> Result<Vec<Ranking>> {
    let n = settings.top_n;
    let budget_floor = settings.min_budget_musd;
    let vote_floor = settings.min_vote_count;

    Ok(vec![
        ranking(rows, "Highest revenue", RankOptions::new(Metric::Revenue, Direction::Desc, n))?,
        ranking(rows, "Lowest revenue", RankOptions::new(Metric::Revenue, Direction::Asc, n))?,
        ranking(rows, "Highest budget", RankOptions::new(Metric::Budget, Direction::Desc, n))?,
        ranking(rows, "Lowest budget", RankOptions::new(Metric::Budget, Direction::Asc, n))?,
        ranking(rows, "Highest profit", RankOptions::new(Metric::Profit, Direction::Desc, n))?,
        ranking(rows, "Lowest profit", RankOptions::new(Metric::Profit, Direction::Asc, n))?,
        ranking(
            rows,
            "Highest ROI",
            RankOptions::new(Metric::Roi, Direction::Desc, n).min_budget(budget_floor),
        )?,
        ranking(
            rows,
            "Lowest ROI",
            RankOptions::new(Metric::Roi, Direction::Asc, n).min_budget(budget_floor),
        )?,
        ranking(rows, "Most voted", RankOptions::new(Metric::VoteCount, Direction::Desc, n))?,
        ranking(
            rows,
            "Highest rated",
            RankOptions::new(Metric::VoteAverage, Direction::Desc, n).min_votes(vote_floor),
        )?,
        ranking(
            rows,
            "Lowest rated",
            RankOptions::new(Metric::VoteAverage, Direction::Asc, n).min_votes(vote_floor),
        )?,
        ranking(rows, "Most popular", RankOptions::new(Metric::Popularity, Direction::Desc, n))?,
    ])
}

fn searches(rows: &[NormalizedMovie]) -> Result<Vec<SearchReport>> {
    Ok(vec![
        search(
            rows,
            "Science Fiction Action movies starring Bruce Willis",
            vec![
                Predicate::genre("Science Fiction"),
                Predicate::genre("Action"),
                Predicate::cast("Bruce Willis"),
            ],
            Metric::VoteAverage,
            Direction::Desc,
        )?,
        search(
            rows,
            "Uma Thurman movies directed by Quentin Tarantino",
            vec![
                Predicate::cast("Uma Thurman"),
                Predicate::director("Quentin Tarantino"),
            ],
            Metric::Runtime,
            Direction::Asc,
        )?,
    ])
}

/// Build the full report for a table
pub fn build_report(rows: &[NormalizedMovie], settings: &AnalysisConfig) -> Result<AnalysisReport> {
    debug!(rows = rows.len(), "Building analysis report");

    let genres = top_genres(rows, settings.top_genres);
    let genre_names: Vec<String> = genres.iter().map(|g| g.genre.clone()).collect();

    let mut franchises = franchise_summaries(rows);
    franchises.truncate(settings.top_n);

    let mut directors = director_leaderboard(rows, settings.director_min_movies)?;
    directors.truncate(settings.top_n);

    Ok(AnalysisReport {
        generated_at: Utc::now(),
        movie_count: rows.len(),
        rankings: rankings(rows, settings)?,
        searches: searches(rows)?,
        franchise_comparison: compare_franchise_vs_standalone(rows, &COMPARISON_METRICS)?,
        top_franchises: franchises,
        directors,
        genre_roi: genre_roi_summaries(rows, &genre_names),
        top_genres: genres,
        yearly_revenue: yearly_revenue(rows),
    })
}

impl AnalysisReport {
    pub fn ranking(&self, title: &str) -> Option<&Ranking> {
        self.rankings.iter().find(|r| r.title == title)
    }
}

/// Absent-aware number formatting for report tables
pub fn format_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}

/// Precision used when printing a metric
pub fn metric_precision(metric: Metric) -> usize {
    match metric {
        Metric::VoteCount | Metric::Runtime => 0,
        Metric::Roi | Metric::VoteAverage => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64, title: &str) -> NormalizedMovie {
        NormalizedMovie {
            id: Some(id),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn sample_table() -> Vec<NormalizedMovie> {
        let mut armageddon = movie(95, "Armageddon").with_financials(Some(140.0), Some(553.7));
        armageddon.genres = vec!["Action".into(), "Science Fiction".into()];
        armageddon.top_cast = vec!["Bruce Willis".into(), "Billy Bob Thornton".into()];
        armageddon.vote_average = Some(6.8);
        armageddon.vote_count = Some(8000);
        armageddon.runtime = Some(151);

        let mut looper = movie(59967, "Looper").with_financials(Some(30.0), Some(176.5));
        looper.genres = vec!["Action".into(), "Thriller".into(), "Science Fiction".into()];
        looper.top_cast = vec!["Joseph Gordon-Levitt".into(), "Bruce Willis".into()];
        looper.vote_average = Some(6.9);
        looper.vote_count = Some(10000);

        let mut kill_bill = movie(24, "Kill Bill: Vol. 1").with_financials(Some(30.0), Some(180.9));
        kill_bill.genres = vec!["Action".into(), "Crime".into()];
        kill_bill.top_cast = vec!["Uma Thurman".into()];
        kill_bill.director = Some("Quentin Tarantino".into());
        kill_bill.runtime = Some(111);
        kill_bill.vote_average = Some(8.0);
        kill_bill.vote_count = Some(17000);
        kill_bill.is_franchise = true;
        kill_bill.collection_id = Some(2883);

        let mut pulp = movie(680, "Pulp Fiction").with_financials(Some(8.0), Some(213.9));
        pulp.genres = vec!["Thriller".into(), "Crime".into()];
        pulp.top_cast = vec!["John Travolta".into(), "Samuel L. Jackson".into(), "Uma Thurman".into()];
        pulp.director = Some("Quentin Tarantino".into());
        pulp.runtime = Some(154);
        pulp.vote_average = Some(8.5);
        pulp.vote_count = Some(5);

        vec![armageddon, looper, kill_bill, pulp]
    }

    #[test]
    fn test_report_rankings_apply_thresholds() {
        let report = build_report(&sample_table(), &AnalysisConfig::default()).unwrap();
        assert_eq!(report.movie_count, 4);

        // Pulp Fiction has the best ROI but a budget under the floor
        let roi = report.ranking("Highest ROI").unwrap();
        assert_eq!(roi.rows[0].title, "Kill Bill: Vol. 1");
        assert!(roi.rows.iter().all(|r| r.title != "Pulp Fiction"));

        // and too few votes to be ranked by rating
        let rated = report.ranking("Highest rated").unwrap();
        assert_eq!(rated.rows[0].title, "Kill Bill: Vol. 1");
        assert_eq!(rated.rows.len(), 3);

        let revenue = report.ranking("Highest revenue").unwrap();
        assert_eq!(revenue.rows[0].id, Some(95));
    }

    #[test]
    fn test_report_canned_searches() {
        let report = build_report(&sample_table(), &AnalysisConfig::default()).unwrap();

        let willis = &report.searches[0];
        let titles: Vec<&str> = willis.movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Looper", "Armageddon"]);

        let tarantino = &report.searches[1];
        let titles: Vec<&str> = tarantino.movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Kill Bill: Vol. 1", "Pulp Fiction"]);
    }

    #[test]
    fn test_report_group_sections() {
        let report = build_report(&sample_table(), &AnalysisConfig::default()).unwrap();

        assert_eq!(report.top_genres[0].genre, "Action");
        assert_eq!(report.top_genres[0].movie_count, 3);
        assert_eq!(report.genre_roi[0].genre, "Action");
        assert_eq!(report.top_franchises.len(), 1);
        assert_eq!(report.franchise_comparison.franchise.movie_count, 1);
        assert_eq!(report.franchise_comparison.standalone.movie_count, 3);
        assert_eq!(report.directors[0].director, "Quentin Tarantino");
        assert_eq!(report.directors[0].movie_count, 2);
    }

    #[test]
    fn test_report_on_empty_table() {
        let report = build_report(&[], &AnalysisConfig::default()).unwrap();
        assert_eq!(report.movie_count, 0);
        assert!(report.rankings.iter().all(|r| r.rows.is_empty()));
        assert!(report.directors.is_empty());
        assert_eq!(report.franchise_comparison.franchise.mean(Metric::Revenue), None);
    }

    #[test]
    fn test_order_matches_puts_unknown_last() {
        let mut a = movie(1, "a");
        a.runtime = Some(120);
        let b = movie(2, "b");
        let mut c = movie(3, "c");
        c.runtime = Some(90);

        let rows = [a, b, c];
        let ordered = order_matches(rows.iter().collect(), Metric::Runtime, Direction::Asc);
        let ids: Vec<Option<i64>> = ordered.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(2.5), 2), "2.50");
        assert_eq!(format_value(None, 1), "n/a");
    }
}
