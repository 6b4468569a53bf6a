//! Attributes derived from the normalized table
//!
//! Everything here reads the table and builds new structures; no normalized
//! field is ever modified. Aggregates go through [`crate::stats`] so absent
//! values are skipped rather than counted as zero.

use crate::normalize::NormalizedMovie;
use crate::stats::{mean_present, sum_present};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// `revenue - budget`, absent if either side is
pub fn profit(budget_musd: Option<f64>, revenue_musd: Option<f64>) -> Option<f64> {
    Some(revenue_musd? - budget_musd?)
}

/// `revenue / budget`, absent unless the budget is known and positive
pub fn roi(budget_musd: Option<f64>, revenue_musd: Option<f64>) -> Option<f64> {
    let budget = budget_musd.filter(|b| *b > 0.0)?;
    Some(revenue_musd? / budget)
}

/// Partition rows by key, keeping groups and their members in table order
pub fn group_rows<'a, K, F>(rows: &'a [NormalizedMovie], key: F) -> Vec<(K, Vec<&'a NormalizedMovie>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&NormalizedMovie) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&NormalizedMovie>)> = Vec::new();

    for row in rows {
        let Some(k) = key(row) else {
            continue;
        };
        match index.get(&k) {
            Some(&i) => groups[i].1.push(row),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![row]));
            }
        }
    }

    groups
}

/// Descending order on optional floats with absent values last
pub fn cmp_desc_absent_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// One (movie, genre) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenreExplodedRow<'a> {
    /// Position of the movie in the table
    pub row: usize,
    pub movie: &'a NormalizedMovie,
    pub genre: &'a str,
}

/// Flat-map every row to one entry per genre; genreless rows contribute nothing
pub fn explode_genres(rows: &[NormalizedMovie]) -> Vec<GenreExplodedRow<'_>> {
    rows.iter()
        .enumerate()
        .flat_map(|(row, movie)| {
            movie
                .genres
                .iter()
                .map(move |genre| GenreExplodedRow {
                    row,
                    movie,
                    genre: genre.as_str(),
                })
        })
        .collect()
}

/// Genre with the number of movies carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub movie_count: usize,
}

/// The `n` most frequent genres by distinct movie count
///
/// Ties keep the order in which the genre first appears in the table.
pub fn top_genres(rows: &[NormalizedMovie], n: usize) -> Vec<GenreCount> {
    let mut counts: Vec<GenreCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut seen: HashSet<(usize, &str)> = HashSet::new();

    for pair in explode_genres(rows) {
        if !seen.insert((pair.row, pair.genre)) {
            continue;
        }
        match index.get(pair.genre) {
            Some(&i) => counts[i].movie_count += 1,
            None => {
                index.insert(pair.genre, counts.len());
                counts.push(GenreCount {
                    genre: pair.genre.to_string(),
                    movie_count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.movie_count.cmp(&a.movie_count));
    counts.truncate(n);
    counts
}

/// ROI distribution of one genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRoiSummary {
    pub genre: String,
    pub movie_count: usize,
    pub rated_count: usize,
    pub mean_roi: Option<f64>,
    pub min_roi: Option<f64>,
    pub max_roi: Option<f64>,
}

/// ROI spread per genre, for the requested genres in the given order
pub fn genre_roi_summaries(rows: &[NormalizedMovie], genres: &[String]) -> Vec<GenreRoiSummary> {
    let exploded = explode_genres(rows);

    genres
        .iter()
        .map(|genre| {
            let members: Vec<&NormalizedMovie> = exploded
                .iter()
                .filter(|pair| pair.genre == genre.as_str())
                .map(|pair| pair.movie)
                .collect();
            let rois: Vec<f64> = members.iter().filter_map(|m| m.roi).collect();

            GenreRoiSummary {
                genre: genre.clone(),
                movie_count: members.len(),
                rated_count: rois.len(),
                mean_roi: mean_present(rois.iter().copied().map(Some)),
                min_roi: rois.iter().copied().reduce(f64::min),
                max_roi: rois.iter().copied().reduce(f64::max),
            }
        })
        .collect()
}

/// Total box office per release year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRevenue {
    pub year: i32,
    pub movie_count: usize,
    pub total_revenue_musd: Option<f64>,
}

/// Revenue summed per release year, ascending by year; undated rows are skipped
pub fn yearly_revenue(rows: &[NormalizedMovie]) -> Vec<YearlyRevenue> {
    let mut years: Vec<YearlyRevenue> = group_rows(rows, |m| m.release_year)
        .into_iter()
        .map(|(year, members)| YearlyRevenue {
            year,
            movie_count: members.len(),
            total_revenue_musd: sum_present(members.iter().map(|m| m.revenue_musd)),
        })
        .collect();
    years.sort_by_key(|y| y.year);
    years
}

/// Aggregate performance of one franchise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FranchiseSummary {
    /// Grouping key: collection id, else collection name
    pub key: String,
    pub collection_id: Option<i64>,
    pub name: Option<String>,
    /// Every row in the group, whether or not its revenue is known
    pub movie_count: usize,
    pub total_revenue_musd: Option<f64>,
    pub mean_revenue_musd: Option<f64>,
    pub total_budget_musd: Option<f64>,
    pub mean_budget_musd: Option<f64>,
    pub mean_rating: Option<f64>,
}

/// Group franchise rows by collection, highest total revenue first
///
/// Franchises with equal (or unknown) revenue keep first-appearance order.
pub fn franchise_summaries(rows: &[NormalizedMovie]) -> Vec<FranchiseSummary> {
    let mut summaries: Vec<FranchiseSummary> = group_rows(rows, NormalizedMovie::franchise_key)
        .into_iter()
        .map(|(key, members)| FranchiseSummary {
            key,
            collection_id: members.iter().find_map(|m| m.collection_id),
            name: members.iter().find_map(|m| m.collection_name.clone()),
            movie_count: members.len(),
            total_revenue_musd: sum_present(members.iter().map(|m| m.revenue_musd)),
            mean_revenue_musd: mean_present(members.iter().map(|m| m.revenue_musd)),
            total_budget_musd: sum_present(members.iter().map(|m| m.budget_musd)),
            mean_budget_musd: mean_present(members.iter().map(|m| m.budget_musd)),
            mean_rating: mean_present(members.iter().map(|m| m.vote_average)),
        })
        .collect();

    summaries.sort_by(|a, b| cmp_desc_absent_last(a.total_revenue_musd, b.total_revenue_musd));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64, genres: &[&str]) -> NormalizedMovie {
        NormalizedMovie {
            id: Some(id),
            title: format!("movie {}", id),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            ..Default::default()
        }
    }

    fn franchise_movie(id: i64, collection: i64, revenue: Option<f64>, rating: Option<f64>) -> NormalizedMovie {
        NormalizedMovie {
            id: Some(id),
            is_franchise: true,
            collection_id: Some(collection),
            collection_name: Some(format!("Collection {}", collection)),
            vote_average: rating,
            ..Default::default()
        }
        .with_financials(None, revenue)
    }

    #[test]
    fn test_profit_and_roi() {
        assert_eq!(profit(Some(10.0), Some(50.0)), Some(40.0));
        assert_eq!(roi(Some(10.0), Some(50.0)), Some(5.0));
        assert_eq!(profit(None, Some(50.0)), None);
        assert_eq!(roi(None, Some(50.0)), None);
        assert_eq!(roi(Some(0.0), Some(50.0)), None);
        assert_eq!(roi(Some(-5.0), Some(50.0)), None);
        assert_eq!(roi(Some(10.0), None), None);
    }

    #[test]
    fn test_explode_genres() {
        let rows = vec![movie(1, &["Action", "Adventure"]), movie(2, &[])];
        let exploded = explode_genres(&rows);

        assert_eq!(exploded.len(), 2);
        assert!(exploded.iter().all(|pair| pair.movie.id == Some(1)));
        assert_eq!(exploded[0].genre, "Action");
        assert_eq!(exploded[1].genre, "Adventure");
    }

    #[test]
    fn test_top_genres_counts_movies_and_breaks_ties_by_first_seen() {
        let rows = vec![
            movie(1, &["Drama", "Action"]),
            movie(2, &["Action", "Comedy"]),
            movie(3, &["Comedy", "Drama"]),
            movie(4, &["Action"]),
            movie(5, &[]),
        ];

        let top = top_genres(&rows, 3);
        let names: Vec<&str> = top.iter().map(|g| g.genre.as_str()).collect();
        assert_eq!(names, vec!["Action", "Drama", "Comedy"]);
        assert_eq!(top[0].movie_count, 3);
        assert_eq!(top[1].movie_count, 2);
        assert_eq!(top[2].movie_count, 2);

        assert_eq!(top_genres(&rows, 1).len(), 1);
        assert!(top_genres(&[], 5).is_empty());
    }

    #[test]
    fn test_franchise_summary_skips_absent_revenue() {
        let rows = vec![
            franchise_movie(1, 10, Some(10.0), Some(7.0)),
            franchise_movie(2, 10, None, None),
            franchise_movie(3, 10, Some(30.0), Some(8.0)),
            movie(4, &[]),
        ];

        let summaries = franchise_summaries(&rows);
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.collection_id, Some(10));
        assert_eq!(summary.total_revenue_musd, Some(40.0));
        assert_eq!(summary.mean_revenue_musd, Some(20.0));
        assert_eq!(summary.movie_count, 3);
        assert_eq!(summary.mean_rating, Some(7.5));
    }

    #[test]
    fn test_franchise_summaries_sorted_by_revenue() {
        let rows = vec![
            franchise_movie(1, 10, Some(5.0), None),
            franchise_movie(2, 20, Some(50.0), None),
            franchise_movie(3, 30, None, None),
        ];

        let keys: Vec<String> = franchise_summaries(&rows).into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["20", "10", "30"]);
        assert!(franchise_summaries(&rows)[2].mean_rating.is_none());
    }

    #[test]
    fn test_yearly_revenue() {
        let mut a = movie(1, &[]).with_financials(None, Some(10.0));
        a.release_year = Some(2019);
        let mut b = movie(2, &[]).with_financials(None, Some(5.0));
        b.release_year = Some(2015);
        let mut c = movie(3, &[]);
        c.release_year = Some(2019);

        let years = yearly_revenue(&[a, b, c, movie(4, &[])]);
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 2015);
        assert_eq!(years[1].movie_count, 2);
        assert_eq!(years[1].total_revenue_musd, Some(10.0));
    }

    #[test]
    fn test_genre_roi_summaries() {
        let rows = vec![
            movie(1, &["Action"]).with_financials(Some(10.0), Some(50.0)),
            movie(2, &["Action"]).with_financials(Some(10.0), Some(20.0)),
            movie(3, &["Action"]),
        ];

        let summaries = genre_roi_summaries(&rows, &["Action".to_string(), "Drama".to_string()]);
        assert_eq!(summaries[0].movie_count, 3);
        assert_eq!(summaries[0].rated_count, 2);
        assert_eq!(summaries[0].mean_roi, Some(3.5));
        assert_eq!(summaries[0].min_roi, Some(2.0));
        assert_eq!(summaries[0].max_roi, Some(5.0));
        assert_eq!(summaries[1].movie_count, 0);
        assert_eq!(summaries[1].mean_roi, None);
    }
}
