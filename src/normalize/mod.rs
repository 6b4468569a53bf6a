//! Normalization of raw movie documents into flat typed rows
//!
//! This module handles:
//! - Field-by-field extraction with absent-on-failure semantics
//! - The zero-as-unknown rule for budget, revenue and runtime
//! - Genre, director and top-cast extraction from nested documents
//! - Franchise membership
//!
//! `normalize` is total: every input record yields exactly one row, in input
//! order, however degenerate its document is.

mod fields;

pub use fields::*;

use crate::derived::{profit, roi};
use crate::raw::RawMovieRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A flat, typed movie row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMovie {
    /// Source numeric id
    pub id: Option<i64>,
    pub title: String,
    pub release_year: Option<i32>,
    /// Budget in millions; a raw zero is absent
    pub budget_musd: Option<f64>,
    /// Revenue in millions; a raw zero is absent
    pub revenue_musd: Option<f64>,
    /// Always `revenue_musd - budget_musd`
    pub profit_musd: Option<f64>,
    /// Always `revenue_musd / budget_musd` for a positive budget
    pub roi: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub popularity: Option<f64>,
    pub runtime: Option<i64>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub top_cast: Vec<String>,
    pub is_franchise: bool,
    pub collection_id: Option<i64>,
    pub collection_name: Option<String>,
}

impl NormalizedMovie {
    /// Set budget and revenue, deriving profit and ROI from them
    pub fn with_financials(mut self, budget_musd: Option<f64>, revenue_musd: Option<f64>) -> Self {
        self.budget_musd = budget_musd;
        self.revenue_musd = revenue_musd;
        self.profit_musd = profit(budget_musd, revenue_musd);
        self.roi = roi(budget_musd, revenue_musd);
        self
    }

    /// Franchise grouping key: collection id, else collection name
    ///
    /// Rows without either identifier have no key and are never grouped.
    pub fn franchise_key(&self) -> Option<String> {
        if !self.is_franchise {
            return None;
        }
        self.collection_id
            .map(|id| id.to_string())
            .or_else(|| self.collection_name.clone())
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    pub fn has_cast_member(&self, name: &str) -> bool {
        self.top_cast.iter().any(|c| c == name)
    }
}

impl Default for NormalizedMovie {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            release_year: None,
            budget_musd: None,
            revenue_musd: None,
            profit_musd: None,
            roi: None,
            vote_average: None,
            vote_count: None,
            popularity: None,
            runtime: None,
            genres: Vec::new(),
            director: None,
            top_cast: Vec::new(),
            is_franchise: false,
            collection_id: None,
            collection_name: None,
        }
    }
}

/// Normalize a whole batch, one row per record, order preserved
pub fn normalize(records: &[RawMovieRecord]) -> Vec<NormalizedMovie> {
    let rows: Vec<NormalizedMovie> = records.iter().map(normalize_record).collect();
    debug!(records = records.len(), rows = rows.len(), "Normalized batch");
    rows
}

/// Normalize a single record
pub fn normalize_record(record: &RawMovieRecord) -> NormalizedMovie {
    let vote_count = record.get("vote_count").and_then(parse_i64);
    // A rating nobody voted for carries no information
    let vote_average = record
        .get("vote_average")
        .and_then(parse_f64)
        .filter(|_| vote_count != Some(0));

    let collection_id = record.path(&["belongs_to_collection", "id"]).and_then(parse_i64);
    let collection_name = record
        .path(&["belongs_to_collection", "name"])
        .and_then(parse_text);

    NormalizedMovie {
        id: record.get("id").and_then(parse_i64),
        title: record.get("title").and_then(parse_text).unwrap_or_default(),
        release_year: record.get("release_date").and_then(parse_release_year),
        vote_average,
        vote_count,
        popularity: record.get("popularity").and_then(parse_f64),
        runtime: record.get("runtime").and_then(parse_runtime),
        genres: extract_genres(record.array(&["genres"])),
        director: extract_director(record.array(&["credits", "crew"])),
        top_cast: extract_top_cast(record.array(&["credits", "cast"])),
        // Only a collection that identifies itself makes a franchise
        is_franchise: collection_id.is_some() || collection_name.is_some(),
        collection_id,
        collection_name,
        ..NormalizedMovie::default()
    }
    .with_financials(
        record.get("budget").and_then(parse_musd),
        record.get("revenue").and_then(parse_musd),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn endgame() -> RawMovieRecord {
        RawMovieRecord::new(json!({
            "id": 299534,
            "title": "Avengers: Endgame",
            "release_date": "2019-04-24",
            "budget": 356000000,
            "revenue": 2799439100u64,
            "vote_average": 8.238,
            "vote_count": 26000,
            "popularity": 95.5,
            "runtime": 181,
            "genres": [
                {"id": 12, "name": "Adventure"},
                {"id": 878, "name": "Science Fiction"},
                {"id": 28, "name": "Action"}
            ],
            "belongs_to_collection": {"id": 86311, "name": "The Avengers Collection"},
            "credits": {
                "cast": [
                    {"name": "Chris Evans", "order": 1},
                    {"name": "Robert Downey Jr.", "order": 0},
                    {"name": "Mark Ruffalo", "order": 2},
                    {"name": "Chris Hemsworth", "order": 3}
                ],
                "crew": [
                    {"name": "Trinh Tran", "job": "Executive Producer"},
                    {"name": "Anthony Russo", "job": "Director"},
                    {"name": "Joe Russo", "job": "Director"}
                ]
            }
        }))
    }

    #[test]
    fn test_normalize_full_record() {
        let movie = normalize_record(&endgame());

        assert_eq!(movie.id, Some(299534));
        assert_eq!(movie.title, "Avengers: Endgame");
        assert_eq!(movie.release_year, Some(2019));
        assert_eq!(movie.budget_musd, Some(356.0));
        assert!((movie.revenue_musd.unwrap() - 2799.4391).abs() < 1e-9);
        assert!((movie.profit_musd.unwrap() - 2443.4391).abs() < 1e-9);
        assert!(movie.roi.unwrap() > 7.8);
        assert_eq!(movie.runtime, Some(181));
        assert_eq!(movie.genres, vec!["Adventure", "Science Fiction", "Action"]);
        assert_eq!(movie.director.as_deref(), Some("Anthony Russo"));
        assert_eq!(
            movie.top_cast,
            vec!["Robert Downey Jr.", "Chris Evans", "Mark Ruffalo"]
        );
        assert!(movie.is_franchise);
        assert_eq!(movie.collection_id, Some(86311));
        assert_eq!(movie.franchise_key().as_deref(), Some("86311"));
    }

    #[test]
    fn test_zero_budget_is_absent() {
        let record = RawMovieRecord::new(json!({
            "id": 1,
            "title": "Zero",
            "budget": 0,
            "revenue": 5000000
        }));
        let movie = normalize_record(&record);

        assert_eq!(movie.budget_musd, None);
        assert_eq!(movie.revenue_musd, Some(5.0));
        assert_eq!(movie.profit_musd, None);
        assert_eq!(movie.roi, None);
    }

    #[test]
    fn test_roi_and_profit() {
        let record = RawMovieRecord::new(json!({
            "id": 2,
            "budget": 10000000,
            "revenue": 50000000
        }));
        let movie = normalize_record(&record);

        assert_eq!(movie.roi, Some(5.0));
        assert_eq!(movie.profit_musd, Some(40.0));
    }

    #[test]
    fn test_degenerate_records_still_yield_rows() {
        let records = vec![
            RawMovieRecord::new(json!(null)),
            RawMovieRecord::new(json!("not a movie")),
            RawMovieRecord::new(json!({
                "id": "abc",
                "genres": "Action",
                "credits": {"crew": {"job": "Director"}, "cast": 5},
                "budget": "lots",
                "runtime": 0,
                "belongs_to_collection": null
            })),
        ];

        let rows = normalize(&records);
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.id, None);
            assert!(row.genres.is_empty());
            assert!(row.top_cast.is_empty());
            assert_eq!(row.director, None);
            assert_eq!(row.budget_musd, None);
            assert_eq!(row.runtime, None);
            assert!(!row.is_franchise);
        }
    }

    #[test]
    fn test_normalize_preserves_order_and_length() {
        let records: Vec<RawMovieRecord> = [30, 10, 20, 10]
            .iter()
            .map(|id| RawMovieRecord::new(json!({"id": id, "title": format!("m{}", id)})))
            .collect();

        let rows = normalize(&records);
        let ids: Vec<Option<i64>> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Some(30), Some(10), Some(20), Some(10)]);
    }

    #[test]
    fn test_normalize_empty_input() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let records = vec![endgame(), RawMovieRecord::new(json!({"id": 5}))];
        assert_eq!(normalize(&records), normalize(&records));
    }

    #[test]
    fn test_unvoted_rating_is_absent() {
        let record = RawMovieRecord::new(json!({"id": 3, "vote_average": 0.0, "vote_count": 0}));
        let movie = normalize_record(&record);
        assert_eq!(movie.vote_count, Some(0));
        assert_eq!(movie.vote_average, None);
    }

    #[test]
    fn test_collection_without_identifier_is_standalone() {
        for collection in [json!({}), json!(""), json!(false), json!(0), json!([])] {
            let record = RawMovieRecord::new(json!({"id": 4, "belongs_to_collection": collection.clone()}));
            let movie = normalize_record(&record);
            assert!(!movie.is_franchise, "{} should be standalone", collection);
            assert_eq!(movie.franchise_key(), None);
        }

        let name_only = RawMovieRecord::new(json!({
            "id": 5,
            "belongs_to_collection": {"name": "Kill Bill Collection"}
        }));
        let movie = normalize_record(&name_only);
        assert!(movie.is_franchise);
        assert_eq!(movie.franchise_key().as_deref(), Some("Kill Bill Collection"));
    }

    #[test]
    fn test_unidentified_collections_do_not_merge() {
        let records: Vec<RawMovieRecord> = [json!({}), json!(""), json!(false)]
            .into_iter()
            .enumerate()
            .map(|(i, collection)| {
                RawMovieRecord::new(json!({
                    "id": i,
                    "revenue": 20000000,
                    "belongs_to_collection": collection
                }))
            })
            .collect();

        let rows = normalize(&records);
        assert!(crate::derived::franchise_summaries(&rows).is_empty());
    }
}
