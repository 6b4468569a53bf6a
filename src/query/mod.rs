//! Ranking and search over the normalized table
//!
//! This module handles:
//! - Metric selection by name
//! - Top/bottom-N ranking with threshold filters
//! - Conjunctive field search
//! - Group-by leaderboards and partition comparisons
//!
//! Every function is pure and deterministic: ties are broken by ascending
//! movie id, so the same table always ranks the same way.

mod filter;
mod groups;

pub use filter::*;
pub use groups::*;

use crate::error::{Error, Result};
use crate::normalize::NormalizedMovie;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A numeric column that can be ranked or averaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Revenue,
    Budget,
    Profit,
    Roi,
    VoteAverage,
    VoteCount,
    Popularity,
    Runtime,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Revenue,
        Metric::Budget,
        Metric::Profit,
        Metric::Roi,
        Metric::VoteAverage,
        Metric::VoteCount,
        Metric::Popularity,
        Metric::Runtime,
    ];

    /// The row's value for this metric, if known
    pub fn value(&self, movie: &NormalizedMovie) -> Option<f64> {
        match self {
            Metric::Revenue => movie.revenue_musd,
            Metric::Budget => movie.budget_musd,
            Metric::Profit => movie.profit_musd,
            Metric::Roi => movie.roi,
            Metric::VoteAverage => movie.vote_average,
            Metric::VoteCount => movie.vote_count.map(|v| v as f64),
            Metric::Popularity => movie.popularity,
            Metric::Runtime => movie.runtime.map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::Budget => "budget",
            Metric::Profit => "profit",
            Metric::Roi => "roi",
            Metric::VoteAverage => "vote_average",
            Metric::VoteCount => "vote_count",
            Metric::Popularity => "popularity",
            Metric::Runtime => "runtime",
        }
    }

    /// Human-readable label with unit
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue (M$)",
            Metric::Budget => "Budget (M$)",
            Metric::Profit => "Profit (M$)",
            Metric::Roi => "ROI",
            Metric::VoteAverage => "Rating",
            Metric::VoteCount => "Votes",
            Metric::Popularity => "Popularity",
            Metric::Runtime => "Runtime (min)",
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "revenue" | "revenue_musd" => Ok(Metric::Revenue),
            "budget" | "budget_musd" => Ok(Metric::Budget),
            "profit" | "profit_musd" => Ok(Metric::Profit),
            "roi" => Ok(Metric::Roi),
            "vote_average" | "rating" => Ok(Metric::VoteAverage),
            "vote_count" | "votes" => Ok(Metric::VoteCount),
            "popularity" => Ok(Metric::Popularity),
            "runtime" => Ok(Metric::Runtime),
            _ => Err(Error::InvalidMetric(s.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Highest first
    #[default]
    Desc,
    /// Lowest first
    Asc,
}

/// Ranking request
#[derive(Debug, Clone, PartialEq)]
pub struct RankOptions {
    pub metric: Metric,
    pub direction: Direction,
    pub n: usize,
    /// Rows with an unknown budget or a budget below this are excluded first
    pub min_budget_musd: Option<f64>,
    /// Rows with an unknown vote count or fewer votes are excluded first
    pub min_vote_count: Option<i64>,
}

impl RankOptions {
    pub fn new(metric: Metric, direction: Direction, n: usize) -> Self {
        Self {
            metric,
            direction,
            n,
            min_budget_musd: None,
            min_vote_count: None,
        }
    }

    pub fn min_budget(mut self, musd: f64) -> Self {
        self.min_budget_musd = Some(musd);
        self
    }

    pub fn min_votes(mut self, votes: i64) -> Self {
        self.min_vote_count = Some(votes);
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(budget) = self.min_budget_musd {
            if !budget.is_finite() || budget < 0.0 {
                return Err(Error::InvalidRequest(format!(
                    "min_budget_musd must be a non-negative number, got {}",
                    budget
                )));
            }
        }
        if let Some(votes) = self.min_vote_count {
            if votes < 0 {
                return Err(Error::InvalidRequest(format!(
                    "min_vote_count must not be negative, got {}",
                    votes
                )));
            }
        }
        Ok(())
    }
}

/// Ascending id order with id-less rows last
pub(crate) fn cmp_id(a: &NormalizedMovie, b: &NormalizedMovie) -> Ordering {
    match (a.id, b.id) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order rows by a metric, dropping rows where it is unknown
///
/// Ties fall back to ascending id.
pub fn sort_by_metric<'a, I>(rows: I, metric: Metric, direction: Direction) -> Vec<&'a NormalizedMovie>
where
    I: IntoIterator<Item = &'a NormalizedMovie>,
{
    let mut keyed: Vec<(f64, &NormalizedMovie)> = rows
        .into_iter()
        .filter_map(|movie| metric.value(movie).map(|v| (v, movie)))
        .collect();

    keyed.sort_by(|(va, a), (vb, b)| {
        let by_value = match direction {
            Direction::Desc => vb.total_cmp(va),
            Direction::Asc => va.total_cmp(vb),
        };
        by_value.then_with(|| cmp_id(a, b))
    });

    keyed.into_iter().map(|(_, movie)| movie).collect()
}

/// Top or bottom `n` rows by a metric
pub fn rank<'a>(rows: &'a [NormalizedMovie], options: &RankOptions) -> Result<Vec<&'a NormalizedMovie>> {
    options.validate()?;

    let eligible = rows.iter().filter(|movie| {
        let budget_ok = match options.min_budget_musd {
            Some(floor) => movie.budget_musd.is_some_and(|b| b >= floor),
            None => true,
        };
        let votes_ok = match options.min_vote_count {
            Some(floor) => movie.vote_count.is_some_and(|v| v >= floor),
            None => true,
        };
        budget_ok && votes_ok
    });

    let mut ranked = sort_by_metric(eligible, options.metric, options.direction);
    ranked.truncate(options.n);
    Ok(ranked)
}
