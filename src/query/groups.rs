//! Group-by aggregates: franchise comparison and director leaderboard

use crate::derived::{cmp_desc_absent_last, group_rows};
use crate::error::{Error, Result};
use crate::normalize::NormalizedMovie;
use crate::query::Metric;
use crate::stats::{count_present, mean_present, sum_present};
use serde::{Deserialize, Serialize};

/// Mean of one metric over one partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricMean {
    pub metric: Metric,
    pub mean: Option<f64>,
    /// Rows in the partition where the metric is known
    pub present: usize,
}

/// One side of the franchise/standalone split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionStats {
    pub label: String,
    pub movie_count: usize,
    pub means: Vec<MetricMean>,
}

impl PartitionStats {
    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.means
            .iter()
            .find(|m| m.metric == metric)
            .and_then(|m| m.mean)
    }
}

/// Franchise vs standalone comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FranchiseComparison {
    pub franchise: PartitionStats,
    pub standalone: PartitionStats,
}

fn partition_stats(label: &str, rows: &[&NormalizedMovie], metrics: &[Metric]) -> PartitionStats {
    PartitionStats {
        label: label.to_string(),
        movie_count: rows.len(),
        means: metrics
            .iter()
            .map(|&metric| MetricMean {
                metric,
                mean: mean_present(rows.iter().map(|m| metric.value(m))),
                present: count_present(rows.iter().map(|m| metric.value(m))),
            })
            .collect(),
    }
}

/// Mean of each metric for franchise rows and for standalone rows
pub fn compare_franchise_vs_standalone(
    rows: &[NormalizedMovie],
    metrics: &[Metric],
) -> Result<FranchiseComparison> {
    if metrics.is_empty() {
        return Err(Error::InvalidRequest(
            "at least one metric is required for a comparison".to_string(),
        ));
    }

    let (franchise, standalone): (Vec<&NormalizedMovie>, Vec<&NormalizedMovie>) =
        rows.iter().partition(|m| m.is_franchise);

    Ok(FranchiseComparison {
        franchise: partition_stats("Franchise", &franchise, metrics),
        standalone: partition_stats("Standalone", &standalone, metrics),
    })
}

/// Aggregate performance of one director
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorStats {
    pub director: String,
    pub movie_count: usize,
    pub total_revenue_musd: Option<f64>,
    pub mean_rating: Option<f64>,
}

/// Directors by total revenue, highest first, ties by name
pub fn director_leaderboard(rows: &[NormalizedMovie], min_movies: usize) -> Result<Vec<DirectorStats>> {
    if min_movies == 0 {
        return Err(Error::InvalidRequest(
            "min_movies must be at least 1".to_string(),
        ));
    }

    let mut board: Vec<DirectorStats> = group_rows(rows, |m| m.director.clone())
        .into_iter()
        .filter(|(_, members)| members.len() >= min_movies)
        .map(|(director, members)| DirectorStats {
            director,
            movie_count: members.len(),
            total_revenue_musd: sum_present(members.iter().map(|m| m.revenue_musd)),
            mean_rating: mean_present(members.iter().map(|m| m.vote_average)),
        })
        .collect();

    board.sort_by(|a, b| {
        cmp_desc_absent_last(a.total_revenue_musd, b.total_revenue_musd)
            .then_with(|| a.director.cmp(&b.director))
    });
    Ok(board)
}
