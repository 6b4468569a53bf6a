//! Conjunctive field search

use crate::error::{Error, Result};
use crate::normalize::NormalizedMovie;
use serde::{Deserialize, Serialize};

/// A single field condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "field")]
pub enum Predicate {
    /// Genre list contains this name exactly
    Genre { name: String },
    /// Top billed cast contains this name exactly
    Cast { name: String },
    /// Director matches this name exactly
    Director { name: String },
    /// Release year within an inclusive range; unknown years never match
    YearRange { from: Option<i32>, to: Option<i32> },
    /// Franchise membership equals this flag
    Franchise { is_franchise: bool },
}

impl Predicate {
    pub fn genre(name: impl Into<String>) -> Self {
        Predicate::Genre { name: name.into() }
    }

    pub fn cast(name: impl Into<String>) -> Self {
        Predicate::Cast { name: name.into() }
    }

    pub fn director(name: impl Into<String>) -> Self {
        Predicate::Director { name: name.into() }
    }

    pub fn matches(&self, movie: &NormalizedMovie) -> bool {
        match self {
            Predicate::Genre { name } => movie.has_genre(name),
            Predicate::Cast { name } => movie.has_cast_member(name),
            Predicate::Director { name } => movie.director.as_deref() == Some(name.as_str()),
            Predicate::YearRange { from, to } => match movie.release_year {
                Some(year) => from.map_or(true, |f| year >= f) && to.map_or(true, |t| year <= t),
                None => false,
            },
            Predicate::Franchise { is_franchise } => movie.is_franchise == *is_franchise,
        }
    }
}

/// Reject predicate sets that can never match anything
fn validate(predicates: &[Predicate]) -> Result<()> {
    let mut lower: Option<i32> = None;
    let mut upper: Option<i32> = None;
    let mut franchise: Option<bool> = None;

    for predicate in predicates {
        match predicate {
            Predicate::YearRange { from, to } => {
                if let (Some(f), Some(t)) = (from, to) {
                    if f > t {
                        return Err(Error::InvalidRequest(format!(
                            "year range {}..={} is empty",
                            f, t
                        )));
                    }
                }
                lower = lower.max(*from);
                upper = match (upper, to) {
                    (Some(u), Some(t)) => Some(u.min(*t)),
                    (u, t) => u.or(*t),
                };
            }
            Predicate::Franchise { is_franchise } => {
                if franchise.is_some_and(|f| f != *is_franchise) {
                    return Err(Error::InvalidRequest(
                        "conflicting franchise predicates".to_string(),
                    ));
                }
                franchise = Some(*is_franchise);
            }
            Predicate::Director { name } | Predicate::Genre { name } | Predicate::Cast { name } => {
                if name.trim().is_empty() {
                    return Err(Error::InvalidRequest(
                        "search names must not be empty".to_string(),
                    ));
                }
            }
        }
    }

    if let (Some(l), Some(u)) = (lower, upper) {
        if l > u {
            return Err(Error::InvalidRequest(format!(
                "year ranges do not overlap (from {} to {})",
                l, u
            )));
        }
    }

    let directors: Vec<&str> = predicates
        .iter()
        .filter_map(|p| match p {
            Predicate::Director { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    if directors.windows(2).any(|pair| pair[0] != pair[1]) {
        return Err(Error::InvalidRequest(
            "a movie has a single director; conflicting director predicates".to_string(),
        ));
    }

    Ok(())
}

/// Rows matching every predicate, in table order
///
/// An empty predicate list matches every row.
pub fn filter_search<'a>(
    rows: &'a [NormalizedMovie],
    predicates: &[Predicate],
) -> Result<Vec<&'a NormalizedMovie>> {
    validate(predicates)?;

    Ok(rows
        .iter()
        .filter(|movie| predicates.iter().all(|p| p.matches(movie)))
        .collect())
}
