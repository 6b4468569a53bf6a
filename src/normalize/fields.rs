//! Field extraction helpers
//!
//! Each helper maps a JSON value to a typed field and returns `None` on any
//! shape it does not recognise. Nothing here can fail a row.

use serde_json::Value;
use std::collections::HashSet;

/// Director job label, matched case-sensitively
pub const DIRECTOR_JOB: &str = "Director";

/// Number of billed cast members kept per movie
pub const TOP_CAST_LEN: usize = 3;

const MUSD: f64 = 1_000_000.0;

/// Finite float from a JSON number or numeric string
pub fn parse_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Integer from a JSON number or numeric string; fractional values are rejected
pub fn parse_i64(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    if let Value::String(s) = value {
        if let Ok(i) = s.trim().parse::<i64>() {
            return Some(i);
        }
    }
    let f = parse_f64(value)?;
    (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Non-empty string value
pub fn parse_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Raw currency amount to millions; zero means unknown
pub fn parse_musd(value: &Value) -> Option<f64> {
    parse_f64(value)
        .filter(|amount| *amount != 0.0)
        .map(|amount| amount / MUSD)
}

/// Runtime in minutes; zero means unknown
pub fn parse_runtime(value: &Value) -> Option<i64> {
    parse_i64(value).filter(|minutes| *minutes != 0)
}

/// Leading four-digit year of a date string such as `2019-04-24`
pub fn parse_release_year(value: &Value) -> Option<i32> {
    let text = value.as_str()?.trim().as_bytes();
    let year = text.get(..4)?;
    if !year.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if text.get(4).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(year).ok()?.parse().ok()
}

/// Genre names in original order, nameless entries dropped, duplicates removed
pub fn extract_genres(genres: Option<&Vec<Value>>) -> Vec<String> {
    let Some(genres) = genres else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    genres
        .iter()
        .filter_map(|genre| genre.get("name").and_then(parse_text))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Name of the first crew member whose job is exactly "Director"
///
/// Only the first match counts: if it has no usable name there is no director.
pub fn extract_director(crew: Option<&Vec<Value>>) -> Option<String> {
    crew?
        .iter()
        .find(|member| member.get("job").and_then(Value::as_str) == Some(DIRECTOR_JOB))?
        .get("name")
        .and_then(parse_text)
}

/// Names of the first three cast members by billing order
///
/// Members without an order sort after every ordered member and keep their
/// relative array order.
pub fn extract_top_cast(cast: Option<&Vec<Value>>) -> Vec<String> {
    let Some(cast) = cast else {
        return Vec::new();
    };

    let mut billed: Vec<(Option<i64>, &Value)> = cast
        .iter()
        .map(|member| (member.get("order").and_then(parse_i64), member))
        .collect();
    billed.sort_by_key(|(order, _)| (order.is_none(), *order));

    billed
        .into_iter()
        .take(TOP_CAST_LEN)
        .filter_map(|(_, member)| member.get("name").and_then(parse_text))
        .collect()
}
