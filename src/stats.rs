//! Reductions that skip absent values
//!
//! Every aggregate in the crate goes through these helpers so that a missing
//! value is never counted as zero.

/// Sum of the present values; absent if none are present
pub fn sum_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Mean of the present values; absent if none are present
pub fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Number of present values
pub fn count_present<I, T>(values: I) -> usize
where
    I: IntoIterator<Item = Option<T>>,
{
    values.into_iter().flatten().count()
}
