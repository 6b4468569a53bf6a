//! Custom error types for cinemetrics

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cinemetrics operations
///
/// Field-level extraction problems never show up here: the normalizer
/// degrades a field to absent instead. Only I/O, transport and malformed
/// caller requests are surfaced.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("API key not set: export {0}")]
    MissingApiKey(String),

    #[error("Raw data not found at {}: run 'cinemetrics fetch' first", .0.display())]
    RawDataNotFound(PathBuf),

    #[error("Movie table not found at {}: run 'cinemetrics transform' first", .0.display())]
    TableNotFound(PathBuf),

    #[error("Movie table has an unexpected layout: {0}")]
    TableSchema(String),

    #[error("Unknown metric '{0}' (expected one of: revenue, budget, profit, roi, vote_average, vote_count, popularity, runtime)")]
    InvalidMetric(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

/// Result type alias for cinemetrics
pub type Result<T> = std::result::Result<T, Error>;
