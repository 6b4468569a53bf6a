//! Movie metadata fetching from the TMDB API
//!
//! This module provides:
//! - A `MovieSource` trait so pipeline stages do not depend on HTTP
//! - A TMDB client requesting details plus credits in one call
//! - Sequential batch fetching with per-movie failure isolation

mod rate_limit;

pub use rate_limit::*;

use crate::config::{Config, TmdbConfig};
use crate::error::{Error, Result};
use crate::raw::RawMovieRecord;
use async_trait::async_trait;
use indicatif::ProgressBar;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Anything that can produce raw movie documents by id
#[async_trait]
pub trait MovieSource: Send + Sync {
    /// Fetch one movie; `Ok(None)` means the source has no such movie
    async fn fetch_movie(&self, id: i64) -> Result<Option<RawMovieRecord>>;

    /// Source name for logs
    fn name(&self) -> &str;
}

/// TMDB v3 API client
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
    limiter: RequestRateLimiter,
}

impl TmdbClient {
    /// Create a client with an explicit API key
    pub fn new(config: &TmdbConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            language: config.language.clone(),
            limiter: RequestRateLimiter::new(config.requests_per_second),
        })
    }

    /// Create a client reading the API key from the configured variable
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .tmdb_api_key()
            .ok_or_else(|| Error::MissingApiKey(config.tmdb.api_key_env.clone()))?;
        Self::new(&config.tmdb, api_key)
    }

    fn movie_url(&self, id: i64) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/movie/{}", self.base_url, id))?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("language", &self.language)
            .append_pair("append_to_response", "credits");
        Ok(url)
    }
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn fetch_movie(&self, id: i64) -> Result<Option<RawMovieRecord>> {
        let url = self.movie_url(id)?;
        self.limiter.wait().await;

        debug!(id, "Fetching movie");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::Fetch(format!("HTTP {} for movie {}", status, id)));
        }

        let body: Value = response.json().await?;
        Ok(Some(RawMovieRecord::new(body)))
    }

    fn name(&self) -> &str {
        "tmdb"
    }
}

/// Result of a batch fetch
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchOutcome {
    /// Records in requested id order
    #[serde(skip)]
    pub records: Vec<RawMovieRecord>,
    /// Ids the source does not know
    pub missing: Vec<i64>,
    /// Ids whose request failed, with the error text
    pub failed: Vec<(i64, String)>,
}

/// Fetch every id in order, skipping movies that cannot be retrieved
///
/// The batch fails only when nothing at all could be fetched.
pub async fn fetch_movies(
    source: &dyn MovieSource,
    ids: &[i64],
    progress: &ProgressBar,
) -> Result<FetchOutcome> {
    if ids.is_empty() {
        return Err(Error::InvalidRequest("no movie ids to fetch".to_string()));
    }

    info!(source = source.name(), count = ids.len(), "Fetching movies");
    let mut outcome = FetchOutcome::default();

    for &id in ids {
        match source.fetch_movie(id).await {
            Ok(Some(record)) => outcome.records.push(record),
            Ok(None) => {
                warn!(id, "Movie not found");
                outcome.missing.push(id);
            }
            Err(e) => {
                warn!(id, error = %e, "Failed to fetch movie");
                outcome.failed.push((id, e.to_string()));
            }
        }
        progress.inc(1);
    }

    if outcome.records.is_empty() {
        return Err(Error::Fetch(format!(
            "no movie data fetched from {} ({} missing, {} failed); check the API key and network",
            source.name(),
            outcome.missing.len(),
            outcome.failed.len()
        )));
    }

    info!(
        fetched = outcome.records.len(),
        missing = outcome.missing.len(),
        failed = outcome.failed.len(),
        "Fetch complete"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> TmdbConfig {
        TmdbConfig {
            base_url,
            requests_per_second: 1000.0,
            timeout_secs: 5,
            ..TmdbConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_movie_requests_credits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/603"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("append_to_response", "credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 603,
                "title": "The Matrix",
                "credits": {"cast": [], "crew": []}
            })))
            .mount(&server)
            .await;

        let client = TmdbClient::new(&test_config(server.uri()), "test-key").unwrap();
        let record = client.fetch_movie(603).await.unwrap().unwrap();
        assert_eq!(record.get("title"), Some(&json!("The Matrix")));
    }

    #[tokio::test]
    async fn test_fetch_movies_skips_missing_and_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/3"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movie/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4})))
            .mount(&server)
            .await;

        let client = TmdbClient::new(&test_config(server.uri()), "k").unwrap();
        let outcome = fetch_movies(&client, &[4, 2, 1, 3], &ProgressBar::hidden())
            .await
            .unwrap();

        let ids: Vec<Option<&Value>> = outcome.records.iter().map(|r| r.get("id")).collect();
        assert_eq!(ids, vec![Some(&json!(4)), Some(&json!(1))]);
        assert_eq!(outcome.missing, vec![2]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, 3);
    }

    #[tokio::test]
    async fn test_fetch_movies_fails_when_nothing_arrives() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = TmdbClient::new(&test_config(server.uri()), "bad").unwrap();
        let err = fetch_movies(&client, &[1, 2], &ProgressBar::hidden())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[test]
    fn test_missing_api_key() {
        let mut config = Config::default();
        config.tmdb.api_key_env = "CINEMETRICS_TEST_UNSET_KEY".to_string();
        assert!(matches!(
            TmdbClient::from_config(&config),
            Err(Error::MissingApiKey(var)) if var == "CINEMETRICS_TEST_UNSET_KEY"
        ));
    }
}
