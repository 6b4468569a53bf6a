//! Default values for configuration

/// Default TMDB API base URL
pub fn default_tmdb_base_url() -> String {
    std::env::var("TMDB_BASE_URL").unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string())
}

/// Default environment variable name for the TMDB API key
pub fn default_tmdb_api_key_env() -> String {
    "TMDB_API_KEY".to_string()
}

/// Default response language
pub fn default_tmdb_language() -> String {
    "en-US".to_string()
}

/// Default request timeout in seconds
pub fn default_tmdb_timeout() -> u64 {
    30
}

/// Default request rate (requests per second)
pub fn default_tmdb_requests_per_second() -> f64 {
    4.0
}

/// Default user agent
pub fn default_tmdb_user_agent() -> String {
    format!("cinemetrics/{} (Movie Analytics)", env!("CARGO_PKG_VERSION"))
}

/// Default raw batch location, relative to the config directory
pub fn default_raw_file() -> String {
    "raw/movies.json".to_string()
}

/// Default normalized table location, relative to the config directory
pub fn default_table_file() -> String {
    "processed/movies_cleaned.csv".to_string()
}

/// Default movie selection
pub fn default_movie_ids() -> Vec<i64> {
    vec![
        299534, 19995, 140607, 299536, 597, 135397, 420818, 24428, 168259, 99861, 284054, 12445,
        181808, 330457, 351286, 109445, 321612, 260513,
    ]
}

/// Default number of rows per ranking
pub fn default_top_n() -> usize {
    5
}

/// Default budget floor (millions) for ROI rankings
pub fn default_min_budget_musd() -> f64 {
    10.0
}

/// Default vote floor for rating rankings
pub fn default_min_vote_count() -> i64 {
    10
}

/// Default number of genres listed
pub fn default_top_genres() -> usize {
    10
}

/// Default minimum movies per director
pub fn default_director_min_movies() -> usize {
    1
}
