//! Configuration management for cinemetrics
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// TMDB API settings
    #[serde(default)]
    pub tmdb: TmdbConfig,

    /// Data file locations
    #[serde(default)]
    pub data: DataConfig,

    /// Movies to fetch
    #[serde(default = "default_movie_ids")]
    pub movie_ids: Vec<i64>,

    /// Analysis thresholds
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// TMDB API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// API base URL
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_tmdb_api_key_env")]
    pub api_key_env: String,

    /// Response language
    #[serde(default = "default_tmdb_language")]
    pub language: String,

    /// Request timeout in seconds
    #[serde(default = "default_tmdb_timeout")]
    pub timeout_secs: u64,

    /// Maximum request rate
    #[serde(default = "default_tmdb_requests_per_second")]
    pub requests_per_second: f64,

    /// User agent string
    #[serde(default = "default_tmdb_user_agent")]
    pub user_agent: String,
}

/// Data file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Raw JSON batch, relative paths resolve against the config directory
    #[serde(default = "default_raw_file")]
    pub raw_file: String,

    /// Normalized table file
    #[serde(default = "default_table_file")]
    pub table_file: String,
}

/// Analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Rows per ranking
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Budget floor (millions) applied to ROI rankings
    #[serde(default = "default_min_budget_musd")]
    pub min_budget_musd: f64,

    /// Vote floor applied to rating rankings
    #[serde(default = "default_min_vote_count")]
    pub min_vote_count: i64,

    /// Genres listed in the report
    #[serde(default = "default_top_genres")]
    pub top_genres: usize,

    /// Directors with fewer movies are left off the leaderboard
    #[serde(default = "default_director_min_movies")]
    pub director_min_movies: usize,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for cinemetrics data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tmdb: TmdbConfig::default(),
            data: DataConfig::default(),
            movie_ids: default_movie_ids(),
            analysis: AnalysisConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_tmdb_base_url(),
            api_key_env: default_tmdb_api_key_env(),
            language: default_tmdb_language(),
            timeout_secs: default_tmdb_timeout(),
            requests_per_second: default_tmdb_requests_per_second(),
            user_agent: default_tmdb_user_agent(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_file: default_raw_file(),
            table_file: default_table_file(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            min_budget_musd: default_min_budget_musd(),
            min_vote_count: default_min_vote_count(),
            top_genres: default_top_genres(),
            director_min_movies: default_director_min_movies(),
        }
    }
}

impl Config {
    /// Get the default base directory for cinemetrics (~/.cinemetrics)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cinemetrics")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a base directory, falling back to defaults
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Get the TMDB API key from environment
    pub fn tmdb_api_key(&self) -> Option<String> {
        std::env::var(&self.tmdb.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Absolute location of the raw JSON batch
    pub fn raw_path(&self) -> PathBuf {
        self.resolve(&self.data.raw_file)
    }

    /// Absolute location of the normalized table
    pub fn table_path(&self) -> PathBuf {
        self.resolve(&self.data.table_file)
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.paths.base_dir.join(path)
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.tmdb.requests_per_second <= 0.0 || self.tmdb.requests_per_second.is_nan() {
            return Err(Error::Config(
                "tmdb.requests_per_second must be positive".to_string(),
            ));
        }

        if self.analysis.top_n == 0 {
            return Err(Error::Config("analysis.top_n must be at least 1".to_string()));
        }

        if self.analysis.min_budget_musd < 0.0 {
            return Err(Error::Config(
                "analysis.min_budget_musd must not be negative".to_string(),
            ));
        }

        if self.analysis.min_vote_count < 0 {
            return Err(Error::Config(
                "analysis.min_vote_count must not be negative".to_string(),
            ));
        }

        if self.analysis.director_min_movies == 0 {
            return Err(Error::Config(
                "analysis.director_min_movies must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tmdb.api_key_env, "TMDB_API_KEY");
        assert_eq!(config.movie_ids.len(), 18);
        assert_eq!(config.analysis.min_budget_musd, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.movie_ids = vec![603, 604];
        config.analysis.top_n = 3;

        config.save().unwrap();
        assert!(config.paths.config_file.exists());

        let loaded = Config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(loaded.movie_ids, vec![603, 604]);
        assert_eq!(loaded.analysis.top_n, 3);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "movie_ids = [1]\n\n[analysis]\ntop_n = 2\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.movie_ids, vec![1]);
        assert_eq!(config.analysis.top_n, 2);
        assert_eq!(config.analysis.min_vote_count, 10);
        assert_eq!(config.data.raw_file, "raw/movies.json");
    }

    #[test]
    fn test_data_paths_resolve_against_base_dir() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));

        assert_eq!(config.raw_path(), tmp.path().join("raw/movies.json"));
        assert_eq!(
            config.table_path(),
            tmp.path().join("processed/movies_cleaned.csv")
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.tmdb.requests_per_second = 0.0;
        assert!(config.validate().is_err());
        config.tmdb.requests_per_second = 2.0;
        assert!(config.validate().is_ok());

        config.analysis.director_min_movies = 0;
        assert!(config.validate().is_err());
        config.analysis.director_min_movies = 1;

        config.analysis.min_budget_musd = -1.0;
        assert!(config.validate().is_err());
    }
}
