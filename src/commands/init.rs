//! Init command implementation

use crate::config::{Config, PathsConfig};
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub base_dir: PathBuf,
    pub config_path: PathBuf,
    pub force: bool,
}

/// Write a default configuration and create the data directories
pub fn cmd_init(options: InitOptions) -> Result<Config> {
    let InitOptions {
        base_dir,
        config_path,
        force,
    } = options;

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    let mut config = Config::default();
    config.paths = PathsConfig {
        base_dir,
        config_file: config_path,
    };
    config.validate()?;
    config.save()?;

    for path in [config.raw_path(), config.table_path()] {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
    }
    info!("Initialized cinemetrics at {:?}", config.paths.base_dir);

    Ok(config)
}

/// Print init results to console
pub fn print_init(config: &Config) {
    println!("✓ cinemetrics initialized successfully");
    println!("  Config: {}", config.paths.config_file.display());
    println!("  Raw data: {}", config.raw_path().display());
    println!("  Movie table: {}", config.table_path().display());
    println!("\nNext steps:");
    println!("  1. export {}=<your TMDB API key>", config.tmdb.api_key_env);
    println!("  2. Edit movie_ids in the config file to choose movies");
    println!("  3. Run the pipeline: cinemetrics run");
}
