//! cinemetrics CLI entry point

use cinemetrics::{
    commands::{
        cmd_analyze, cmd_fetch, cmd_init, cmd_rank, cmd_run, cmd_search, cmd_transform,
        print_analysis_report, print_fetch_stats, print_init, print_rank_result,
        print_search_result, print_transform_stats, rank_options, FetchOptions, InitOptions,
        RunOptions,
    },
    config::Config,
    error::Result,
    fetch::{MovieSource, TmdbClient},
    progress::LogWriterFactory,
    query::{Direction, Metric, Predicate},
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "cinemetrics")]
#[command(version, about = "Fetch, normalize and analyze movie metadata", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Fetch raw movie data from TMDB
    Fetch {
        /// Movie ids to fetch instead of the configured list
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<i64>>,

        /// Keep an existing raw file
        #[arg(long)]
        skip_if_exists: bool,
    },

    /// Normalize raw data into the movie table
    Transform,

    /// Print the analysis report for the movie table
    Analyze,

    /// Run fetch, transform and analyze in order
    Run {
        /// Reuse the raw data on disk instead of fetching
        #[arg(long)]
        skip_fetch: bool,
    },

    /// Rank movies by a metric
    Rank {
        /// revenue, budget, profit, roi, vote_average, vote_count, popularity or runtime
        metric: Metric,

        /// Lowest first
        #[arg(long)]
        asc: bool,

        /// Number of movies to show [default: analysis.top_n]
        #[arg(short = 'n', long = "limit")]
        n: Option<usize>,

        /// Exclude movies with a smaller or unknown budget (millions)
        #[arg(long)]
        min_budget: Option<f64>,

        /// Exclude movies with fewer or unknown votes
        #[arg(long)]
        min_votes: Option<i64>,
    },

    /// Find movies matching every given condition
    Search {
        /// Genre the movie must have (repeatable)
        #[arg(long)]
        genre: Vec<String>,

        /// Top billed cast member (repeatable)
        #[arg(long)]
        cast: Vec<String>,

        /// Director
        #[arg(long)]
        director: Option<String>,

        /// Earliest release year
        #[arg(long)]
        from_year: Option<i32>,

        /// Latest release year
        #[arg(long)]
        to_year: Option<i32>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory))
        .with(filter)
        .init();

    // Handle init command specially (doesn't need existing config)
    if let Commands::Init { force } = cli.command {
        let (base_dir, config_path) = init_locations(cli.config);
        let config = cmd_init(InitOptions {
            base_dir,
            config_path,
            force,
        })?;

        if cli.json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            print_init(&config);
        }
        return Ok(());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "cinemetrics", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let show_progress = !cli.json && std::io::stderr().is_terminal();

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Fetch {
            ids,
            skip_if_exists,
        } => {
            let client = TmdbClient::from_config(&config)?;
            let options = FetchOptions {
                ids,
                skip_if_exists,
                show_progress,
            };

            let stats = cmd_fetch(&config, &client, options).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_fetch_stats(&stats);
            }
        }

        Commands::Transform => {
            let stats = cmd_transform(&config)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_transform_stats(&stats);
            }
        }

        Commands::Analyze => {
            let report = cmd_analyze(&config)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_analysis_report(&report);
            }
        }

        Commands::Run { skip_fetch } => {
            let client = if skip_fetch {
                None
            } else {
                Some(TmdbClient::from_config(&config)?)
            };
            let source = client.as_ref().map(|c| c as &dyn MovieSource);
            let options = RunOptions {
                skip_fetch,
                show_progress,
            };

            let summary = cmd_run(&config, source, options).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                if let Some(fetch) = &summary.fetch {
                    print_fetch_stats(fetch);
                }
                print_transform_stats(&summary.transform);
                print_analysis_report(&summary.report);
            }
        }

        Commands::Rank {
            metric,
            asc,
            n,
            min_budget,
            min_votes,
        } => {
            let direction = if asc { Direction::Asc } else { Direction::Desc };
            let options = rank_options(&config, metric, direction, n, min_budget, min_votes);

            let result = cmd_rank(&config, options)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_rank_result(&result);
            }
        }

        Commands::Search {
            genre,
            cast,
            director,
            from_year,
            to_year,
        } => {
            let mut predicates: Vec<Predicate> = genre.into_iter().map(Predicate::genre).collect();
            predicates.extend(cast.into_iter().map(Predicate::cast));
            predicates.extend(director.map(Predicate::director));
            if from_year.is_some() || to_year.is_some() {
                predicates.push(Predicate::YearRange {
                    from: from_year,
                    to: to_year,
                });
            }

            let result = cmd_search(&config, predicates)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_search_result(&result);
            }
        }
    }

    Ok(())
}

/// Base directory and config path for `init`
///
/// A `.toml` path names the file itself; any other path is a directory.
fn init_locations(path: Option<PathBuf>) -> (PathBuf, PathBuf) {
    match path {
        Some(path) if path.extension().is_some_and(|e| e == "toml") => {
            let base = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(Config::default_base_dir);
            (base, path)
        }
        Some(dir) => (dir.clone(), dir.join("config.toml")),
        None => {
            let base = Config::default_base_dir();
            (base.clone(), base.join("config.toml"))
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_config_path);

    if !config_path.exists() {
        eprintln!(
            "Config file not found: {}\nRun 'cinemetrics init' first.",
            config_path.display()
        );
        std::process::exit(1);
    }

    Config::load(&config_path)
}
