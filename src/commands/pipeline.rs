//! Full pipeline: fetch, transform, analyze

use crate::commands::{cmd_analyze, cmd_fetch, cmd_transform, FetchOptions, FetchStats, TransformStats};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::MovieSource;
use crate::report::AnalysisReport;
use serde::Serialize;
use tracing::info;

/// Run options
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Reuse the raw file on disk instead of fetching
    pub skip_fetch: bool,
    pub show_progress: bool,
}

/// Results of every stage that ran
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub fetch: Option<FetchStats>,
    pub transform: TransformStats,
    pub report: AnalysisReport,
}

/// Run the stages in order, stopping at the first failure
///
/// `source` is only consulted when fetching.
pub async fn cmd_run(
    config: &Config,
    source: Option<&dyn MovieSource>,
    options: RunOptions,
) -> Result<RunSummary> {
    let fetch = if options.skip_fetch {
        info!("Skipping fetch stage");
        None
    } else {
        let source = source.ok_or_else(|| {
            Error::InvalidRequest("fetching requires a movie source".to_string())
        })?;
        info!("Stage 1/3: fetch");
        let fetch_options = FetchOptions {
            show_progress: options.show_progress,
            ..Default::default()
        };
        Some(cmd_fetch(config, source, fetch_options).await?)
    };

    info!("Stage 2/3: transform");
    let transform = cmd_transform(config)?;

    info!("Stage 3/3: analyze");
    let report = cmd_analyze(config)?;

    Ok(RunSummary {
        fetch,
        transform,
        report,
    })
}
