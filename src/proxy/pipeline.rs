//! Aggregation pipeline: harvest, gate, optionally check, write
//!
//! The only fatal outcomes are an insufficient yield at either gate and a
//! failure writing the final artifact. Everything upstream is isolated
//! per source or per proxy.

use std::future::Future;
use std::path::PathBuf;

use tracing::info;

use crate::proxy::checker::ProxyChecker;
use crate::proxy::error::{RunError, ScrapeError};
use crate::proxy::harvester::{harvest_with, HarvestReport, Harvester};
use crate::proxy::models::Proxy;
use crate::proxy::output::write_proxies;
use crate::proxy::scraper::Scraper;
use crate::proxy::sources::Source;

/// Minimum harvested count before the run is worth writing
const DEFAULT_MIN_HARVESTED: usize = 20000;

/// Minimum confirmed-working count when checking is enabled
const DEFAULT_MIN_WORKING: usize = 400;

/// Configuration for one aggregation run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Output file, overwritten on success
    pub output: PathBuf,
    /// Harvest-stage yield gate
    pub min_harvested: usize,
    /// Check-stage yield gate
    pub min_working: usize,
    /// Whether to run the check stage at all
    pub check: bool,
    /// Scrape worker pool size
    pub scrape_workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("proxies.txt"),
            min_harvested: DEFAULT_MIN_HARVESTED,
            min_working: DEFAULT_MIN_WORKING,
            check: false,
            scrape_workers: 100,
        }
    }
}

/// What a successful run produced
#[derive(Debug)]
pub struct RunSummary {
    /// Unique proxies after the harvest stage
    pub harvested: usize,
    /// Proxies written to the output file
    pub written: usize,
}

/// Run the whole pipeline against live sources
pub async fn run(
    scraper: Scraper,
    checker: ProxyChecker,
    sources: Vec<Source>,
    config: &RunConfig,
) -> Result<RunSummary, RunError> {
    let harvester = Harvester::with_concurrency(scraper, config.scrape_workers);
    let report = harvester.run(sources).await;
    complete(report, Some(&checker), config).await
}

/// Run the pipeline with an injected scrape operation; the check stage is
/// skipped unless a checker is supplied and enabled
pub async fn run_with<F, Fut>(
    sources: Vec<Source>,
    checker: Option<&ProxyChecker>,
    config: &RunConfig,
    scrape: F,
) -> Result<RunSummary, RunError>
where
    F: Fn(Source) -> Fut,
    Fut: Future<Output = Result<Vec<Proxy>, ScrapeError>>,
{
    let report = harvest_with(sources, config.scrape_workers, scrape).await;
    complete(report, checker, config).await
}

/// Gate, optionally check, gate again, then write the artifact
async fn complete(
    report: HarvestReport,
    checker: Option<&ProxyChecker>,
    config: &RunConfig,
) -> Result<RunSummary, RunError> {
    let harvested = report.proxies.len();
    info!(
        "harvest complete: {} unique proxies from {} sources ({} failed)",
        harvested, report.succeeded, report.failed
    );

    ensure_yield("harvest", harvested, config.min_harvested)?;

    let kept: Vec<Proxy> = if config.check {
        match checker {
            Some(checker) => {
                let working = checker.check_proxies(report.proxies.into_iter().collect()).await;
                info!("check complete: {} of {} proxies working", working.len(), harvested);
                ensure_yield("check", working.len(), config.min_working)?;
                working
            }
            None => report.proxies.into_iter().collect(),
        }
    } else {
        report.proxies.into_iter().collect()
    };

    write_proxies(&config.output, &kept)?;

    Ok(RunSummary {
        harvested,
        written: kept.len(),
    })
}

fn ensure_yield(stage: &'static str, found: usize, required: usize) -> Result<(), RunError> {
    if found < required {
        return Err(RunError::InsufficientYield {
            stage,
            found,
            required,
        });
    }
    Ok(())
}
