//! Harvest scheduler: run every source concurrently and merge the results
//!
//! Sources are scraped on a bounded worker pool and consumed in completion
//! order. One source failing only costs that source's contribution; the
//! merged set keeps growing from everything else.

use std::collections::HashSet;
use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::proxy::error::ScrapeError;
use crate::proxy::models::Proxy;
use crate::proxy::scraper::Scraper;
use crate::proxy::sources::Source;

/// Number of concurrent scrape workers; independent of source count
const DEFAULT_SCRAPE_WORKERS: usize = 100;

/// Outcome of a full harvest pass
#[derive(Debug, Default)]
pub struct HarvestReport {
    /// Deduplicated records from every source that succeeded
    pub proxies: HashSet<Proxy>,
    /// Sources that completed successfully (possibly with zero records)
    pub succeeded: usize,
    /// Sources that failed and were skipped
    pub failed: usize,
}

/// Runs the scrape stage over a catalog of sources
pub struct Harvester {
    scraper: Scraper,
    concurrency: usize,
}

impl Harvester {
    pub fn new(scraper: Scraper) -> Self {
        Self::with_concurrency(scraper, DEFAULT_SCRAPE_WORKERS)
    }

    pub fn with_concurrency(scraper: Scraper, concurrency: usize) -> Self {
        Self {
            scraper,
            concurrency,
        }
    }

    /// Scrape all sources and merge their records into one set
    pub async fn run(&self, sources: Vec<Source>) -> HarvestReport {
        let scraper = &self.scraper;
        harvest_with(sources, self.concurrency, move |source| async move {
            scraper.scrape(&source).await
        })
        .await
    }
}

/// Fan out `scrape` over all sources on a bounded pool, consuming
/// completions in arrival order and merging into a deduplicating set.
///
/// Generic over the scrape operation so the scheduling behavior is
/// testable with stub sources.
pub async fn harvest_with<F, Fut>(sources: Vec<Source>, concurrency: usize, scrape: F) -> HarvestReport
where
    F: Fn(Source) -> Fut,
    Fut: Future<Output = Result<Vec<Proxy>, ScrapeError>>,
{
    let mut completions = stream::iter(sources)
        .map(|source| {
            let outcome = scrape(source.clone());
            async move { (source, outcome.await) }
        })
        .buffer_unordered(concurrency.max(1));

    let mut report = HarvestReport::default();
    while let Some((source, outcome)) = completions.next().await {
        match outcome {
            Ok(found) => {
                info!("{} yielded {} proxies", source, found.len());
                report.succeeded += 1;
                report.proxies.extend(found);
            }
            Err(err) => {
                warn!("{} failed: {}", source, err);
                report.failed += 1;
            }
        }
    }

    report
}
