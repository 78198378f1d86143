//! Proxy harvesting pipeline
//!
//! This module provides functionality for:
//! - Describing external proxy sources and their extraction strategies
//! - Scraping all sources concurrently with per-source failure isolation
//! - Checking harvested proxies against echo endpoints
//! - Gating on minimum yield and writing the consolidated list

pub mod catalog;
pub mod checker;
pub mod error;
pub mod harvester;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod scraper;
pub mod sources;

pub use checker::{default_judges, CheckerConfig, Judge, ProxyChecker};
pub use error::{RunError, ScrapeError};
pub use harvester::{HarvestReport, Harvester};
pub use models::{Proxy, ProxyType};
pub use pipeline::{RunConfig, RunSummary};
pub use scraper::{Scraper, ScraperConfig};
pub use sources::{Source, Strategy};
