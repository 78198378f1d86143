//! Proxy Harvest - concurrent free-proxy list aggregator
//!
//! Scrapes dozens of public proxy lists concurrently, deduplicates the
//! results, optionally checks each proxy through a set of echo endpoints,
//! and writes the consolidated list to a file.

pub mod logging;
pub mod proxy;

pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
