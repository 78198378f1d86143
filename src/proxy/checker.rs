//! Proxy checker: confirm candidates actually relay traffic
//!
//! Each candidate is probed exactly once, through itself, against one echo
//! endpoint. A probe counts only if the endpoint's expected output comes
//! back, which proves the proxy forwarded the request rather than merely
//! accepting a connection.

use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::{Client, Proxy as UpstreamProxy};
use tracing::debug;

use crate::proxy::error::ScrapeError;
use crate::proxy::models::Proxy;

/// Timeout for each probe in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Probes are single short-lived connections, so the pool is much wider
/// than the scrape pool
const DEFAULT_CHECK_WORKERS: usize = 500;

/// Marker found in CGI environment-dump pages
const ENV_MARKER: &str = "REQUEST_METHOD";

/// An echo endpoint plus the response fragment that proves it answered
#[derive(Debug, Clone)]
pub struct Judge {
    pub url: String,
    pub marker: String,
}

impl Judge {
    pub fn new(url: &str, marker: &str) -> Self {
        Self {
            url: url.to_string(),
            marker: marker.to_string(),
        }
    }
}

/// The fixed set of echo/env-dump endpoints probes are spread across
pub fn default_judges() -> Vec<Judge> {
    vec![
        Judge::new("http://httpbin.org/get", "\"headers\""),
        Judge::new("http://azenv.net/", ENV_MARKER),
        Judge::new("http://www.proxy-listen.de/azenv.php", ENV_MARKER),
        Judge::new("http://www.meow.org.uk/cgi-bin/env.pl", ENV_MARKER),
        Judge::new("https://users.ugent.be/~bfdwever/start/env.cgi", ENV_MARKER),
        Judge::new("https://www2.htw-dresden.de/~beck/cgi-bin/env.cgi", ENV_MARKER),
        Judge::new("http://mojeip.net.pl/asdfa/azenv.php", ENV_MARKER),
    ]
}

/// Configuration for the proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each probe
    pub timeout: Duration,
    /// Number of concurrent probes
    pub concurrency: usize,
    /// Echo endpoints to spread probes across
    pub judges: Vec<Judge>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CHECK_WORKERS,
            judges: default_judges(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_judges(mut self, judges: Vec<Judge>) -> Self {
        self.judges = judges;
        self
    }
}

/// Checker validating harvested proxies against echo endpoints
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    pub fn new() -> Self {
        Self::with_config(CheckerConfig::default())
    }

    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Probe every proxy once and keep the ones that answered correctly
    pub async fn check_proxies(&self, proxies: Vec<Proxy>) -> Vec<Proxy> {
        let assignments = assign_judges(proxies, &self.config.judges);
        run_probes(assignments, self.config.concurrency, move |proxy, judge| async move {
            self.probe(&proxy, &judge).await
        })
        .await
    }

    /// One probe: connect through the proxy to its judge and look for the
    /// judge's marker in the response
    async fn probe(&self, proxy: &Proxy, judge: &Judge) -> bool {
        let client = match self.proxied_client(proxy) {
            Ok(client) => client,
            Err(err) => {
                debug!("{} rejected: {}", proxy, err);
                return false;
            }
        };

        let response =
            match tokio::time::timeout(self.config.timeout, client.get(&judge.url).send()).await {
                Ok(Ok(response)) if response.status().is_success() => response,
                _ => return false,
            };

        match response.text().await {
            Ok(body) => body.contains(&judge.marker),
            Err(_) => false,
        }
    }

    /// Client routing all traffic through the candidate proxy
    fn proxied_client(&self, proxy: &Proxy) -> Result<Client, ScrapeError> {
        let upstream = UpstreamProxy::all(proxy.url())?;
        let client = Client::builder()
            .proxy(upstream)
            .timeout(self.config.timeout)
            .build()?;
        Ok(client)
    }
}

impl Default for ProxyChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Partition proxies round-robin so each one is checked against exactly
/// one judge
pub fn assign_judges(proxies: Vec<Proxy>, judges: &[Judge]) -> Vec<(Proxy, Judge)> {
    if judges.is_empty() {
        return Vec::new();
    }

    proxies
        .into_iter()
        .enumerate()
        .map(|(index, proxy)| (proxy, judges[index % judges.len()].clone()))
        .collect()
}

/// Run all probes on a bounded pool, keeping the proxies whose probe
/// returned true.
///
/// Generic over the probe so partitioning, concurrency, and filtering are
/// testable without opening connections.
pub async fn run_probes<F, Fut>(
    assignments: Vec<(Proxy, Judge)>,
    concurrency: usize,
    probe: F,
) -> Vec<Proxy>
where
    F: Fn(Proxy, Judge) -> Fut,
    Fut: Future<Output = bool>,
{
    stream::iter(assignments)
        .map(|(proxy, judge)| {
            let verdict = probe(proxy.clone(), judge);
            async move { (proxy, verdict.await) }
        })
        .buffer_unordered(concurrency.max(1))
        .filter_map(|(proxy, live)| async move { live.then_some(proxy) })
        .collect()
        .await
}
