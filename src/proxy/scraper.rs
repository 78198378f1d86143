//! Source scraping: fetch pages and extract candidate proxies
//!
//! One `Scraper` owns a single HTTP client and executes any `Source`
//! against it. A `scrape` call either fully succeeds (possibly with zero
//! records) or fails with one error that aborts only that source.

use std::future::Future;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::seq::SliceRandom;
use regex::Regex;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL,
    PRAGMA, REFERER, USER_AGENT,
};
use reqwest::Client;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::debug;

use crate::proxy::error::ScrapeError;
use crate::proxy::models::{Proxy, ProxyType};
use crate::proxy::sources::{Source, Strategy};

/// Per-request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Pause between pagination pages and poll rounds in seconds
const DEFAULT_PAGE_PAUSE_SECS: u64 = 1;

const DEFAULT_REFERER: &str = "https://www.google.com/";

/// Pool of realistic browser user-agents, one chosen per request
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/47.0.2526.111 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_2) AppleWebKit/601.3.9 (KHTML, like Gecko) Version/9.0.2 Safari/601.3.9",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:15.0) Gecko/20100101 Firefox/15.0.1",
    "Mozilla/5.0 (X11; CrOS x86_64 8172.45.0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/51.0.2704.64 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/51.0.2704.79 Safari/537.36 Edge/14.14393",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36",
];

/// Configuration for the scraper
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Timeout for each HTTP request
    pub timeout: Duration,
    /// Pause between pagination pages and poll rounds
    pub page_pause: Duration,
    /// User-agent pool; one entry is picked at random per request
    pub user_agents: Vec<String>,
    /// Referer sent with every request
    pub referer: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_pause: Duration::from_secs(DEFAULT_PAGE_PAUSE_SECS),
            user_agents: USER_AGENTS.iter().map(|agent| agent.to_string()).collect(),
            referer: DEFAULT_REFERER.to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_page_pause(mut self, pause: Duration) -> Self {
        self.page_pause = pause;
        self
    }

    pub fn with_user_agents(mut self, user_agents: Vec<String>) -> Self {
        self.user_agents = user_agents;
        self
    }

    pub fn with_referer(mut self, referer: String) -> Self {
        self.referer = referer;
        self
    }

    /// Browser-like header set with a freshly chosen user-agent
    fn request_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9"),
        );
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        if let Ok(referer) = HeaderValue::from_str(&self.referer) {
            headers.insert(REFERER, referer);
        }
        if let Some(agent) = self.user_agents.choose(&mut rand::thread_rng()) {
            if let Ok(agent) = HeaderValue::from_str(agent) {
                headers.insert(USER_AGENT, agent);
            }
        }
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("document"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("navigate"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("none"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-user"),
            HeaderValue::from_static("?1"),
        );
        headers.insert(
            HeaderName::from_static("sec-gpc"),
            HeaderValue::from_static("1"),
        );
        headers.insert(
            HeaderName::from_static("upgrade-insecure-requests"),
            HeaderValue::from_static("1"),
        );
        headers
    }
}

/// Scraper executing sources against one shared HTTP client
pub struct Scraper {
    config: ScraperConfig,
    client: Client,
}

impl Scraper {
    /// Create a scraper with default configuration
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_config(ScraperConfig::default())
    }

    /// Create a scraper with custom configuration
    pub fn with_config(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Fetch one page, treating any non-success status as a hard failure
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .headers(self.config.request_headers())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.text().await?)
    }

    /// Run one source to completion, yielding every record it produced
    pub async fn scrape(&self, source: &Source) -> Result<Vec<Proxy>, ScrapeError> {
        let proxy_type = source.proxy_type;
        let pause = self.config.page_pause;
        let fetch = move |url: String| async move { self.fetch(&url).await };

        match &source.strategy {
            Strategy::Pattern { regex } => {
                let body = self.fetch(&source.url).await?;
                Ok(extract_pairs(regex, &body, proxy_type))
            }
            Strategy::Api => {
                let body = self.fetch(&source.url).await?;
                parse_api_payload(&body, proxy_type)
            }
            Strategy::Poll { regex, repeats } => {
                run_poll(&source.url, *repeats, pause, fetch, |body| {
                    extract_pairs(regex, body, proxy_type)
                })
                .await
            }
            Strategy::Paged { regex, pages, param } => {
                run_paged(&source.url, param, *pages, pause, fetch, |body| {
                    extract_pairs(regex, body, proxy_type)
                })
                .await
            }
            Strategy::Offset {
                regex,
                first,
                last,
                page_size,
                param,
            } => {
                run_offset(&source.url, param, *first, *last, *page_size, fetch, |body| {
                    extract_pairs(regex, body, proxy_type)
                })
                .await
            }
            Strategy::Tokens { regex, pages, param } => {
                run_paged(&source.url, param, *pages, pause, fetch, |body| {
                    extract_tokens(regex, body, proxy_type)
                })
                .await
            }
        }
    }
}

/// Poll the same URL a fixed number of times, pausing between rounds
async fn run_poll<F, Fut, E>(
    url: &str,
    repeats: u32,
    pause: Duration,
    mut fetch: F,
    extract: E,
) -> Result<Vec<Proxy>, ScrapeError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, ScrapeError>>,
    E: Fn(&str) -> Vec<Proxy>,
{
    let mut found = Vec::new();
    for round in 0..repeats {
        if round > 0 {
            sleep(pause).await;
        }
        let body = fetch(url.to_string()).await?;
        found.extend(extract(&body));
    }
    Ok(found)
}

/// Walk numeric pages 1..=bound until a page yields nothing.
///
/// An empty page means the listing is exhausted; it is a normal end of
/// iteration, not a failure.
async fn run_paged<F, Fut, E>(
    url: &str,
    param: &str,
    pages: u32,
    pause: Duration,
    mut fetch: F,
    extract: E,
) -> Result<Vec<Proxy>, ScrapeError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, ScrapeError>>,
    E: Fn(&str) -> Vec<Proxy>,
{
    let mut found = Vec::new();
    for page in 1..=pages {
        if page > 1 {
            sleep(pause).await;
        }
        let page_url = format!("{}{}{}={}", url, param_separator(url), param, page);
        let body = fetch(page_url).await?;
        let matched = extract(&body);
        if matched.is_empty() {
            break;
        }
        found.extend(matched);
    }
    Ok(found)
}

/// Walk a page range where later pages carry a row offset parameter.
///
/// Page 1 fetches the bare URL; page N appends `param = page_size * (N-1)`.
/// No pause between pages; stops at the first empty page.
async fn run_offset<F, Fut, E>(
    url: &str,
    param: &str,
    first: u32,
    last: u32,
    page_size: u32,
    mut fetch: F,
    extract: E,
) -> Result<Vec<Proxy>, ScrapeError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, ScrapeError>>,
    E: Fn(&str) -> Vec<Proxy>,
{
    let mut found = Vec::new();
    for page in first..=last {
        let page_url = if page == 1 {
            url.to_string()
        } else {
            format!(
                "{}{}{}={}",
                url,
                param_separator(url),
                param,
                page_size * (page - 1)
            )
        };
        let body = fetch(page_url).await?;
        let matched = extract(&body);
        if matched.is_empty() {
            break;
        }
        found.extend(matched);
    }
    Ok(found)
}

fn param_separator(url: &str) -> char {
    if url.contains('?') {
        '&'
    } else {
        '?'
    }
}

/// Extract `(ip, port)` capture pairs, skipping records whose port does
/// not parse
fn extract_pairs(regex: &Regex, body: &str, proxy_type: ProxyType) -> Vec<Proxy> {
    regex
        .captures_iter(body)
        .filter_map(
            |caps| match Proxy::from_parts(&caps[1], &caps[2], proxy_type) {
                Ok(proxy) => Some(proxy),
                Err(err) => {
                    debug!("skipping record: {}", err);
                    None
                }
            },
        )
        .collect()
}

/// Extract base64 tokens and decode each to an `ip:port` record
fn extract_tokens(regex: &Regex, body: &str, proxy_type: ProxyType) -> Vec<Proxy> {
    regex
        .captures_iter(body)
        .filter_map(|caps| match decode_token(&caps[1], proxy_type) {
            Ok(proxy) => Some(proxy),
            Err(err) => {
                debug!("skipping token: {}", err);
                None
            }
        })
        .collect()
}

fn decode_token(token: &str, proxy_type: ProxyType) -> Result<Proxy, ScrapeError> {
    let malformed = || ScrapeError::MalformedRecord {
        token: token.to_string(),
    };

    let bytes = BASE64.decode(token).map_err(|_| malformed())?;
    let text = String::from_utf8(bytes).map_err(|_| malformed())?;
    let (host, port) = text.split_once(':').ok_or_else(malformed)?;
    Proxy::from_parts(host, port, proxy_type)
}

#[derive(Deserialize)]
struct ApiPayload {
    data: Vec<ApiRow>,
}

#[derive(Deserialize)]
struct ApiRow {
    ip: String,
    port: ApiPort,
}

/// APIs disagree on whether `port` is a number or a string
#[derive(Deserialize)]
#[serde(untagged)]
enum ApiPort {
    Number(u16),
    Text(String),
}

/// Parse a structured API document with a top-level `data` array
fn parse_api_payload(body: &str, proxy_type: ProxyType) -> Result<Vec<Proxy>, ScrapeError> {
    let payload: ApiPayload = serde_json::from_str(body)?;

    Ok(payload
        .data
        .into_iter()
        .filter_map(|ApiRow { ip, port }| {
            let record = match port {
                ApiPort::Number(port) => Ok(Proxy::new(ip, port, proxy_type)),
                ApiPort::Text(text) => Proxy::from_parts(&ip, &text, proxy_type),
            };
            match record {
                Ok(proxy) => Some(proxy),
                Err(err) => {
                    debug!("skipping record: {}", err);
                    None
                }
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::sources::{IP_PORT_QUOTED_REGEX, IP_PORT_REGEX, IP_PORT_TABLE_REGEX, PROXY_TOKEN_REGEX};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn counting_fetch(
        calls: Arc<AtomicUsize>,
        body: &'static str,
    ) -> impl FnMut(String) -> std::future::Ready<Result<String, ScrapeError>> {
        move |_url| {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(body.to_string()))
        }
    }

    #[test]
    fn test_extract_pairs_plain_text() {
        let body = "192.0.2.1:8080\n192.0.2.2:3128\n10.0.0.1:1080\n";
        let proxies = extract_pairs(&IP_PORT_REGEX, body, ProxyType::Http);
        assert_eq!(proxies.len(), 3);
        assert_eq!(proxies[0].host, "192.0.2.1");
        assert_eq!(proxies[0].port, 8080);
    }

    #[test]
    fn test_extract_pairs_table_markup() {
        let body = "<tr><td>192.0.2.1</td><td>8080</td></tr><tr><td>192.0.2.2</td>\n<td>80</td></tr>";
        let proxies = extract_pairs(&IP_PORT_TABLE_REGEX, body, ProxyType::Socks4);
        assert_eq!(proxies.len(), 2);
        assert!(proxies.iter().all(|p| p.proxy_type == ProxyType::Socks4));
    }

    #[test]
    fn test_extract_pairs_quoted_blob() {
        let body = r#"{"items":["192.0.2.1:8080","192.0.2.2:80"]}"#;
        let proxies = extract_pairs(&IP_PORT_QUOTED_REGEX, body, ProxyType::Http);
        assert_eq!(proxies.len(), 2);
    }

    #[test]
    fn test_extract_pairs_skips_out_of_range_port() {
        let body = "192.0.2.1:70000\n192.0.2.2:80\n";
        let proxies = extract_pairs(&IP_PORT_REGEX, body, ProxyType::Http);
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].host, "192.0.2.2");
    }

    #[test]
    fn test_extract_tokens_decodes_base64() {
        // base64 of "192.0.2.1:8080"
        let body = "<script>Proxy('MTkyLjAuMi4xOjgwODA=')</script>";
        let proxies = extract_tokens(&PROXY_TOKEN_REGEX, body, ProxyType::Http);
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].host, "192.0.2.1");
        assert_eq!(proxies[0].port, 8080);
    }

    #[test]
    fn test_extract_tokens_skips_undecodable() {
        let body = "Proxy('====') Proxy('MTkyLjAuMi4xOjgwODA=')";
        let proxies = extract_tokens(&PROXY_TOKEN_REGEX, body, ProxyType::Socks5);
        assert_eq!(proxies.len(), 1);
    }

    #[test]
    fn test_decode_token_requires_colon() {
        // base64 of "19202184", no colon separator
        assert!(decode_token("MTkyMDIxODQ=", ProxyType::Http).is_err());
    }

    #[test]
    fn test_api_payload_mixed_port_types() {
        let body = r#"{"data":[{"ip":"192.0.2.1","port":8080},{"ip":"192.0.2.2","port":"3128"}]}"#;
        let proxies = parse_api_payload(body, ProxyType::Socks5).unwrap();
        assert_eq!(proxies.len(), 2);
        assert_eq!(proxies[1].port, 3128);
    }

    #[test]
    fn test_api_payload_skips_bad_row() {
        let body = r#"{"data":[{"ip":"192.0.2.1","port":"eighty"},{"ip":"192.0.2.2","port":80}]}"#;
        let proxies = parse_api_payload(body, ProxyType::Http).unwrap();
        assert_eq!(proxies.len(), 1);
    }

    #[test]
    fn test_api_payload_wrong_shape_is_malformed() {
        let err = parse_api_payload(r#"{"rows":[]}"#, ProxyType::Http).unwrap_err();
        assert!(matches!(err, ScrapeError::MalformedResponse(_)));

        let err = parse_api_payload("not json at all", ProxyType::Http).unwrap_err();
        assert!(matches!(err, ScrapeError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_poll_fetches_exactly_repeats_times() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting_fetch(calls.clone(), "192.0.2.1:8080");

        let found = run_poll("http://stub", 10, Duration::ZERO, fetch, |body| {
            extract_pairs(&IP_PORT_REGEX, body, ProxyType::Http)
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 10);
        assert_eq!(found.len(), 10);
    }

    #[tokio::test]
    async fn test_paged_never_exceeds_page_bound() {
        // Every page would be non-empty; the bound must cap the walk.
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting_fetch(calls.clone(), "192.0.2.1:8080");

        let found = run_paged("http://stub/list", "p", 3, Duration::ZERO, fetch, |body| {
            extract_pairs(&IP_PORT_REGEX, body, ProxyType::Http)
        })
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_paged_stops_at_first_empty_page() {
        let fetch = |url: String| {
            std::future::ready(Ok(if url.ends_with("p=1") {
                "192.0.2.1:8080".to_string()
            } else {
                "no proxies here".to_string()
            }))
        };

        let found = run_paged("http://stub/list", "p", 20, Duration::ZERO, fetch, |body| {
            extract_pairs(&IP_PORT_REGEX, body, ProxyType::Http)
        })
        .await
        .unwrap();

        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_paged_appends_query_parameter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let urls = seen.clone();
        let fetch = move |url: String| {
            urls.lock().unwrap().push(url);
            std::future::ready(Ok(String::new()))
        };

        run_paged("http://stub/list?x=1", "p", 5, Duration::ZERO, fetch, |body| {
            extract_pairs(&IP_PORT_REGEX, body, ProxyType::Http)
        })
        .await
        .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), ["http://stub/list?x=1&p=1"]);
    }

    #[tokio::test]
    async fn test_offset_pages_carry_computed_offset() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let urls = seen.clone();
        let fetch = move |url: String| {
            let bare = !url.contains("start=");
            urls.lock().unwrap().push(url);
            std::future::ready(Ok(if bare || urls.lock().unwrap().len() < 3 {
                "<td>192.0.2.1</td><td>8080</td>".to_string()
            } else {
                String::new()
            }))
        };

        let found = run_offset("https://stub/list?type=hs", "start", 1, 9, 64, fetch, |body| {
            extract_pairs(&IP_PORT_TABLE_REGEX, body, ProxyType::Http)
        })
        .await
        .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            [
                "https://stub/list?type=hs",
                "https://stub/list?type=hs&start=64",
                "https://stub/list?type=hs&start=128",
            ]
        );
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_poll_propagates_fetch_failure() {
        let fetch = |url: String| {
            std::future::ready(Err(ScrapeError::Status {
                url,
                status: reqwest::StatusCode::FORBIDDEN,
            }))
        };

        let result = run_poll("http://stub", 10, Duration::ZERO, fetch, |body| {
            extract_pairs(&IP_PORT_REGEX, body, ProxyType::Http)
        })
        .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_request_headers_use_injected_agent() {
        let config = ScraperConfig::new()
            .with_user_agents(vec!["TestAgent/1.0".to_string()])
            .with_referer("https://example.com/".to_string());

        let headers = config.request_headers();
        assert_eq!(headers.get(USER_AGENT).unwrap(), "TestAgent/1.0");
        assert_eq!(headers.get(REFERER).unwrap(), "https://example.com/");
        assert_eq!(headers.get("sec-fetch-mode").unwrap(), "navigate");
        assert_eq!(headers.get("upgrade-insecure-requests").unwrap(), "1");
    }

    #[test]
    fn test_scraper_config_builder() {
        let config = ScraperConfig::new()
            .with_timeout(Duration::from_secs(5))
            .with_page_pause(Duration::ZERO);

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.page_pause.is_zero());
    }
}
