//! Source descriptors and extraction strategies
//!
//! A source is one external page, feed, or API believed to publish open
//! proxies. Each source carries the strategy needed to turn its payload
//! into proxy records: a plain regex, a JSON shape, or one of the
//! pagination schemes the bigger listing sites use.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::proxy::models::ProxyType;

const IP_SEGMENT: &str = r"[0-9]+(?:\.[0-9]+){3}";

/// Bare `ip:port` pairs in plain text
pub static IP_PORT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"({}):([0-9]+)", IP_SEGMENT)).expect("Invalid ip:port regex")
});

/// `ip</td><td>port` pairs in HTML table rows
pub static IP_PORT_TABLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"({})\s*</td>\s*<td>\s*([0-9]+)", IP_SEGMENT))
        .expect("Invalid table regex")
});

/// `"ip:port"` pairs quoted inside embedded JSON blobs
pub static IP_PORT_QUOTED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#""({}):([0-9]+)""#, IP_SEGMENT)).expect("Invalid quoted regex")
});

/// `ip</a>:port` pairs where the address sits inside an anchor tag
pub static IP_PORT_ANCHOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"({})</a>:([0-9]+)", IP_SEGMENT)).expect("Invalid anchor regex")
});

/// Base64 `Proxy('...')` tokens embedded in script blocks
pub static PROXY_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Proxy\('([\w=]+)'\)").expect("Invalid token regex"));

/// How one source's payload is turned into proxy records
///
/// A closed set of variants rather than an open trait: every source in the
/// catalog is one of these shapes, and each variant carries only the
/// configuration it needs.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// One page, one regex with `(ip, port)` capture groups
    Pattern { regex: &'static Regex },

    /// One JSON document with a top-level `data` array of `ip`/`port` rows
    Api,

    /// Re-fetch the same page a fixed number of times, pausing between
    /// rounds; used for sources that return a small random sample per call
    Poll {
        regex: &'static Regex,
        repeats: u32,
    },

    /// Numeric page parameter, pages 1..=bound, pausing between pages;
    /// stops at the first page with no matches
    Paged {
        regex: &'static Regex,
        pages: u32,
        param: &'static str,
    },

    /// Row-offset parameter: page 1 is the bare URL, later pages append
    /// `param = page_size * (page - 1)`; no pause, stops at the first
    /// empty page
    Offset {
        regex: &'static Regex,
        first: u32,
        last: u32,
        page_size: u32,
        param: &'static str,
    },

    /// Base64 `ip:port` tokens with the numeric pagination scheme
    Tokens {
        regex: &'static Regex,
        pages: u32,
        param: &'static str,
    },
}

/// One external proxy source: where to fetch and how to extract
#[derive(Debug, Clone)]
pub struct Source {
    pub url: String,
    pub proxy_type: ProxyType,
    pub strategy: Strategy,
}

impl Source {
    pub fn new(url: &str, proxy_type: ProxyType, strategy: Strategy) -> Self {
        Self {
            url: url.to_string(),
            proxy_type,
            strategy,
        }
    }

    /// Single-page regex source; the default shape for text feeds and
    /// simple listing pages
    pub fn pattern(url: &str, proxy_type: ProxyType, regex: &'static Regex) -> Self {
        Self::new(url, proxy_type, Strategy::Pattern { regex })
    }

    /// JSON API source with a top-level `data` array
    pub fn api(url: &str, proxy_type: ProxyType) -> Self {
        Self::new(url, proxy_type, Strategy::Api)
    }

    /// Sampling source polled `repeats` times
    pub fn poll(url: &str, proxy_type: ProxyType, repeats: u32) -> Self {
        Self::new(
            url,
            proxy_type,
            Strategy::Poll {
                regex: &IP_PORT_REGEX,
                repeats,
            },
        )
    }

    /// Numerically paged regex source
    pub fn paged(
        url: &str,
        proxy_type: ProxyType,
        regex: &'static Regex,
        pages: u32,
        param: &'static str,
    ) -> Self {
        Self::new(url, proxy_type, Strategy::Paged { regex, pages, param })
    }

    /// Offset-paged table source covering pages `first..=last`
    pub fn offset(url: &str, proxy_type: ProxyType, first: u32, last: u32) -> Self {
        Self::new(
            url,
            proxy_type,
            Strategy::Offset {
                regex: &IP_PORT_TABLE_REGEX,
                first,
                last,
                page_size: 64,
                param: "start",
            },
        )
    }

    /// Base64-token source with numeric pagination
    pub fn tokens(url: &str, proxy_type: ProxyType, pages: u32) -> Self {
        Self::new(
            url,
            proxy_type,
            Strategy::Tokens {
                regex: &PROXY_TOKEN_REGEX,
                pages,
                param: "p",
            },
        )
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let proto = match self.proxy_type {
            ProxyType::Http => "HTTP",
            ProxyType::Socks4 => "SOCKS4",
            ProxyType::Socks5 => "SOCKS5",
        };
        write!(f, "{} | {}", proto, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_display_names_protocol_and_url() {
        let source = Source::pattern("https://example.com/socks4.txt", ProxyType::Socks4, &IP_PORT_REGEX);
        assert_eq!(source.to_string(), "SOCKS4 | https://example.com/socks4.txt");
    }

    #[test]
    fn test_ip_port_regex_captures() {
        let caps = IP_PORT_REGEX.captures("payload 192.0.2.1:8080 trailer").unwrap();
        assert_eq!(&caps[1], "192.0.2.1");
        assert_eq!(&caps[2], "8080");
    }

    #[test]
    fn test_table_regex_spans_cell_markup() {
        let html = "<td>192.0.2.1</td>\n<td>3128</td>";
        let caps = IP_PORT_TABLE_REGEX.captures(html).unwrap();
        assert_eq!(&caps[1], "192.0.2.1");
        assert_eq!(&caps[2], "3128");
    }

    #[test]
    fn test_token_regex_extracts_opaque_tokens() {
        let html = "img.src = Proxy('MTkyLjAuMi4xOjgwODA=')";
        let caps = PROXY_TOKEN_REGEX.captures(html).unwrap();
        assert_eq!(&caps[1], "MTkyLjAuMi4xOjgwODA=");
    }

    #[test]
    fn test_anchor_regex_splits_linkified_address() {
        let html = r#"<a href="/ip/192.0.2.7">192.0.2.7</a>:8118"#;
        let caps = IP_PORT_ANCHOR_REGEX.captures(html).unwrap();
        assert_eq!(&caps[1], "192.0.2.7");
        assert_eq!(&caps[2], "8118");
    }
}
