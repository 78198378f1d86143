//! Proxy data models

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::proxy::error::ScrapeError;

/// Proxy protocol enumeration
///
/// HTTP covers both plain and TLS sources; the catalog never distinguishes
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProxyType {
    #[default]
    Http,
    Socks4,
    Socks5,
}

impl ProxyType {
    /// Lowercase scheme used in the canonical proxy URL
    pub fn scheme(&self) -> &'static str {
        match self {
            ProxyType::Http => "http",
            ProxyType::Socks4 => "socks4",
            ProxyType::Socks5 => "socks5",
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// A single harvested proxy
///
/// Equality and hashing are structural: two records with the same host,
/// port, and protocol are the same proxy no matter which source produced
/// them, so a `HashSet<Proxy>` absorbs duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proxy {
    pub host: String,
    pub port: u16,
    pub proxy_type: ProxyType,
}

static PROXY_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(http|socks4|socks5)://([^:/]+):([0-9]+)/?$").expect("Invalid proxy URL regex")
});

impl Proxy {
    pub fn new(host: String, port: u16, proxy_type: ProxyType) -> Self {
        Self {
            host,
            port,
            proxy_type,
        }
    }

    /// Build a proxy from textual host and port as extracted from a page.
    ///
    /// The port must parse as an integer in 0-65535; anything else is a
    /// malformed record. The host is not validated beyond what the
    /// extraction pattern already guaranteed.
    pub fn from_parts(host: &str, port: &str, proxy_type: ProxyType) -> Result<Self, ScrapeError> {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ScrapeError::MalformedRecord {
                token: format!("{}:{}", host, port),
            })?;

        Ok(Self::new(host.to_string(), port, proxy_type))
    }

    /// Canonical proxy URL, e.g. `socks5://1.2.3.4:1080`
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.proxy_type, self.host, self.port)
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

impl FromStr for Proxy {
    type Err = ScrapeError;

    /// Parse the canonical `scheme://host:port` form back into a proxy
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = PROXY_URL_REGEX
            .captures(s.trim())
            .ok_or_else(|| ScrapeError::MalformedRecord {
                token: s.to_string(),
            })?;

        let proxy_type = match &caps[1] {
            "http" => ProxyType::Http,
            "socks4" => ProxyType::Socks4,
            _ => ProxyType::Socks5,
        };

        Proxy::from_parts(&caps[2], &caps[3], proxy_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_proxy_creation() {
        let proxy = Proxy::new("127.0.0.1".to_string(), 8080, ProxyType::Http);
        assert_eq!(proxy.host, "127.0.0.1");
        assert_eq!(proxy.port, 8080);
        assert_eq!(proxy.proxy_type, ProxyType::Http);
    }

    #[test]
    fn test_from_parts_normalizes_port() {
        let proxy = Proxy::from_parts("192.0.2.1", "8080", ProxyType::Socks5).unwrap();
        assert_eq!(proxy.port, 8080);
    }

    #[test]
    fn test_from_parts_rejects_bad_port() {
        assert!(Proxy::from_parts("192.0.2.1", "notaport", ProxyType::Http).is_err());
        assert!(Proxy::from_parts("192.0.2.1", "99999", ProxyType::Http).is_err());
        assert!(Proxy::from_parts("192.0.2.1", "-1", ProxyType::Http).is_err());
    }

    #[test]
    fn test_canonical_url_schemes() {
        let http = Proxy::new("10.0.0.1".to_string(), 80, ProxyType::Http);
        let socks4 = Proxy::new("10.0.0.1".to_string(), 1080, ProxyType::Socks4);
        let socks5 = Proxy::new("10.0.0.1".to_string(), 1080, ProxyType::Socks5);
        assert_eq!(http.url(), "http://10.0.0.1:80");
        assert_eq!(socks4.url(), "socks4://10.0.0.1:1080");
        assert_eq!(socks5.url(), "socks5://10.0.0.1:1080");
    }

    #[test]
    fn test_canonical_round_trip() {
        for proxy_type in [ProxyType::Http, ProxyType::Socks4, ProxyType::Socks5] {
            let proxy = Proxy::new("192.0.2.1".to_string(), 8080, proxy_type);
            let parsed: Proxy = proxy.url().parse().unwrap();
            assert_eq!(parsed, proxy);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not a proxy".parse::<Proxy>().is_err());
        assert!("ftp://1.2.3.4:21".parse::<Proxy>().is_err());
        assert!("http://1.2.3.4".parse::<Proxy>().is_err());
    }

    #[test]
    fn test_structural_equality_dedups() {
        let a = Proxy::new("192.0.2.1".to_string(), 8080, ProxyType::Http);
        let b = Proxy::new("192.0.2.1".to_string(), 8080, ProxyType::Http);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        set.insert(Proxy::new("192.0.2.1".to_string(), 8080, ProxyType::Socks5));
        assert_eq!(set.len(), 2);
    }
}
