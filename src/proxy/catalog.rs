//! Built-in catalog of proxy sources
//!
//! Pure configuration: URLs, protocols, and extraction strategies for the
//! public lists this tool knows about. The pipeline accepts any list of
//! sources, so this catalog is just the default input.

use std::path::Path;

use crate::proxy::models::ProxyType::{self, Http, Socks4, Socks5};
use crate::proxy::sources::{
    Source, IP_PORT_ANCHOR_REGEX, IP_PORT_QUOTED_REGEX, IP_PORT_REGEX, IP_PORT_TABLE_REGEX,
};

/// Rounds for sources that return a small random sample per call
const POLL_ROUNDS: u32 = 10;

/// Page bound for the base64-token listing
const TOKEN_PAGES: u32 = 19;

/// The full built-in source catalog
pub fn default_sources() -> Vec<Source> {
    let mut sources = vec![
        // SOCKS4
        Source::pattern("https://api.proxyscrape.com/v2/?request=displayproxies&protocol=socks4", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://api.proxyscrape.com/?request=displayproxies&proxytype=socks4", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/jetkai/proxy-list/main/online-proxies/txt/proxies-socks4.txt", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/mmpx12/proxy-list/master/socks4.txt", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/roosterkid/openproxylist/main/SOCKS4_RAW.txt", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/socks4.txt", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/UserR3X/proxy-list/main/online/socks4.txt", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://www.proxy-list.download/api/v1/get?type=socks4", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://www.my-proxy.com/free-socks-4-proxy.html", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://www.socks-proxy.net/", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://www.freeproxychecker.com/result/socks4_proxies.txt", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/ShiftyTR/Proxy-List/master/socks4.txt", Socks4, &IP_PORT_REGEX),
        Source::pattern("http://proxydb.net/?protocol=socks4", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://api.openproxylist.xyz/socks4.txt", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://socks-proxy.net/", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/human1ty/proxy/main/socks4.txt", Socks4, &IP_PORT_REGEX),
        Source::pattern("https://openproxy.space/list/socks4", Socks4, &IP_PORT_QUOTED_REGEX),
        Source::poll("http://pubproxy.com/api/proxy?limit=5&format=txt&type=socks4", Socks4, POLL_ROUNDS),
        Source::pattern("https://www.proxy-list.download/SOCKS4", Socks4, &IP_PORT_TABLE_REGEX),
        Source::api("https://proxylist.geonode.com/api/proxy-list?limit=500&page=1&speed=fast&protocols=socks4", Socks4),
        Source::api("https://proxylist.geonode.com/api/proxy-list?limit=500&page=1&speed=medium&protocols=socks4", Socks4),
        Source::offset("https://hidemy.name/ru/proxy-list/?type=4", Socks4, 1, 9),
        Source::pattern("http://www.proxylists.net/socks4.txt", Socks4, &IP_PORT_REGEX),
        // SOCKS5
        Source::pattern("https://api.proxyscrape.com/v2/?request=displayproxies&protocol=socks5", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://api.proxyscrape.com/?request=displayproxies&proxytype=socks5", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/hookzof/socks5_list/master/proxy.txt", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/jetkai/proxy-list/main/online-proxies/txt/proxies-socks5.txt", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/manuGMG/proxy-365/main/SOCKS5.txt", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/mmpx12/proxy-list/master/socks5.txt", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/socks5.txt", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/UserR3X/proxy-list/main/online/socks5.txt", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://spys.me/socks.txt", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://www.my-proxy.com/free-socks-5-proxy.html", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/ShiftyTR/Proxy-List/master/socks5.txt", Socks5, &IP_PORT_REGEX),
        Source::pattern("http://proxydb.net/?protocol=socks5", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://www.proxy-list.download/api/v1/get?type=socks5", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://api.openproxylist.xyz/socks5.txt", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/human1ty/proxy/main/socks5.txt", Socks5, &IP_PORT_REGEX),
        Source::pattern("https://openproxy.space/list/socks5", Socks5, &IP_PORT_QUOTED_REGEX),
        Source::poll("http://pubproxy.com/api/proxy?limit=5&format=txt&type=socks5", Socks5, POLL_ROUNDS),
        Source::pattern("https://www.proxy-list.download/SOCKS5", Socks5, &IP_PORT_TABLE_REGEX),
        Source::api("https://proxylist.geonode.com/api/proxy-list?limit=500&page=1&speed=fast&protocols=socks5", Socks5),
        Source::api("https://proxylist.geonode.com/api/proxy-list?limit=500&page=1&speed=medium&protocols=socks5", Socks5),
        Source::pattern("https://www.freeproxychecker.com/result/socks5_proxies.txt", Socks5, &IP_PORT_REGEX),
        Source::pattern("http://www.proxylists.net/socks5.txt", Socks5, &IP_PORT_REGEX),
        Source::offset("https://hidemy.name/ru/proxy-list/?type=5", Socks5, 1, 9),
        // HTTP(S)
        Source::pattern("https://api.proxyscrape.com/v2/?request=displayproxies&protocol=http", Http, &IP_PORT_REGEX),
        Source::pattern("https://api.proxyscrape.com/?request=displayproxies&proxytype=http", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/almroot/proxylist/master/list.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/clarketm/proxy-list/master/proxy-list-raw.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/hendrikbgr/Free-Proxy-Repo/master/proxy_list.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/jetkai/proxy-list/main/online-proxies/txt/proxies-http%2Bhttps.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/mmpx12/proxy-list/master/http.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/mmpx12/proxy-list/master/https.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/roosterkid/openproxylist/main/HTTPS_RAW.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/sunny9577/proxy-scraper/master/proxies.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/http.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/UserR3X/proxy-list/main/online/http%2Bs.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://www.proxy-list.download/api/v1/get?type=http", Http, &IP_PORT_REGEX),
        Source::pattern("https://www.proxy-list.download/api/v1/get?type=https", Http, &IP_PORT_REGEX),
        Source::pattern("http://spys.me/proxy.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://www.sslproxies.org/", Http, &IP_PORT_REGEX),
        Source::pattern("https://www.my-proxy.com/free-proxy-list.html", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/ShiftyTR/Proxy-List/master/http.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/ShiftyTR/Proxy-List/master/https.txt", Http, &IP_PORT_REGEX),
        Source::pattern("http://proxydb.net/?protocol=http&protocol=https", Http, &IP_PORT_REGEX),
        Source::pattern("https://api.openproxylist.xyz/http.txt", Http, &IP_PORT_REGEX),
        Source::pattern("http://www.google-proxy.net/", Http, &IP_PORT_REGEX),
        Source::pattern("https://free-proxy-list.net/", Http, &IP_PORT_REGEX),
        Source::pattern("https://www.us-proxy.org/", Http, &IP_PORT_REGEX),
        Source::pattern("https://free-proxy-list.net/uk-proxy.html", Http, &IP_PORT_REGEX),
        Source::pattern("https://free-proxy-list.net/anonymous-proxy.html", Http, &IP_PORT_REGEX),
        Source::poll("http://pubproxy.com/api/proxy?limit=5&format=txt&type=http", Http, POLL_ROUNDS),
        Source::pattern("http://www.proxylists.net/http.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://raw.githubusercontent.com/human1ty/proxy/main/http.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://pastebin.com/raw/vQzZ8CwG", Http, &IP_PORT_REGEX),
        Source::pattern("https://openproxy.space/list/http", Http, &IP_PORT_QUOTED_REGEX),
        Source::pattern("https://www.proxy-list.download/HTTPS", Http, &IP_PORT_TABLE_REGEX),
        Source::pattern("https://www.proxy-list.download/HTTP", Http, &IP_PORT_TABLE_REGEX),
        Source::api("https://proxylist.geonode.com/api/proxy-list?limit=500&page=1&speed=fast&protocols=http%2Chttps", Http),
        Source::api("https://proxylist.geonode.com/api/proxy-list?limit=500&page=1&speed=medium&protocols=http%2Chttps", Http),
        Source::pattern("https://www.freeproxychecker.com/result/http_proxies.txt", Http, &IP_PORT_REGEX),
        Source::pattern("http://www.httptunnel.ge/ProxyListForFree.aspx", Http, &IP_PORT_REGEX),
        Source::pattern("http://api.foxtools.ru/v2/Proxy.txt", Http, &IP_PORT_REGEX),
        Source::pattern("https://www.ipaddress.com/proxy-list/", Http, &IP_PORT_ANCHOR_REGEX),
        Source::tokens("https://proxy-list.org/english/index.php", Http, TOKEN_PAGES),
    ];

    // my-proxy splits its HTTP list over numbered sibling pages
    sources.extend((2..=10).map(|page| {
        Source::pattern(
            &format!("https://www.my-proxy.com/free-proxy-list-{}.html", page),
            Http,
            &IP_PORT_REGEX,
        )
    }));

    // hidemy.name's HTTP listing is deep; cover it in ten-page windows
    sources.extend((1..200).step_by(10).map(|start| {
        Source::offset(
            "https://hidemy.name/ru/proxy-list/?type=hs",
            Http,
            start,
            start + 9,
        )
    }));

    sources
}

/// Load extra single-page pattern sources from a text file, one URL per
/// line; blank lines and `#` comments are skipped
pub fn sources_from_file(path: &Path, proxy_type: ProxyType) -> crate::Result<Vec<Source>> {
    let content = std::fs::read_to_string(path)?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| Source::pattern(line, proxy_type, &IP_PORT_REGEX))
        .collect())
}
