use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use proxy_harvest::{
    catalog, logging, pipeline, CheckerConfig, ProxyChecker, ProxyType, RunConfig, Scraper,
    ScraperConfig,
};

/// A concurrent free-proxy list aggregator and checker
#[derive(Parser)]
#[command(name = "proxy-harvest")]
#[command(about = "Scrape public proxy lists, dedup, optionally check, and write one file")]
struct Cli {
    /// Output file for the consolidated proxy list
    #[arg(short, long, default_value = "proxies.txt")]
    output: PathBuf,

    /// Check harvested proxies against echo endpoints before writing
    #[arg(long)]
    check: bool,

    /// Minimum number of harvested proxies for the run to count
    #[arg(long, default_value_t = 20000)]
    min_proxies: usize,

    /// Minimum number of working proxies when --check is set
    #[arg(long, default_value_t = 400)]
    min_working: usize,

    /// Timeout in seconds for each source fetch
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Timeout in seconds for each proxy check
    #[arg(long, default_value_t = 10)]
    check_timeout: u64,

    /// Number of concurrent scrape workers
    #[arg(long, default_value_t = 100)]
    scrape_workers: usize,

    /// Number of concurrent check workers
    #[arg(long, default_value_t = 500)]
    check_workers: usize,

    /// File with extra source URLs to scrape (one URL per line)
    #[arg(short = 'f', long)]
    source_file: Option<PathBuf>,

    /// Proxy type for sources loaded from --source-file (http, socks4, socks5)
    #[arg(long, default_value = "http")]
    source_type: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut sources = catalog::default_sources();
    if let Some(path) = &cli.source_file {
        let extra = catalog::sources_from_file(path, parse_proxy_type(&cli.source_type)?)?;
        println!("Loaded {} extra sources from {:?}", extra.len(), path);
        sources.extend(extra);
    }

    println!("Harvesting {} sources...", sources.len());

    let scraper = Scraper::with_config(
        ScraperConfig::new().with_timeout(Duration::from_secs(cli.timeout)),
    )?;
    let checker = ProxyChecker::with_config(
        CheckerConfig::new()
            .with_timeout(Duration::from_secs(cli.check_timeout))
            .with_concurrency(cli.check_workers),
    );
    let config = RunConfig {
        output: cli.output.clone(),
        min_harvested: cli.min_proxies,
        min_working: cli.min_working,
        check: cli.check,
        scrape_workers: cli.scrape_workers,
    };

    let summary = pipeline::run(scraper, checker, sources, &config).await?;

    println!(
        "Wrote {} proxies to {:?} ({} harvested)",
        summary.written, cli.output, summary.harvested
    );

    Ok(())
}

fn parse_proxy_type(s: &str) -> Result<ProxyType> {
    match s.to_lowercase().as_str() {
        "http" | "https" => Ok(ProxyType::Http),
        "socks4" => Ok(ProxyType::Socks4),
        "socks5" => Ok(ProxyType::Socks5),
        _ => Err(anyhow!(
            "Invalid proxy type: {}. Use: http, socks4, socks5",
            s
        )),
    }
}
