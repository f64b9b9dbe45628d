//! Show which proxies would be used for a set of URLs

use anyhow::{Context, Result};
use autoproxy::{
    ConfigLoader, ConfigValidator, NoProxySelector, ProxySearch, RequestUri, SearchStrategy,
    SharedSelector, StrategyKind,
};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "autoproxy", version)]
#[command(about = "Discover the configured proxy and show what each URL would use")]
struct Args {
    /// Config file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Strategy to try, in order (can be used multiple times; replaces the configured list)
    #[arg(long, short = 's', value_name = "STRATEGY")]
    strategy: Vec<StrategyKind>,

    /// Additional hosts that always go direct
    #[arg(long, value_name = "LIST")]
    no_proxy: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,

    /// URLs to resolve
    #[arg(required = true)]
    urls: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let env_filter = if args.verbose {
        EnvFilter::from_default_env()
            .add_directive(tracing_subscriber::filter::LevelFilter::DEBUG.into())
    } else {
        EnvFilter::from_default_env()
            .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config =
        ConfigLoader::load_or_default(args.config).context("Failed to load configuration")?;
    if !args.strategy.is_empty() {
        config.search.strategies = Some(args.strategy);
    }
    if let Some(no_proxy) = &args.no_proxy {
        config.search.bypass = Some(match config.search.bypass.take() {
            Some(bypass) => format!("{}, {}", bypass, no_proxy),
            None => no_proxy.clone(),
        });
    }
    ConfigValidator::validate(&config).context("Invalid configuration")?;

    let search = ProxySearch::from_config(&config).context("Invalid search configuration")?;
    tracing::debug!(
        "Search order: {:?}",
        search.strategies().iter().map(SearchStrategy::kind).collect::<Vec<_>>()
    );

    let selector = find_selector(&search)?;
    for url in &args.urls {
        let uri = RequestUri::parse(url);
        let proxies = selector.select(&uri);
        let proxies: Vec<String> = proxies.iter().map(ToString::to_string).collect();
        println!("{}: {}", url, proxies.join(", "));
    }

    Ok(())
}

/// The discovered selector, or DIRECT when nothing was found
fn find_selector(search: &ProxySearch) -> Result<SharedSelector> {
    match search.proxy_selector().context("Proxy search failed")? {
        Some(selector) => Ok(selector),
        None => {
            tracing::info!("No proxy settings found, connecting directly");
            let direct: SharedSelector = NoProxySelector::instance();
            Ok(direct)
        }
    }
}
