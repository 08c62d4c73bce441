//! Crawler module for page discovery and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - Paginated listing discovery
//! - Overall crawl coordination

mod enumerator;
mod fetcher;
mod runner;

pub use enumerator::{extract_listing_links, PageEnumerator};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use runner::{CrawlRunner, CrawlSettings, PageOutcome};

use crate::config::Config;
use crate::robots::RobotsPolicy;
use crate::storage::RecordStore;
use crate::{HarvestError, OutcomeCounters, RecordBuilder};

/// Runs a complete crawl operation against the configured site
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Load the site's robots.txt
/// 3. Walk the listing and process every target page into `store`
///
/// # Arguments
///
/// * `config` - A validated configuration
/// * `store` - Where records are looked up and written
pub async fn crawl<S: RecordStore>(
    config: &Config,
    store: S,
) -> Result<OutcomeCounters, HarvestError> {
    let fetcher = HttpFetcher::new(&config.user_agent)?;
    let settings = CrawlSettings::from_config(config)?;

    let robots_url = match &config.crawler.robots_url {
        Some(url) => url.clone(),
        None => crate::url::robots_url(&settings.site_base)?.to_string(),
    };
    let policy = RobotsPolicy::load(&fetcher, &robots_url).await?;

    let builder = RecordBuilder::from_config(&config.extraction)?;
    let mut runner = CrawlRunner::new(fetcher, policy, store, builder, settings);
    runner.run(&config.crawler.root_url).await
}
