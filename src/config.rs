//! Tracker configuration.
//!
//! There are no flags or config files: everything is built from the
//! constants below. Site selectors describe the target retailer's markup
//! and are the part most likely to need updating.

use std::path::PathBuf;
use std::time::Duration;

/// Table of observed prices, read at startup and rewritten every cycle
pub const DATA_FILE: &str = "prices.csv";

/// Chart written after every successful cycle
pub const CHART_FILE: &str = "price_trend.svg";

/// Time between cycles (seconds)
pub const CYCLE_INTERVAL_SECS: u64 = 3600;

/// chromedriver's default listen address
pub const WEBDRIVER_URL: &str = "http://localhost:9515";

/// Upper bound on waiting for results to appear (seconds)
pub const RESULTS_TIMEOUT_SECS: u64 = 30;

/// Poll interval while waiting for page content (milliseconds)
pub const POLL_INTERVAL_MS: u64 = 500;

/// Hard cap on result pages visited in one fetch
pub const MAX_PAGES: usize = 100;

/// CSS selectors and URL shape for one retailer's search results.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Search URL with a `{query}` placeholder
    pub search_url_pattern: String,
    pub results_container: String,
    pub product_card: String,
    pub name: String,
    pub price: String,
    /// Best-effort: the retailer does not label this control consistently
    pub next_page: String,
}

impl SiteProfile {
    pub fn webuy_uk() -> Self {
        Self {
            search_url_pattern: "https://uk.webuy.com/search?stext={query}".to_string(),
            results_container: ".ais-Hits".to_string(),
            product_card: ".content".to_string(),
            name: ".card-title".to_string(),
            price: ".price-wrapper".to_string(),
            next_page: ".ais-Pagination-item--nextPage a, a[aria-label='Next page']".to_string(),
        }
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::webuy_uk()
    }
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub data_file: PathBuf,
    pub chart_file: PathBuf,
    pub interval: Duration,
    pub webdriver_url: String,
    pub results_timeout: Duration,
    pub poll_interval: Duration,
    pub max_pages: usize,
    pub site: SiteProfile,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DATA_FILE),
            chart_file: PathBuf::from(CHART_FILE),
            interval: Duration::from_secs(CYCLE_INTERVAL_SECS),
            webdriver_url: WEBDRIVER_URL.to_string(),
            results_timeout: Duration::from_secs(RESULTS_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            max_pages: MAX_PAGES,
            site: SiteProfile::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_poll_hourly_into_prices_csv() {
        let config = TrackerConfig::default();
        assert_eq!(config.data_file, PathBuf::from("prices.csv"));
        assert_eq!(config.interval, Duration::from_secs(3600));
        assert_eq!(config.max_pages, 100);
        assert!(config.site.search_url_pattern.contains("{query}"));
    }
}
