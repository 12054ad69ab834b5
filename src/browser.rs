//! Headless Chrome over WebDriver.

use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::prelude::*;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::config::{SiteProfile, TrackerConfig};
use crate::error::ScrapeError;
use crate::extract::{PriceSource, ProductCard, SearchPage, collect_listings, parse_cards, search_url};
use crate::record::Listing;

/// A results page in a live browser session. Does not own the session.
pub struct BrowserPage<'a> {
    driver: &'a WebDriver,
    site: &'a SiteProfile,
    timeout: Duration,
    poll: Duration,
}

impl<'a> BrowserPage<'a> {
    pub fn new(driver: &'a WebDriver, site: &'a SiteProfile, timeout: Duration, poll: Duration) -> Self {
        Self {
            driver,
            site,
            timeout,
            poll,
        }
    }

    async fn current_cards(&self) -> Result<Vec<ProductCard>, ScrapeError> {
        parse_cards(&self.driver.source().await?, self.site)
    }

    // Result pages are swapped in place, so wait for the cards to change
    // rather than for a navigation. `false` when they never do, e.g. after
    // clicking a next link on the last page.
    async fn wait_for_new_cards(&self, previous: &[ProductCard]) -> Result<bool, ScrapeError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            sleep(self.poll).await;
            let cards = self.current_cards().await?;
            if !cards.is_empty() && cards != previous {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                debug!(
                    "results unchanged {}s after next-page click",
                    self.timeout.as_secs()
                );
                return Ok(false);
            }
        }
    }
}

#[async_trait]
impl SearchPage for BrowserPage<'_> {
    async fn open(&mut self, url: &str) -> Result<(), ScrapeError> {
        info!("Navigating to {}", url);
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn wait_for_results(&mut self) -> Result<(), ScrapeError> {
        self.driver
            .query(By::Css(self.site.results_container.as_str()))
            .wait(self.timeout, self.poll)
            .first()
            .await
            .map_err(|e| {
                debug!("results container never appeared: {}", e);
                ScrapeError::Timeout {
                    what: format!("'{}'", self.site.results_container),
                    secs: self.timeout.as_secs(),
                }
            })?;
        Ok(())
    }

    async fn html(&mut self) -> Result<String, ScrapeError> {
        Ok(self.driver.source().await?)
    }

    async fn advance(&mut self) -> Result<bool, ScrapeError> {
        let controls = self
            .driver
            .find_all(By::Css(self.site.next_page.as_str()))
            .await?;
        let Some(next) = controls.into_iter().next() else {
            debug!("no next-page control");
            return Ok(false);
        };
        if !next.is_displayed().await? || !next.is_enabled().await? {
            debug!("next-page control present but not interactable");
            return Ok(false);
        }

        let previous = self.current_cards().await?;
        next.click().await?;
        self.wait_for_new_cards(&previous).await
    }
}

/// Opens a fresh headless session per fetch and always quits it.
pub struct BrowserExtractor {
    webdriver_url: String,
    site: SiteProfile,
    timeout: Duration,
    poll: Duration,
    max_pages: usize,
}

impl BrowserExtractor {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            site: config.site.clone(),
            timeout: config.results_timeout,
            poll: config.poll_interval,
            max_pages: config.max_pages,
        }
    }

    async fn open_session(&self) -> Result<WebDriver, ScrapeError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless()?;
        caps.add_arg("--window-size=1920,1080")?;
        Ok(WebDriver::new(self.webdriver_url.as_str(), caps).await?)
    }
}

#[async_trait]
impl PriceSource for BrowserExtractor {
    async fn fetch(&self, item: &str) -> Result<Vec<Listing>, ScrapeError> {
        let url = search_url(&self.site, item);
        let driver = self.open_session().await?;

        // No `?` until the session is closed.
        let result = {
            let mut page = BrowserPage::new(&driver, &self.site, self.timeout, self.poll);
            collect_listings(&mut page, &url, &self.site, self.max_pages).await
        };

        if let Err(e) = driver.quit().await {
            warn!("failed to close browser session: {}", e);
        }
        result
    }
}
