//! Search-result extraction, independent of the browser driving it.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::config::SiteProfile;
use crate::error::ScrapeError;
use crate::record::Listing;

/// Anything that can produce the current listings for an item name.
#[async_trait]
pub trait PriceSource {
    async fn fetch(&self, item: &str) -> Result<Vec<Listing>, ScrapeError>;
}

/// One open results page that can be read and paged forward.
#[async_trait]
pub trait SearchPage {
    async fn open(&mut self, url: &str) -> Result<(), ScrapeError>;

    /// Blocks until the results container is present, bounded by a timeout.
    async fn wait_for_results(&mut self) -> Result<(), ScrapeError>;

    /// Markup of the page as currently rendered.
    async fn html(&mut self) -> Result<String, ScrapeError>;

    /// Activates the next-page control and waits for the new results.
    /// `Ok(false)` when there is no usable control or nothing changed.
    async fn advance(&mut self) -> Result<bool, ScrapeError>;
}

/// A product card as found on the page. Either field may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub name: Option<String>,
    pub price: Option<String>,
}

impl ProductCard {
    /// Cards without both a name and a price are skipped, not treated as errors.
    pub fn into_listing(self) -> Option<Listing> {
        Some(Listing {
            name: self.name?,
            price: self.price?,
        })
    }
}

pub fn search_url(site: &SiteProfile, item: &str) -> String {
    site.search_url_pattern
        .replace("{query}", &urlencoding::encode(item.trim()))
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css.to_string()))
}

fn text_of(card: &ElementRef, selector: &Selector) -> Option<String> {
    let element = card.select(selector).next()?;
    let cleaned = element.text().collect::<Vec<_>>().join(" ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

pub fn parse_cards(html: &str, site: &SiteProfile) -> Result<Vec<ProductCard>, ScrapeError> {
    let card_selector = selector(&site.product_card)?;
    let name_selector = selector(&site.name)?;
    let price_selector = selector(&site.price)?;

    let document = Html::parse_document(html);
    Ok(document
        .select(&card_selector)
        .map(|card| ProductCard {
            name: text_of(&card, &name_selector),
            price: text_of(&card, &price_selector),
        })
        .collect())
}

/// Walks the result pages starting at `url`, at most `max_pages` of them,
/// collecting every complete card in page order. Stops early when a page
/// turn yields no cards or the same cards again.
pub async fn collect_listings<P>(
    page: &mut P,
    url: &str,
    site: &SiteProfile,
    max_pages: usize,
) -> Result<Vec<Listing>, ScrapeError>
where
    P: SearchPage + Send + ?Sized,
{
    page.open(url).await?;
    page.wait_for_results().await?;

    let mut listings = Vec::new();
    let mut previous: Option<Vec<ProductCard>> = None;
    let mut pages_read = 0;
    loop {
        let cards = parse_cards(&page.html().await?, site)?;
        // A next control that leads nowhere leaves the last page in place.
        if let Some(prev) = &previous {
            if cards.is_empty() || *prev == cards {
                debug!("page {} shows no new results", pages_read + 1);
                break;
            }
        }
        pages_read += 1;

        let found = cards.len();
        let before = listings.len();
        listings.extend(cards.iter().cloned().filter_map(ProductCard::into_listing));
        debug!(
            "page {}: {} cards, {} complete",
            pages_read,
            found,
            listings.len() - before
        );
        previous = Some(cards);

        if pages_read >= max_pages {
            warn!("page limit of {} reached", max_pages);
            break;
        }
        if !page.advance().await? {
            break;
        }
    }

    info!("found {} listings across {} pages", listings.len(), pages_read);
    Ok(listings)
}
