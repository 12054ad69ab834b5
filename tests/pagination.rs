// Result-page traversal against scripted pages, no browser involved.

use async_trait::async_trait;

use price_tracker::config::SiteProfile;
use price_tracker::extract::{SearchPage, collect_listings};
use price_tracker::{Listing, ScrapeError};

fn page_html(cards: &[(&str, Option<&str>)]) -> String {
    let body: String = cards
        .iter()
        .map(|(name, price)| match price {
            Some(price) => format!(
                r#"<div class="content"><h3 class="card-title">{name}</h3><p class="price-wrapper">{price}</p></div>"#
            ),
            None => format!(r#"<div class="content"><h3 class="card-title">{name}</h3></div>"#),
        })
        .collect();
    format!(r#"<html><body><div class="ais-Hits">{body}</div></body></html>"#)
}

/// What the next control does once the scripted pages run out.
#[derive(Clone, Copy)]
enum AfterLast {
    /// No control on the last page.
    Stop,
    /// Control reported usable but clicking it leaves the last page shown.
    Stale,
    /// A fresh page every time.
    Endless,
    /// The browser session dies while looking for the control.
    Broken,
}

/// Serves `pages` in order, then behaves as `after_last` says.
struct ScriptedPages {
    pages: Vec<String>,
    current: usize,
    after_last: AfterLast,
    results_appear: bool,
    opened: Option<String>,
    advances: usize,
}

impl ScriptedPages {
    fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            current: 0,
            after_last: AfterLast::Stop,
            results_appear: true,
            opened: None,
            advances: 0,
        }
    }
}

#[async_trait]
impl SearchPage for ScriptedPages {
    async fn open(&mut self, url: &str) -> Result<(), ScrapeError> {
        self.opened = Some(url.to_string());
        Ok(())
    }

    async fn wait_for_results(&mut self) -> Result<(), ScrapeError> {
        if self.results_appear {
            Ok(())
        } else {
            Err(ScrapeError::Timeout {
                what: "'.ais-Hits'".to_string(),
                secs: 30,
            })
        }
    }

    async fn html(&mut self) -> Result<String, ScrapeError> {
        match self.pages.get(self.current) {
            Some(html) => Ok(html.clone()),
            None => {
                let name = format!("PS5 Bundle #{}", self.current);
                Ok(page_html(&[(name.as_str(), Some("£400"))]))
            }
        }
    }

    async fn advance(&mut self) -> Result<bool, ScrapeError> {
        let on_last = self.current + 1 >= self.pages.len();
        match (on_last, self.after_last) {
            (false, _) | (true, AfterLast::Endless) => self.current += 1,
            (true, AfterLast::Stale) => {}
            (true, AfterLast::Stop) => return Ok(false),
            (true, AfterLast::Broken) => {
                return Err(ScrapeError::Timeout {
                    what: "the browser session".to_string(),
                    secs: 30,
                });
            }
        }
        self.advances += 1;
        Ok(true)
    }
}

#[tokio::test]
async fn visits_every_page_once_and_stops_at_the_last() {
    let site = SiteProfile::default();
    let mut pages = ScriptedPages::new(vec![
        page_html(&[("PS5 Console", Some("£350")), ("PS5 Pad", Some("£40"))]),
        page_html(&[("PS5 Headset", Some("£60"))]),
        page_html(&[("PS5 Stand", Some("£15"))]),
    ]);

    let listings = collect_listings(&mut pages, "https://example.test/search", &site, 100)
        .await
        .unwrap();

    assert_eq!(
        listings,
        vec![
            Listing::new("PS5 Console", "£350"),
            Listing::new("PS5 Pad", "£40"),
            Listing::new("PS5 Headset", "£60"),
            Listing::new("PS5 Stand", "£15"),
        ]
    );
    assert_eq!(pages.advances, 2);
    assert_eq!(pages.opened.as_deref(), Some("https://example.test/search"));
}

#[tokio::test]
async fn single_page_without_next_control() {
    let site = SiteProfile::default();
    let mut pages = ScriptedPages::new(vec![page_html(&[("PS5 Console", Some("£350"))])]);

    let listings = collect_listings(&mut pages, "u", &site, 100).await.unwrap();

    assert_eq!(listings.len(), 1);
    assert_eq!(pages.advances, 0);
}

#[tokio::test]
async fn always_present_next_control_is_capped() {
    let site = SiteProfile::default();
    let mut pages = ScriptedPages::new(vec![page_html(&[("PS5 Console", Some("£350"))])]);
    pages.after_last = AfterLast::Endless;

    let listings = collect_listings(&mut pages, "u", &site, 5).await.unwrap();

    assert_eq!(listings.len(), 5);
    assert_eq!(pages.advances, 4);
}

#[tokio::test]
async fn card_without_price_contributes_nothing() {
    let site = SiteProfile::default();
    let mut pages = ScriptedPages::new(vec![page_html(&[("PS5 Console", None)])]);

    let listings = collect_listings(&mut pages, "u", &site, 100).await.unwrap();

    assert!(listings.is_empty());
}

#[tokio::test]
async fn missing_results_container_is_a_scrape_error() {
    let site = SiteProfile::default();
    let mut pages = ScriptedPages::new(vec![page_html(&[])]);
    pages.results_appear = false;

    let result = collect_listings(&mut pages, "u", &site, 100).await;

    assert!(matches!(result, Err(ScrapeError::Timeout { .. })));
}

#[tokio::test]
async fn stale_next_control_keeps_collected_listings() {
    let site = SiteProfile::default();
    let mut pages = ScriptedPages::new(vec![
        page_html(&[("PS5 Console", Some("£350"))]),
        page_html(&[("PS5 Pad", Some("£40"))]),
    ]);
    pages.after_last = AfterLast::Stale;

    let listings = collect_listings(&mut pages, "u", &site, 100).await.unwrap();

    assert_eq!(
        listings,
        vec![Listing::new("PS5 Console", "£350"), Listing::new("PS5 Pad", "£40")]
    );
    assert_eq!(pages.advances, 2);
}

#[tokio::test]
async fn empty_page_after_next_ends_pagination() {
    let site = SiteProfile::default();
    let mut pages = ScriptedPages::new(vec![
        page_html(&[("PS5 Console", Some("£350"))]),
        page_html(&[]),
    ]);
    pages.after_last = AfterLast::Endless;

    let listings = collect_listings(&mut pages, "u", &site, 100).await.unwrap();

    assert_eq!(listings, vec![Listing::new("PS5 Console", "£350")]);
    assert_eq!(pages.advances, 1);
}

#[tokio::test]
async fn browser_failure_while_paging_fails_the_fetch() {
    let site = SiteProfile::default();
    let mut pages = ScriptedPages::new(vec![page_html(&[("PS5 Console", Some("£350"))])]);
    pages.after_last = AfterLast::Broken;

    let result = collect_listings(&mut pages, "u", &site, 100).await;

    assert!(result.is_err());
}
