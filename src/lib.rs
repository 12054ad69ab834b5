//! Periodic price tracker for a retailer's search results.
//!
//! Each cycle scrapes the listings for one item name in a headless browser,
//! appends them with a timestamp to a CSV history and redraws a price chart.

pub mod browser;
pub mod config;
pub mod cycle;
pub mod error;
pub mod extract;
pub mod plot;
pub mod record;
pub mod store;

pub use config::{SiteProfile, TrackerConfig};
pub use error::{PlotError, ScrapeError, StoreError};
pub use extract::{PriceSource, SearchPage};
pub use record::{Listing, PriceRecord, PriceTable};
