use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Scraping failed for this cycle. Recoverable: the cycle is skipped.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("browser automation failed: {0}")]
    Browser(#[from] thirtyfour::error::WebDriverError),
    #[error("timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },
    #[error("invalid selector '{0}'")]
    Selector(String),
}

/// The price table could not be read or written. Fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path} has columns {found:?}, expected [\"name\", \"price\", \"timestamp\"]")]
    Schema { path: PathBuf, found: Vec<String> },
    #[error("{path} line {line}: {reason}")]
    Corrupt {
        path: PathBuf,
        line: u64,
        reason: String,
    },
}

/// The chart could not be rendered. Logged and ignored by the cycle.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("failed to render chart {path}: {reason}")]
    Render { path: PathBuf, reason: String },
}
