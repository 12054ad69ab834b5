//! fetch → append → save → plot, repeated on a timer.

use std::future::Future;

use chrono::{Local, NaiveDateTime};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::config::TrackerConfig;
use crate::error::StoreError;
use crate::extract::PriceSource;
use crate::plot;
use crate::record::PriceTable;
use crate::store;

/// Runs one cycle stamped `at` and returns the resulting table.
///
/// A failed scrape skips the rest of the cycle and hands back `table`
/// untouched. A failed save is returned to the caller, which must stop:
/// the in-memory table can no longer be trusted to match the file.
pub async fn run_cycle<S>(
    source: &S,
    table: PriceTable,
    item: &str,
    config: &TrackerConfig,
    at: NaiveDateTime,
) -> Result<PriceTable, StoreError>
where
    S: PriceSource + Sync + ?Sized,
{
    info!("Fetching prices for {}...", item);
    let listings = match source.fetch(item).await {
        Ok(listings) => listings,
        Err(e) => {
            warn!("Fetching prices for {} failed, skipping this cycle: {}", item, e);
            return Ok(table);
        }
    };

    let table = table.append(&listings, at);
    store::save(&table, &config.data_file)?;
    info!(
        "Recorded {} prices ({} rows in {})",
        listings.len(),
        table.len(),
        config.data_file.display()
    );

    if let Err(e) = plot::plot(&table, item, &config.chart_file) {
        warn!("{}", e);
    }
    Ok(table)
}

/// Loads the table and runs a cycle every `config.interval`, the first one
/// immediately, until `shutdown` completes or the store fails.
pub async fn run<S, F>(
    source: &S,
    item: &str,
    config: &TrackerConfig,
    shutdown: F,
) -> Result<PriceTable, StoreError>
where
    S: PriceSource + Sync + ?Sized,
    F: Future<Output = ()>,
{
    let mut table = store::load(&config.data_file)?;
    info!(
        "Loaded {} rows from {}",
        table.len(),
        config.data_file.display()
    );

    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Shutting down");
                return Ok(table);
            }
            _ = ticker.tick() => {
                table = run_cycle(source, table, item, config, Local::now().naive_local()).await?;
                info!("Data updated. Waiting for the next cycle...");
            }
        }
    }
}
