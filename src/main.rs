use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use price_tracker::browser::BrowserExtractor;
use price_tracker::config::TrackerConfig;
use price_tracker::cycle;

fn prompt_item() -> Result<String> {
    print!("Enter the item name to track: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read item name")?;
    let item = line.trim().to_string();
    if item.is_empty() {
        bail!("item name must not be empty");
    }
    Ok(item)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("price_tracker=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let item = prompt_item()?;
    let config = TrackerConfig::default();
    let extractor = BrowserExtractor::new(&config);

    println!("🛒 Tracking '{}' every {} minutes", item, config.interval.as_secs() / 60);
    println!("{}", "=".repeat(60));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match cycle::run(&extractor, &item, &config, shutdown).await {
        Ok(table) => {
            info!("Stopped with {} rows in {}", table.len(), config.data_file.display());
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e).context("price history could not be persisted")
        }
    }
}
