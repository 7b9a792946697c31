use anyhow::{bail, Context};
use arma_dataset::{
    config::{CrawlConfig, DatasetPaths},
    crawler,
    logging::LogSession,
    transform,
    DEFAULT_CONFIG_PATH,
};
use std::time::Instant;
use tracing::{error, info};

/// The main entry point of the application.
///
/// The first argument picks the procedure: `scrape` crawls the wiki into the raw store,
/// `sort` turns the raw store into instruction records, and `all` runs both in order.
///
/// # Returns
///
/// An error, and so a non-zero exit, when a procedure fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let command = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    let paths = DatasetPaths::default();

    match command.as_str() {
        "scrape" => scrape(&paths).await,
        "sort" => sort(&paths),
        "all" => {
            scrape(&paths).await?;
            sort(&paths)
        }
        other => bail!("unknown command '{}', expected one of: scrape, sort, all", other),
    }
}

async fn scrape(paths: &DatasetPaths) -> anyhow::Result<()> {
    let log = LogSession::start(&paths.log_dir, "scraper")?;
    let start_time = Instant::now();

    let config = match CrawlConfig::load(DEFAULT_CONFIG_PATH) {
        Ok(config) => {
            info!("Config loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load config: {}", e);
            return Err(e).context("Failed to load config file");
        }
    };

    let total = crawler::scrape_wiki(config, paths).await?;

    println!("\n=== Scrape Summary ===");
    println!("Entries saved: {}", total);
    println!("Output: {}", paths.raw_file().display());
    println!("Processing time: {:.2?}", start_time.elapsed());
    println!("Log: {}", log.path().display());
    Ok(())
}

fn sort(paths: &DatasetPaths) -> anyhow::Result<()> {
    let log = LogSession::start(&paths.log_dir, "sorter")?;
    let start_time = Instant::now();

    let total = transform::process_wiki_data(paths)?;

    println!("\n=== Sort Summary ===");
    println!("Records saved: {}", total);
    println!("Output: {}", paths.processed_file().display());
    println!("Processing time: {:.2?}", start_time.elapsed());
    println!("Log: {}", log.path().display());
    Ok(())
}
