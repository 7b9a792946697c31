use crate::extract::{PageExtractor, PageKind};
use crate::fetch::PageClient;
use crate::output::JsonArrayWriter;
use crate::{CrawlConfig, DatasetPaths, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::io::Write;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// A page waiting to be processed.
#[derive(Debug, Clone)]
struct CrawlItem {
    url: String,
    depth: usize,
}

/// The `Crawler` struct walks the wiki from listing pages down to content pages.
/// It owns the visited set for one run, so a URL is never fetched twice.
pub struct Crawler {
    config: CrawlConfig,
    client: PageClient,
    extractor: PageExtractor,
    visited: HashSet<String>,
    progress: ProgressBar,
}

impl Crawler {
    /// Creates a new `Crawler` with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Crawler`, or an error if the HTTP client or the selectors could not be built.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = PageClient::new(&config)?;
        let extractor = PageExtractor::new(&config.selectors)?;

        Ok(Self {
            config,
            client,
            extractor,
            visited: HashSet::new(),
            progress: ProgressBar::hidden(),
        })
    }

    /// Reports the current URL and the number of pages found on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// The URLs processed so far in this run.
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Processes `url` and everything reachable from it within the depth bound.
    ///
    /// Listing pages are expanded depth-first, left to right; each content page
    /// found is appended to `sink`. Pages that fail to load are logged and
    /// skipped.
    ///
    /// # Arguments
    ///
    /// * `url` - The page to start from.
    /// * `depth` - The depth `url` sits at.
    /// * `sink` - Where extracted records are written.
    ///
    /// # Returns
    ///
    /// The number of records written by this call. Only errors from `sink` are returned.
    pub async fn scrape_page<W: Write>(
        &mut self,
        url: &str,
        depth: usize,
        sink: &mut JsonArrayWriter<W>,
    ) -> Result<usize> {
        let mut pending = vec![CrawlItem {
            url: url.to_string(),
            depth,
        }];
        let mut count = 0;

        while let Some(item) = pending.pop() {
            if item.depth > self.config.max_depth || self.visited.contains(&item.url) {
                continue;
            }
            self.visited.insert(item.url.clone());

            info!("Scraping: {} (depth: {})", item.url, item.depth);
            self.progress.set_message(format!("Scraping: {}", item.url));

            let html = match self.client.goto(&item.url).await {
                Ok(html) => html,
                Err(e) => {
                    error!("Error scraping {}: {}", item.url, e);
                    continue;
                }
            };

            sleep(self.config.rate_limit()).await;

            match self.extractor.classify(&item.url) {
                PageKind::Listing => {
                    debug!("Processing category page: {}", item.url);
                    let children: Vec<CrawlItem> = self
                        .extractor
                        .extract_links(&html, &item.url)
                        .into_iter()
                        .filter(|link| self.config.is_valid_url(link) && !self.visited.contains(link))
                        .map(|link| {
                            info!("Found command link: {}", link);
                            CrawlItem {
                                url: link,
                                depth: item.depth + 1,
                            }
                        })
                        .collect();

                    // Reversed so the first link is popped first.
                    pending.extend(children.into_iter().rev());
                }
                PageKind::Content => match self.extractor.extract_document(&html, &item.url) {
                    Some(document) => {
                        info!("Found content for: {}", document.title);
                        sink.append(&document)?;
                        count += 1;
                        self.progress.inc(1);
                    }
                    None => warn!("No content container on {}", item.url),
                },
            }
        }

        Ok(count)
    }
}

/// Crawls every start URL and writes the records to the raw store.
///
/// # Arguments
///
/// * `config` - The crawl configuration.
/// * `paths` - Where the raw store lives.
///
/// # Returns
///
/// The total number of records written. Any error is logged as fatal and returned;
/// records written before it stay on disk.
pub async fn scrape_wiki(config: CrawlConfig, paths: &DatasetPaths) -> Result<usize> {
    match run_crawl(config, paths).await {
        Ok(total) => Ok(total),
        Err(e) => {
            error!("Fatal error during scraping: {}", e);
            Err(e)
        }
    }
}

async fn run_crawl(config: CrawlConfig, paths: &DatasetPaths) -> Result<usize> {
    config.validate()?;
    let start_urls = config.start_urls.clone();
    // Config problems must surface before the previous raw store is truncated.
    let crawler = Crawler::new(config)?;

    std::fs::create_dir_all(&paths.raw_dir)?;
    let output_file = paths.raw_file();
    let mut sink = JsonArrayWriter::create(&output_file)?;

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{pos} pages] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(120));

    let mut crawler = crawler.with_progress(progress.clone());
    info!("Client ready, starting scraping...");

    let mut total_count = 0;
    for url in &start_urls {
        info!("Processing start URL: {}", url);
        let count = crawler.scrape_page(url, 0, &mut sink).await?;
        total_count += count;
        info!("Found {} entries from {}", count, url);
    }

    drop(crawler);
    sink.finish()?;

    progress.finish_with_message("Scraping completed!");
    info!(
        "Scraping completed. Saved {} entries to {}",
        total_count,
        output_file.display()
    );

    Ok(total_count)
}
