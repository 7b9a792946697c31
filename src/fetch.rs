use crate::{CrawlConfig, DatasetError, Result};
use reqwest::Client;
use tracing::debug;

/// The `PageClient` struct loads wiki pages over HTTP.
/// One client is opened per crawl and reused for every page.
pub struct PageClient {
    /// The HTTP client used for making requests.
    client: Client,
}

impl PageClient {
    /// Creates a new `PageClient` with the timeout and user agent from the config.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PageClient`, or an error if the client could not be created.
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .gzip(true)
            .build()?;

        Ok(Self { client })
    }

    /// Loads a page and returns its HTML.
    ///
    /// # Arguments
    ///
    /// * `url` - The page to load.
    ///
    /// # Returns
    ///
    /// The response body, or an error on a transport failure, a timeout or a non-success status.
    pub async fn goto(&self, url: &str) -> Result<String> {
        debug!("Fetching page: {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(DatasetError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.text().await?)
    }
}
