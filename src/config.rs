use crate::{DatasetError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// The `CrawlConfig` struct holds the settings the scraper reads from `scraper.yml`.
/// It includes the seed URLs, the allowed URL prefixes, the depth bound and the delay between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Substrings a discovered URL must contain to be followed.
    pub base_urls: Vec<String>,
    /// The maximum recursion depth; start URLs sit at depth 0.
    pub max_depth: usize,
    /// Seconds to sleep after each successful fetch.
    pub rate_limit: f64,
    /// The URLs the crawl starts from, in order.
    pub start_urls: Vec<String>,
    /// Seconds before a page fetch is abandoned.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// The user agent string sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// How listing and content pages are recognised.
    #[serde(default)]
    pub selectors: PageSelectors,
}

/// The `PageSelectors` struct describes the wiki's page layout.
/// The defaults match a MediaWiki deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    /// A URL containing this marker is treated as a listing page.
    pub listing_url_marker: String,
    /// Containers on a listing page whose links lead to further pages.
    pub listing_group: String,
    /// The container holding the documentation text on a content page.
    pub content: String,
    /// Where the page title is read from.
    pub title: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            listing_url_marker: String::from("Category:"),
            listing_group: String::from("div.mw-category-group"),
            content: String::from("div.mw-parser-output"),
            title: String::from("title"),
        }
    }
}

fn default_timeout_secs() -> u64 {
    crate::DEFAULT_TIMEOUT.as_secs()
}

fn default_user_agent() -> String {
    String::from(crate::DEFAULT_USER_AGENT)
}

impl CrawlConfig {
    /// Loads the config from a YAML file.
    ///
    /// # Arguments
    ///
    /// * `path` - The config file; its format is inferred from the extension.
    ///
    /// # Returns
    ///
    /// The validated `CrawlConfig`, or an error if the file is missing, unparsable or out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()).required(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if !self.rate_limit.is_finite() || self.rate_limit < 0.0 {
            return Err(DatasetError::InvalidConfig(format!(
                "rate_limit must be a non-negative number of seconds, got {}",
                self.rate_limit
            )));
        }
        if self.timeout_secs == 0 {
            return Err(DatasetError::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The pause taken after each successful fetch.
    pub fn rate_limit(&self) -> Duration {
        Duration::from_secs_f64(self.rate_limit)
    }

    /// The timeout applied to every page fetch.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Checks whether a discovered URL may be followed.
    ///
    /// A URL is followed only if it has a host and contains one of the configured base URLs.
    pub fn is_valid_url(&self, url: &str) -> bool {
        let has_host = Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(|host| !host.is_empty()))
            .unwrap_or(false);

        has_host && self.base_urls.iter().any(|base| url.contains(base.as_str()))
    }
}

/// Where the procedures read and write their files.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self::rooted_at(".")
    }
}

impl DatasetPaths {
    /// Lays out `dataset/raw`, `dataset/processed` and `logs` under `root`.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            raw_dir: root.join("dataset").join("raw"),
            processed_dir: root.join("dataset").join("processed"),
            log_dir: root.join("logs"),
        }
    }

    /// The JSON array written by the scraper.
    pub fn raw_file(&self) -> PathBuf {
        self.raw_dir.join("raw_wiki_data.json")
    }

    /// The JSONL file written by the sorter.
    pub fn processed_file(&self) -> PathBuf {
        self.processed_dir.join("arma_commands.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_config() -> CrawlConfig {
        CrawlConfig {
            base_urls: vec!["community.bistudio.com/wiki".to_string()],
            max_depth: 2,
            rate_limit: 0.5,
            start_urls: vec![],
            timeout_secs: 30,
            user_agent: default_user_agent(),
            selectors: PageSelectors::default(),
        }
    }

    #[test]
    fn test_load_yaml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.yml");
        fs::write(
            &path,
            "base_urls:\n  - community.bistudio.com/wiki\nmax_depth: 3\nrate_limit: 1\nstart_urls:\n  - https://community.bistudio.com/wiki/Category:Arma_3:_Scripting_Commands\n",
        )
        .unwrap();

        let config = CrawlConfig::load(&path).unwrap();

        assert_eq!(config.max_depth, 3);
        assert_eq!(config.rate_limit(), Duration::from_secs(1));
        assert_eq!(config.start_urls.len(), 1);
        assert_eq!(config.timeout(), crate::DEFAULT_TIMEOUT);
        assert_eq!(config.selectors.listing_url_marker, "Category:");
        assert_eq!(config.selectors.content, "div.mw-parser-output");
    }

    #[test]
    fn test_load_overrides_selectors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.yml");
        fs::write(
            &path,
            "base_urls: [example.com]\nmax_depth: 1\nrate_limit: 0\nstart_urls: [\"https://example.com/wiki/Main\"]\nselectors:\n  content: article\n",
        )
        .unwrap();

        let config = CrawlConfig::load(&path).unwrap();

        assert_eq!(config.selectors.content, "article");
        assert_eq!(config.selectors.listing_group, "div.mw-category-group");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CrawlConfig::load(dir.path().join("nope.yml"));

        assert!(matches!(result, Err(DatasetError::Config(_))));
    }

    #[test]
    fn test_negative_rate_limit_rejected() {
        let mut config = sample_config();
        config.rate_limit = -1.0;

        assert!(matches!(config.validate(), Err(DatasetError::InvalidConfig(_))));
    }

    #[test]
    fn test_is_valid_url() {
        let config = sample_config();

        assert!(config.is_valid_url("https://community.bistudio.com/wiki/setDamage"));
        assert!(!config.is_valid_url("https://example.com/wiki/setDamage"));
        assert!(!config.is_valid_url("community.bistudio.com/wiki/setDamage"));
    }

    #[test]
    fn test_dataset_paths() {
        let paths = DatasetPaths::rooted_at("/tmp/run");

        assert_eq!(paths.raw_file(), PathBuf::from("/tmp/run/dataset/raw/raw_wiki_data.json"));
        assert_eq!(
            paths.processed_file(),
            PathBuf::from("/tmp/run/dataset/processed/arma_commands.jsonl")
        );
    }
}
