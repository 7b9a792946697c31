use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod output;
pub mod transform;
pub mod types;

// Re-export commonly used types
pub use config::{CrawlConfig, DatasetPaths};
pub use types::{ProcessedRecord, RawDocument};

/// The `DatasetError` enum represents the errors that can occur while scraping or transforming.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The config file is missing or could not be parsed.
    #[error("Failed to load config: {0}")]
    Config(#[from] ::config::ConfigError),
    /// A config value is out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    /// A configured CSS selector could not be parsed.
    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
    /// Represents an error that occurs during an HTTP request.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("Failed to load {url} - Status: {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    /// A raw entry lacks a required key.
    #[error("Missing key in entry: {0}")]
    MissingField(&'static str),
    /// A raw entry has a key of the wrong type.
    #[error("Key '{0}' is not a string")]
    InvalidField(&'static str),
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A type alias for `Result` with the `DatasetError` error type.
pub type Result<T> = std::result::Result<T, DatasetError>;

// Constants

/// The default timeout for a single page fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Where the scraper looks for its config file.
pub const DEFAULT_CONFIG_PATH: &str = "data-tools/scraper.yml";
/// The user agent sent with every page request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
/// Prefix of the synthesized instruction for every processed record.
pub const INSTRUCTION_PREFIX: &str = "Explain the Arma command: ";
