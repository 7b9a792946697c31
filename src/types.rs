use serde::{Deserialize, Serialize};

/// One content page as it was scraped from the wiki.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    /// The page title, or the URL when the page has none.
    pub title: String,
    /// The URL the page was fetched from.
    pub url: String,
    /// The trimmed text of the page's content container.
    pub content: String,
}

/// An instruction-tuning record derived from a [`RawDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub instruction: String,
    /// Always empty; kept for compatibility with instruction/input/output datasets.
    pub input: String,
    pub output: String,
}

impl ProcessedRecord {
    /// Builds the record for a page title and its already-trimmed content.
    pub fn for_command(title: &str, content: &str) -> Self {
        Self {
            instruction: format!("{}{}", crate::INSTRUCTION_PREFIX, title),
            input: String::new(),
            output: content.to_string(),
        }
    }
}
