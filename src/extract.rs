//! Page classification and extraction for MediaWiki-style pages.
//!
//! Link resolution skips hrefs that can never lead to another wiki page:
//! fragment-only links (`#top`), `mailto:`, `tel:` and `javascript:`. A
//! fragment-only href would otherwise resolve to the listing page itself
//! plus a fragment, a distinct URL that is fetched again and reclassified
//! as a listing.

use crate::config::PageSelectors;
use crate::{DatasetError, RawDocument, Result};
use scraper::{Html, Selector};
use tracing::instrument;
use url::Url;

/// How a fetched page is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Links to further pages; expanded, never recorded.
    Listing,
    /// Holds documentation text; recorded.
    Content,
}

/// The `PageExtractor` struct classifies wiki pages and pulls links and text out of them.
/// It uses CSS selectors to identify the relevant parts of the document.
pub struct PageExtractor {
    /// URLs containing this marker are listing pages.
    listing_marker: String,
    /// Containers whose links are followed on a listing page.
    listing_group: Selector,
    /// Any link inside a listing group.
    link: Selector,
    /// The container holding a content page's text.
    content: Selector,
    /// Where the page title lives.
    title: Selector,
}

impl PageExtractor {
    /// Creates a new `PageExtractor` from the configured selectors.
    ///
    /// # Arguments
    ///
    /// * `selectors` - The page layout description from the crawl config.
    ///
    /// # Returns
    ///
    /// A new `PageExtractor`, or an error if any selector fails to parse.
    pub fn new(selectors: &PageSelectors) -> Result<Self> {
        Ok(Self {
            listing_marker: selectors.listing_url_marker.clone(),
            listing_group: parse_selector(&selectors.listing_group)?,
            link: parse_selector("a")?,
            content: parse_selector(&selectors.content)?,
            title: parse_selector(&selectors.title)?,
        })
    }

    /// Decides from the URL alone whether a page is a listing or a content page.
    pub fn classify(&self, url: &str) -> PageKind {
        if url.contains(self.listing_marker.as_str()) {
            PageKind::Listing
        } else {
            PageKind::Content
        }
    }

    /// Extracts every link inside the listing groups of a page.
    ///
    /// # Arguments
    ///
    /// * `html` - The page source.
    /// * `page_url` - The URL the page was fetched from, used to resolve relative links.
    ///
    /// # Returns
    ///
    /// The absolute URLs in document order. Duplicates are kept; the crawler's visited set handles them.
    #[instrument(skip(self, html), fields(html_length = html.len()))]
    pub fn extract_links(&self, html: &str, page_url: &str) -> Vec<String> {
        let base = match Url::parse(page_url) {
            Ok(url) => url,
            Err(_) => return Vec::new(),
        };

        let document = Html::parse_document(html);

        document
            .select(&self.listing_group)
            .flat_map(|group| group.select(&self.link))
            .filter_map(|link| link.value().attr("href"))
            .filter_map(|href| resolve_link(&base, href))
            .collect()
    }

    /// Extracts the record for a content page.
    ///
    /// # Arguments
    ///
    /// * `html` - The page source.
    /// * `url` - The URL the page was fetched from.
    ///
    /// # Returns
    ///
    /// `Some(RawDocument)` when the page has a content container, `None` otherwise.
    #[instrument(skip(self, html), fields(html_length = html.len()))]
    pub fn extract_document(&self, html: &str, url: &str) -> Option<RawDocument> {
        let document = Html::parse_document(html);

        let container = document.select(&self.content).next()?;
        let content = container.text().collect::<String>().trim().to_string();

        // Kept verbatim; the URL stands in only when there is no title element.
        let title = document
            .select(&self.title)
            .next()
            .map(|element| element.text().collect::<String>())
            .unwrap_or_else(|| url.to_string());

        Some(RawDocument {
            title,
            url: url.to_string(),
            content,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| DatasetError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Resolves a link (possibly relative) against the page it was found on.
///
/// Fragments and non-navigational schemes resolve to `None`.
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    base.join(href).ok().map(|url| url.to_string())
}
