use crate::rss_utils::text::{extract_text_from_html, truncate_chars};
use crate::types::{AggregatorError, FeedItem, FetchConfig, Result, Source};
use feed_rs::parser;
use tracing::debug;

/// Turns a raw RSS/Atom document into normalized feed items.
#[derive(Debug, Clone)]
pub struct FeedParser {
    max_items: usize,
    max_description_chars: usize,
}

impl FeedParser {
    pub fn new(max_items: usize, max_description_chars: usize) -> Self {
        Self {
            max_items,
            max_description_chars,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.max_items_per_feed, config.max_description_chars)
    }

    /// Parse `content` and normalize at most `max_items` entries, each tagged
    /// with the originating source's name.
    pub fn parse_items(&self, content: &str, source: &Source) -> Result<Vec<FeedItem>> {
        debug!("Parsing feed content for {} ({} bytes)", source.name, content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        let items: Vec<FeedItem> = feed
            .entries
            .into_iter()
            .take(self.max_items)
            .map(|entry| self.normalize_entry(entry, &source.name))
            .collect();

        debug!("Parsed {} items from {}", items.len(), source.name);
        Ok(items)
    }

    fn normalize_entry(&self, entry: feed_rs::model::Entry, source_name: &str) -> FeedItem {
        let title = entry
            .title
            .map(|t| t.content.trim().to_string())
            .unwrap_or_default();

        let link = entry
            .links
            .into_iter()
            .next()
            .map(|l| l.href)
            .unwrap_or_default();

        // Prefer the summary; fall back to the full content body.
        let raw_description = entry
            .summary
            .map(|s| s.content)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();
        let description = truncate_chars(
            &extract_text_from_html(&raw_description),
            self.max_description_chars,
        );

        let pub_date = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();

        FeedItem {
            title,
            link,
            description,
            pub_date,
            source: source_name.to_string(),
            title_translated: None,
            description_translated: None,
        }
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}
