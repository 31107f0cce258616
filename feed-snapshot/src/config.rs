use crate::types::{
    FetchConfig, TranslateConfig, CONCURRENCY, DEFAULT_TARGET_LANG, DOMAIN_CONCURRENCY,
    TRANSLATE_CONCURRENCY,
};
use clap::Parser;
use std::path::PathBuf;

/// Command line for one snapshot run. Every flag can also come from the
/// environment (or a `.env` file).
#[derive(Debug, Clone, Parser)]
#[command(name = "feed-snapshot")]
#[command(about = "Fetch feeds by category, translate them and write one snapshot document")]
#[command(version)]
pub struct Cli {
    /// Sources file: { categories: [{ name, key, sources: [{ name, url }] }] }
    #[arg(long, env = "FEED_SNAPSHOT_SOURCES", default_value = "src/assets/sources.json")]
    pub sources: PathBuf,

    /// Where the snapshot JSON is written (overwritten each run)
    #[arg(long, env = "FEED_SNAPSHOT_OUTPUT", default_value = "public/feed-data/all-feeds.json")]
    pub output: PathBuf,

    /// Target language code for translations
    #[arg(long, env = "FEED_SNAPSHOT_TARGET_LANG", default_value = DEFAULT_TARGET_LANG)]
    pub target_lang: String,

    /// Feeds fetched at once across all domains
    #[arg(long, env = "FEED_SNAPSHOT_CONCURRENCY", default_value_t = CONCURRENCY)]
    pub concurrency: usize,

    /// Feeds fetched at once from a single domain
    #[arg(long, env = "FEED_SNAPSHOT_DOMAIN_CONCURRENCY", default_value_t = DOMAIN_CONCURRENCY)]
    pub domain_concurrency: usize,

    /// Translation requests in flight at once
    #[arg(long, env = "FEED_SNAPSHOT_TRANSLATE_CONCURRENCY", default_value_t = TRANSLATE_CONCURRENCY)]
    pub translate_concurrency: usize,

    /// Write the snapshot without translated fields
    #[arg(long, env = "FEED_SNAPSHOT_SKIP_TRANSLATION")]
    pub skip_translation: bool,
}

impl Cli {
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            concurrency: self.concurrency,
            domain_concurrency: self.domain_concurrency,
            ..FetchConfig::default()
        }
    }

    pub fn translate_config(&self) -> TranslateConfig {
        TranslateConfig {
            target_lang: self.target_lang.clone(),
            concurrency: self.translate_concurrency,
            ..TranslateConfig::default()
        }
    }
}
