pub mod types;
pub mod config;
pub mod rss_utils;
pub mod traits;
pub mod domain_limiter;
pub mod runner;
pub mod parser;
pub mod fetcher;
pub mod translator;
pub mod pipeline;
pub mod snapshot;

pub use types::*;
pub use config::Cli;
pub use domain_limiter::{DomainLimiter, DomainPermit};
pub use runner::BoundedRunner;
pub use parser::FeedParser;
pub use fetcher::{Fetcher, HttpFeedClient};
pub use translator::{GoogleTranslateClient, Progress, TranslationReport, Translator};
pub use pipeline::{CategoryOutcome, RunReport, SnapshotPipeline};
pub use snapshot::load_sources;
pub use traits::{FeedClient, TranslationClient};
