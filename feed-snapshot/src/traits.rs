use crate::types::Result;
use async_trait::async_trait;

/// Transport that retrieves a raw feed document.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Fetch the document at `url`. Non-2xx responses are errors carrying
    /// the status code.
    async fn fetch_xml(&self, url: &str) -> Result<String>;
}

/// Single-shot machine translation. Retry policy lives in the caller.
#[async_trait]
pub trait TranslationClient: Send + Sync {
    async fn translate_once(&self, text: &str, target_lang: &str) -> Result<String>;
}
