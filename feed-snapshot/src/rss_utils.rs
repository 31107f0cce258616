//! Feed-specific helpers shared by the fetcher, parser and pipeline

/// URL utilities for feed sources
pub mod url {
    use url::Url;

    /// Hostname used as the per-domain admission key. Falls back to the raw
    /// string when the URL does not parse or has no host.
    pub fn extract_domain(url_str: &str) -> String {
        Url::parse(url_str)
            .ok()
            .and_then(|url| url.host_str().map(|h| h.to_string()))
            .unwrap_or_else(|| url_str.to_string())
    }
}

/// Publish-date handling for ranking items
pub mod time {
    use chrono::{DateTime, NaiveDate, Utc};

    /// Parse the date formats feeds and the snapshot use: RFC 3339,
    /// RFC 2822 and bare `YYYY-MM-DD` (midnight UTC).
    pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Sort key in milliseconds; missing or unparsable dates map to 0.
    pub fn sort_key_millis(raw: &str) -> i64 {
        parse_pub_date(raw)
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(0)
    }
}

/// Retry delay schedules
pub mod retry {
    use backoff::{exponential::ExponentialBackoff, SystemClock};
    use std::time::Duration;

    /// `base`, `2*base`, `4*base`, ... with jitter disabled and no overall
    /// deadline; the caller bounds the number of retries.
    pub fn doubling_schedule(base: Duration, max_retries: u32) -> ExponentialBackoff<SystemClock> {
        ExponentialBackoff {
            current_interval: base,
            initial_interval: base,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: base.saturating_mul(2u32.saturating_pow(max_retries)),
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Text cleanup for item descriptions
pub mod text {
    /// Extract clean text content from HTML
    pub fn extract_text_from_html(html: &str) -> String {
        let stripped = html
            .chars()
            .fold((String::new(), false), |(mut text, in_tag), c| match c {
                '<' => (text, true),
                '>' if in_tag => {
                    text.push(' ');
                    (text, false)
                }
                _ if !in_tag => {
                    text.push(c);
                    (text, in_tag)
                }
                _ => (text, in_tag),
            })
            .0;

        html_escape::decode_html_entities(&stripped)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Cut to at most `max_chars` characters, never splitting a code point.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => text[..byte_idx].to_string(),
            None => text.to_string(),
        }
    }
}
