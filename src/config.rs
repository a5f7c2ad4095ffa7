use std::time::Duration;

use rand::Rng;

use crate::error::{AppError, Result};

pub const SEARCH_URL_TEMPLATE: &str = "https://www.lazada.sg/catalog/?q={query}";
pub const DEFAULT_SEARCH_TERMS: &[&str] = &["laptop", "wireless earbuds", "mechanical keyboard"];

pub const OUTPUT_DIR: &str = "analysis_results";
pub const RECORDS_FILE: &str = "lazada_products.json";
pub const STATISTICS_FILE: &str = "statistics.json";
pub const REPORT_FILE: &str = "analysis_report.txt";

/// Attempts per search term before it is given up on.
pub const MAX_RETRIES: u32 = 3;

/// Maximum listing items considered per page load.
pub const MAX_ITEMS_PER_PAGE: usize = 30;

/// Hard bound on a single page load. A hung load becomes a retryable failure.
pub const NAVIGATION_TIMEOUT_SECS: u64 = 30;

/// How long the extractor waits for the listing container to appear.
pub const CONTENT_WAIT_SECS: u64 = 10;

/// Poll interval while waiting for the listing container.
pub const CONTENT_POLL_MS: u64 = 250;

/// Entries in the ranked top-sellers list.
pub const TOP_N: usize = 5;

/// Randomized delays, in milliseconds, used to pace requests against bot detection.
pub mod pacing {
    pub const DWELL_MIN_MS: u64 = 10_000;
    pub const DWELL_MAX_MS: u64 = 15_000;
    pub const BACKOFF_MIN_MS: u64 = 5_000;
    pub const BACKOFF_MAX_MS: u64 = 10_000;
    pub const ITEM_PAUSE_MIN_MS: u64 = 200;
    pub const ITEM_PAUSE_MAX_MS: u64 = 500;
}

/// CSS selectors for the catalog's listing markup.
pub mod selectors {
    pub const CONTAINER: &str = r#"div[data-qa-locator="general-products"]"#;
    pub const ITEM: &str = r#"div[data-qa-locator="product-item"]"#;
    pub const NAME: &str = "div.RfADt a";
    pub const PRICE: &str = "span.ooOxS";
    pub const RATING: &str = "span.rating-text";
    pub const RATING_STAR: &str = "i._9-ogB.Dy1nx";
    pub const REVIEW_COUNT: &str = "span.qzqFw";
    pub const SOLD: &str = "span._1cEkb";
    pub const LOCATION: &str = "span.oa6ri";
}

/// Inclusive range a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms),
        }
    }

    pub const ZERO: DelayRange = DelayRange::from_millis(0, 0);

    pub fn sample(&self) -> Duration {
        let lo = self.min.as_millis() as u64;
        let hi = (self.max.as_millis() as u64).max(lo);
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }

    pub async fn sleep(&self) {
        let d = self.sample();
        if !d.is_zero() {
            tokio::time::sleep(d).await;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Settle time after navigation so dynamic content can render.
    pub dwell: DelayRange,
    /// Pause between failed attempts on the same term.
    pub backoff: DelayRange,
    /// Pause between consecutive listing items.
    pub item_pause: DelayRange,
}

impl Default for Pacing {
    fn default() -> Self {
        use pacing::*;
        Self {
            dwell: DelayRange::from_millis(DWELL_MIN_MS, DWELL_MAX_MS),
            backoff: DelayRange::from_millis(BACKOFF_MIN_MS, BACKOFF_MAX_MS),
            item_pause: DelayRange::from_millis(ITEM_PAUSE_MIN_MS, ITEM_PAUSE_MAX_MS),
        }
    }
}

impl Pacing {
    /// No waiting at all. Used when driving a fake browser.
    pub fn immediate() -> Self {
        Self {
            dwell: DelayRange::ZERO,
            backoff: DelayRange::ZERO,
            item_pause: DelayRange::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    pub container: String,
    pub item: String,
    pub name: String,
    pub price: String,
    pub rating: String,
    pub rating_star: String,
    pub review_count: String,
    pub sold: String,
    pub location: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: selectors::CONTAINER.to_string(),
            item: selectors::ITEM.to_string(),
            name: selectors::NAME.to_string(),
            price: selectors::PRICE.to_string(),
            rating: selectors::RATING.to_string(),
            rating_star: selectors::RATING_STAR.to_string(),
            review_count: selectors::REVIEW_COUNT.to_string(),
            sold: selectors::SOLD.to_string(),
            location: selectors::LOCATION.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Ordered search terms, one acquisition sequence each (SEARCH_TERMS, comma-separated)
    pub search_terms: Vec<String>,
    /// Catalog URL with a `{query}` placeholder (SEARCH_URL_TEMPLATE)
    pub search_url_template: String,
    pub log_level: String,
    /// Directory for all exported artifacts (OUTPUT_DIR)
    pub output_dir: String,
    /// Raw record export file name inside `output_dir` (RECORDS_FILE)
    pub records_file: String,
    /// Explicit Chrome/Chromium binary (CHROME_PATH). Falls back to PATH lookup.
    pub chrome_path: Option<String>,
    /// Attempts per term (MAX_RETRIES)
    pub max_retries: u32,
    /// Candidate cap per page (MAX_ITEMS)
    pub max_items: usize,
    pub navigation_timeout: Duration,
    pub content_wait: Duration,
    pub pacing: Pacing,
    pub selectors: SelectorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_terms: DEFAULT_SEARCH_TERMS.iter().map(|s| s.to_string()).collect(),
            search_url_template: SEARCH_URL_TEMPLATE.to_string(),
            log_level: "info".to_string(),
            output_dir: OUTPUT_DIR.to_string(),
            records_file: RECORDS_FILE.to_string(),
            chrome_path: None,
            max_retries: MAX_RETRIES,
            max_items: MAX_ITEMS_PER_PAGE,
            navigation_timeout: Duration::from_secs(NAVIGATION_TIMEOUT_SECS),
            content_wait: Duration::from_secs(CONTENT_WAIT_SECS),
            pacing: Pacing::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let search_terms = match std::env::var("SEARCH_TERMS") {
            Ok(raw) => parse_terms(&raw),
            Err(_) => defaults.search_terms,
        };

        let search_url_template = std::env::var("SEARCH_URL_TEMPLATE")
            .unwrap_or_else(|_| SEARCH_URL_TEMPLATE.to_string());
        if !search_url_template.contains("{query}") {
            return Err(AppError::Config(
                "SEARCH_URL_TEMPLATE must contain a {query} placeholder".to_string(),
            ));
        }

        let max_retries = std::env::var("MAX_RETRIES")
            .unwrap_or_else(|_| MAX_RETRIES.to_string())
            .parse::<u32>()
            .map_err(|_| AppError::Config("MAX_RETRIES must be a positive integer".to_string()))?;
        if max_retries == 0 {
            return Err(AppError::Config("MAX_RETRIES must be at least 1".to_string()));
        }

        Ok(Self {
            search_terms,
            search_url_template,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or_else(|_| OUTPUT_DIR.to_string()),
            records_file: std::env::var("RECORDS_FILE")
                .unwrap_or_else(|_| RECORDS_FILE.to_string()),
            chrome_path: std::env::var("CHROME_PATH").ok().filter(|p| !p.is_empty()),
            max_retries,
            max_items: parse_max_items(std::env::var("MAX_ITEMS").ok())?,
            ..defaults
        })
    }

    /// Catalog URL for one search term, with the term form-encoded into the template.
    pub fn search_url(&self, term: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
        self.search_url_template.replace("{query}", &encoded)
    }

    pub fn records_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.output_dir).join(&self.records_file)
    }
}

/// Unset or unparsable falls back to the default; zero is rejected because no
/// attempt could ever yield a record.
fn parse_max_items(raw: Option<String>) -> Result<usize> {
    let max_items = raw
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(MAX_ITEMS_PER_PAGE);
    if max_items == 0 {
        return Err(AppError::Config("MAX_ITEMS must be at least 1".to_string()));
    }
    Ok(max_items)
}

fn parse_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
