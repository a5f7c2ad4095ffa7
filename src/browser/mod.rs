//! Browser seam.
//!
//! The scraper only needs a handful of capabilities from a browser: launch a
//! disposable session, navigate, check whether a selector matches, and snapshot
//! the rendered HTML. `BrowserAgent`/`BrowserSession` capture exactly that so the
//! acquisition logic can run against Chromium or a scripted fake.

pub mod chromium;
pub mod session;

#[cfg(test)]
pub(crate) mod fake;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use session::{SessionGuard, SessionManager};

/// Identity pool a session's user agent is drawn from.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
];

/// Runs before any page script on every new document. Hides the usual
/// automation tells that bot-detection scripts probe for.
pub const STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
window.chrome = window.chrome || { runtime: {} };
"#;

/// Launch parameters for one session.
#[derive(Debug, Clone)]
pub struct SessionProfile {
    pub user_agent: String,
    pub stealth_script: String,
    pub page_load_timeout: Duration,
    pub window_size: (u32, u32),
}

/// Something that can start fresh, isolated browser sessions.
#[async_trait]
pub trait BrowserAgent: Send + Sync {
    /// Start a session configured by `profile`. Failures surface as
    /// [`AppError::SessionSetup`](crate::error::AppError::SessionSetup).
    async fn launch(&self, profile: &SessionProfile) -> Result<Box<dyn BrowserSession>>;
}

/// One live browser session.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;
    /// Whether `selector` currently matches at least one element.
    async fn is_present(&mut self, selector: &str) -> Result<bool>;
    /// The rendered document as HTML.
    async fn page_html(&mut self) -> Result<String>;
    async fn close(self: Box<Self>) -> Result<()>;
}
