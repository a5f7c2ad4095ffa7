//! Chromium-backed [`BrowserAgent`] using chromiumoxide.

use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{BrowserAgent, BrowserSession, SessionProfile};
use crate::error::{AppError, Result};

/// Launches one headless Chromium process per session.
pub struct ChromiumAgent {
    chrome_path: Option<PathBuf>,
}

impl ChromiumAgent {
    /// `chrome_path` of `None` lets chromiumoxide locate the binary itself.
    pub fn new(chrome_path: Option<String>) -> Self {
        Self {
            chrome_path: chrome_path.map(PathBuf::from),
        }
    }
}

#[async_trait]
impl BrowserAgent for ChromiumAgent {
    async fn launch(&self, profile: &SessionProfile) -> Result<Box<dyn BrowserSession>> {
        let (width, height) = profile.window_size;
        let mut builder = BrowserConfig::builder()
            .request_timeout(profile.page_load_timeout)
            .window_size(width, height)
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--disable-extensions")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={}", profile.user_agent));
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| AppError::SessionSetup(format!("browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::SessionSetup(format!("failed to launch Chromium: {e}")))?;

        let handler = HandlerTask(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        }));

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::SessionSetup(format!("failed to open page: {e}")))?;

        page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(
            profile.stealth_script.clone(),
        ))
        .await
        .map_err(|e| AppError::SessionSetup(format!("failed to inject stealth script: {e}")))?;

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            _handler: handler,
        }))
    }
}

/// Aborts the CDP event loop when the session goes away.
struct HandlerTask(JoinHandle<()>);

impl Drop for HandlerTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    _handler: HandlerTask,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| AppError::Navigation(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn is_present(&mut self, selector: &str) -> Result<bool> {
        let script = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        let found: bool = self
            .page
            .evaluate(script)
            .await?
            .into_value()
            .map_err(|e| AppError::Browser(format!("unexpected presence result: {e:?}")))?;
        Ok(found)
    }

    async fn page_html(&mut self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumSession { mut browser, page, _handler } = *self;
        if let Err(e) = page.close().await {
            debug!("page close failed: {e}");
        }
        browser.close().await?;
        if let Err(e) = browser.wait().await {
            debug!("browser wait failed: {e}");
        }
        Ok(())
    }
}
