//! Scripted in-memory browser used by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{BrowserAgent, BrowserSession, SessionProfile};
use crate::error::{AppError, Result};

/// What the n-th launched session does. The last entry repeats once the script runs out.
#[derive(Debug, Clone)]
pub enum FakePage {
    /// The agent cannot start a session at all.
    LaunchFails,
    /// Navigation never completes.
    Hangs,
    /// Page loads but the listing container never appears.
    Missing,
    /// Page loads with this HTML; the container is considered present.
    Html(String),
}

pub struct FakeAgent {
    script: Vec<FakePage>,
    launches: AtomicUsize,
    closes: Arc<AtomicUsize>,
    profiles: Mutex<Vec<SessionProfile>>,
}

impl FakeAgent {
    pub fn new(script: Vec<FakePage>) -> Self {
        Self {
            script,
            launches: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            profiles: Mutex::new(Vec::new()),
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn profiles(&self) -> Vec<SessionProfile> {
        self.profiles.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserAgent for FakeAgent {
    async fn launch(&self, profile: &SessionProfile) -> Result<Box<dyn BrowserSession>> {
        let n = self.launches.fetch_add(1, Ordering::SeqCst);
        self.profiles.lock().unwrap().push(profile.clone());
        let page = self
            .script
            .get(n)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or(FakePage::Missing);
        if let FakePage::LaunchFails = page {
            return Err(AppError::SessionSetup("fake launch failure".to_string()));
        }
        Ok(Box::new(FakeSession {
            page,
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct FakeSession {
    page: FakePage,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, _url: &str) -> Result<()> {
        if let FakePage::Hangs = self.page {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn is_present(&mut self, _selector: &str) -> Result<bool> {
        Ok(matches!(self.page, FakePage::Html(_)))
    }

    async fn page_html(&mut self) -> Result<String> {
        match &self.page {
            FakePage::Html(html) => Ok(html.clone()),
            _ => Ok("<html><body></body></html>".to_string()),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// One listing item in the default catalog markup. `None` leaves the field out.
pub fn item_html(
    name: Option<&str>,
    price: Option<&str>,
    rating: Option<&str>,
    sold: Option<&str>,
    location: Option<&str>,
) -> String {
    let mut out = String::from(r#"<div data-qa-locator="product-item">"#);
    if let Some(n) = name {
        out.push_str(&format!(r#"<div class="RfADt"><a href="/p/1">{n}</a></div>"#));
    }
    if let Some(p) = price {
        out.push_str(&format!(r#"<span class="ooOxS">{p}</span>"#));
    }
    if let Some(r) = rating {
        out.push_str(&format!(r#"<span class="rating-text">{r}</span>"#));
    }
    if let Some(s) = sold {
        out.push_str(&format!(r#"<span class="_1cEkb">{s}</span>"#));
    }
    if let Some(l) = location {
        out.push_str(&format!(r#"<span class="oa6ri">{l}</span>"#));
    }
    out.push_str("</div>");
    out
}

/// Full page wrapping `items` in the listing container.
pub fn listing_page(items: &[String]) -> String {
    format!(
        r#"<html><body><div data-qa-locator="general-products">{}</div></body></html>"#,
        items.concat()
    )
}
