//! Turns a loaded catalog page into ordered [`Record`]s.
//!
//! Field and item failures stay inside this module: a missing required field
//! drops that one item, a missing optional field becomes a sentinel. Only
//! browser-level errors propagate to the caller.

pub mod fields;

use std::time::Duration;

use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

use crate::browser::BrowserSession;
use crate::config::{Config, DelayRange, CONTENT_POLL_MS};
use crate::error::Result;
use crate::types::{Field, Record};

pub use fields::{policy_for, FieldPolicy, ListingSelectors};

pub struct Extractor {
    selectors: ListingSelectors,
    max_items: usize,
    content_wait: Duration,
    item_pause: DelayRange,
}

impl Extractor {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            selectors: ListingSelectors::compile(&cfg.selectors)?,
            max_items: cfg.max_items,
            content_wait: cfg.content_wait,
            item_pause: cfg.pacing.item_pause,
        })
    }

    /// Extract up to `max_items` records from the page currently loaded in `session`.
    ///
    /// Returns an empty list when the listing container never shows up.
    pub async fn extract(&self, session: &mut dyn BrowserSession) -> Result<Vec<Record>> {
        if !self.wait_for_container(session).await? {
            warn!(
                selector = %self.selectors.container,
                "Listing container not found within {:?}",
                self.content_wait
            );
            return Ok(Vec::new());
        }

        let html = session.page_html().await?;
        let candidates = self.candidates(&html);
        debug!("Found {} candidate items", candidates.len());

        let total = candidates.len();
        let mut records = Vec::with_capacity(total);
        for (idx, candidate) in candidates.into_iter().enumerate() {
            if idx > 0 {
                self.item_pause.sleep().await;
            }
            match candidate {
                Some(record) => records.push(record),
                None => debug!(item = idx, "Skipping item with a missing required field"),
            }
        }

        info!("Extracted {}/{} items", records.len(), total);
        Ok(records)
    }

    /// One entry per item element in document order, capped at `max_items`.
    /// `None` marks an item with a missing required field.
    ///
    /// The parsed document is not `Send`, so it lives only inside this call.
    fn candidates(&self, html: &str) -> Vec<Option<Record>> {
        let doc = Html::parse_document(html);
        let candidates = doc
            .select(&self.selectors.item)
            .take(self.max_items)
            .map(|item| self.extract_item(item))
            .collect();
        candidates
    }

    /// Build a record from one item element, or `None` if a required field is missing.
    fn extract_item(&self, item: ElementRef<'_>) -> Option<Record> {
        let field = |f: Field| policy_for(f).resolve(self.selectors.locate(item, f));

        Some(Record {
            name: field(Field::Name)?,
            price: field(Field::Price)?,
            rating: field(Field::Rating)?,
            sold: field(Field::Sold)?,
            location: field(Field::Location)?,
        })
    }

    async fn wait_for_container(&self, session: &mut dyn BrowserSession) -> Result<bool> {
        let selector = self.selectors.container.as_str();
        match tokio::time::timeout(self.content_wait, poll_until_present(session, selector)).await {
            Ok(found) => found,
            Err(_) => Ok(false),
        }
    }
}

async fn poll_until_present(session: &mut dyn BrowserSession, selector: &str) -> Result<bool> {
    let poll = Duration::from_millis(CONTENT_POLL_MS);
    loop {
        if session.is_present(selector).await? {
            return Ok(true);
        }
        tokio::time::sleep(poll).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{item_html, listing_page, FakeAgent, FakePage};
    use crate::browser::{BrowserAgent, SessionManager, SessionProfile};
    use crate::config::{Pacing, SelectorConfig};
    use crate::types::{SENTINEL_MISSING, SENTINEL_UNSET};

    fn test_config() -> Config {
        Config {
            pacing: Pacing::immediate(),
            content_wait: Duration::from_millis(50),
            ..Config::default()
        }
    }

    impl Extractor {
        fn parse_listing(&self, html: &str) -> Vec<Record> {
            self.candidates(html).into_iter().flatten().collect()
        }
    }

    fn full_item(name: &str) -> String {
        item_html(
            Some(name),
            Some("$12.90"),
            Some("4.5 (123)"),
            Some("1.2k sold"),
            Some("Singapore"),
        )
    }

    #[test]
    fn parses_all_fields() {
        let extractor = Extractor::new(&test_config()).unwrap();
        let records = extractor.parse_listing(&listing_page(&[full_item("USB-C Cable")]));
        assert_eq!(
            records,
            vec![Record {
                name: "USB-C Cable".to_string(),
                price: "$12.90".to_string(),
                rating: "4.5 (123)".to_string(),
                sold: "1.2k sold".to_string(),
                location: "Singapore".to_string(),
            }]
        );
    }

    #[test]
    fn missing_optional_fields_degrade_to_sentinel() {
        let extractor = Extractor::new(&test_config()).unwrap();
        let page = listing_page(&[item_html(Some("Mouse"), Some("$5"), None, None, None)]);
        let records = extractor.parse_listing(&page);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rating, SENTINEL_MISSING);
        assert_eq!(records[0].sold, SENTINEL_MISSING);
        assert_eq!(records[0].location, SENTINEL_MISSING);
    }

    #[test]
    fn missing_required_field_skips_only_that_item() {
        let extractor = Extractor::new(&test_config()).unwrap();
        let page = listing_page(&[
            full_item("First"),
            item_html(None, Some("$1"), None, None, None),
            item_html(Some("No price"), None, Some("5"), None, None),
            full_item("Last"),
        ]);
        let names: Vec<_> = extractor
            .parse_listing(&page)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["First", "Last"]);
    }

    #[test]
    fn respects_candidate_cap() {
        let cfg = Config { max_items: 3, ..test_config() };
        let extractor = Extractor::new(&cfg).unwrap();
        let items: Vec<_> = (0..10).map(|i| full_item(&format!("Item {i}"))).collect();
        let records = extractor.parse_listing(&listing_page(&items));
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].name, "Item 2");
    }

    #[test]
    fn extracted_records_are_well_formed() {
        let extractor = Extractor::new(&test_config()).unwrap();
        let page = listing_page(&[
            full_item("  Padded   name  "),
            item_html(Some("A"), Some("$1"), Some("   "), None, Some(" SG ")),
        ]);
        let records = extractor.parse_listing(&page);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Padded name");
        assert_eq!(records[1].rating, SENTINEL_MISSING);
        assert_eq!(records[1].location, "SG");
        for r in &records {
            assert!(r.is_well_formed(), "{r:?}");
            assert!(r.fields().iter().all(|(_, v)| *v != SENTINEL_UNSET));
        }
    }

    #[test]
    fn table_row_items_keep_their_cells() {
        let cfg = Config {
            selectors: SelectorConfig {
                container: "table.listing".to_string(),
                item: "tr.item".to_string(),
                name: "td.name".to_string(),
                price: "td.price".to_string(),
                rating: "td.rating".to_string(),
                rating_star: "td.star".to_string(),
                review_count: "td.reviews".to_string(),
                sold: "td.sold".to_string(),
                location: "td.location".to_string(),
            },
            ..test_config()
        };
        let extractor = Extractor::new(&cfg).unwrap();
        let page = r#"<html><body><table class="listing">
            <tr class="item"><td class="name">A</td><td class="price">$1</td></tr>
            <tr class="item"><td class="name">B</td><td class="price">$2</td><td class="sold">3 sold</td></tr>
        </table></body></html>"#;

        let records = extractor.parse_listing(page);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "A");
        assert_eq!(records[0].price, "$1");
        assert_eq!(records[0].sold, SENTINEL_MISSING);
        assert_eq!(records[1].sold, "3 sold");
    }

    #[tokio::test]
    async fn absent_container_yields_empty() {
        let extractor = Extractor::new(&test_config()).unwrap();
        let agent = FakeAgent::new(vec![FakePage::Missing]);
        let manager = SessionManager::new(agent, Duration::from_secs(30));
        let mut guard = manager.open().await.unwrap();
        let records = extractor.extract(guard.session()).await.unwrap();
        assert!(records.is_empty());
        guard.release().await;
    }

    #[tokio::test]
    async fn extracts_from_live_session() {
        let extractor = Extractor::new(&test_config()).unwrap();
        let agent = FakeAgent::new(vec![FakePage::Html(listing_page(&[
            full_item("A"),
            full_item("B"),
        ]))]);
        let profile = SessionProfile {
            user_agent: "test-agent".to_string(),
            stealth_script: String::new(),
            page_load_timeout: Duration::from_secs(30),
            window_size: (1920, 1080),
        };
        let mut session = agent.launch(&profile).await.unwrap();
        let records = extractor.extract(session.as_mut()).await.unwrap();
        assert_eq!(records.len(), 2);
        session.close().await.unwrap();
    }
}
