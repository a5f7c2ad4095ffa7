use scraper::{ElementRef, Selector};

use crate::config::SelectorConfig;
use crate::error::{AppError, Result};
use crate::types::{Field, SENTINEL_MISSING};

/// How an item reacts when a field's locator comes back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// The whole item is dropped.
    Required,
    /// The field degrades to [`SENTINEL_MISSING`].
    Optional,
}

impl FieldPolicy {
    /// `None` means the item must be skipped.
    pub fn resolve(self, located: Option<String>) -> Option<String> {
        match (located, self) {
            (Some(v), _) => Some(v),
            (None, FieldPolicy::Required) => None,
            (None, FieldPolicy::Optional) => Some(SENTINEL_MISSING.to_string()),
        }
    }
}

pub fn policy_for(field: Field) -> FieldPolicy {
    match field {
        Field::Name | Field::Price => FieldPolicy::Required,
        Field::Rating | Field::Sold | Field::Location => FieldPolicy::Optional,
    }
}

/// Parsed form of [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    /// Kept as text; presence is checked by the browser, not by `scraper`.
    pub container: String,
    pub item: Selector,
    pub name: Selector,
    pub price: Selector,
    pub rating: Selector,
    pub rating_star: Selector,
    pub review_count: Selector,
    pub sold: Selector,
    pub location: Selector,
}

impl ListingSelectors {
    pub fn compile(cfg: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            container: cfg.container.clone(),
            item: compile(&cfg.item)?,
            name: compile(&cfg.name)?,
            price: compile(&cfg.price)?,
            rating: compile(&cfg.rating)?,
            rating_star: compile(&cfg.rating_star)?,
            review_count: compile(&cfg.review_count)?,
            sold: compile(&cfg.sold)?,
            location: compile(&cfg.location)?,
        })
    }

    /// Locate one field inside an item element.
    pub fn locate(&self, item: ElementRef<'_>, field: Field) -> Option<String> {
        match field {
            Field::Name => first_text(item, &self.name),
            Field::Price => first_text(item, &self.price),
            Field::Rating => {
                first_text(item, &self.rating).or_else(|| self.rating_from_stars(item))
            }
            Field::Sold => first_text(item, &self.sold),
            Field::Location => first_text(item, &self.location),
        }
    }

    /// Star widgets carry no text, so the rating is rebuilt from the number of
    /// filled stars plus the review count when one is shown, e.g. `"4 (87)"`.
    fn rating_from_stars(&self, item: ElementRef<'_>) -> Option<String> {
        let stars = item.select(&self.rating_star).count();
        if stars == 0 {
            return None;
        }
        match first_text(item, &self.review_count) {
            Some(reviews) => Some(format!("{stars} {reviews}")),
            None => Some(stars.to_string()),
        }
    }
}

fn compile(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|e| AppError::Config(format!("invalid selector {raw:?}: {e}")))
}

/// Text of the first match with non-blank content, whitespace collapsed.
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .map(|el| collapse_whitespace(el.text()))
        .find(|t| !t.is_empty())
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
