//! Text → number conversions for scraped fields.
//!
//! Every function is total: unparsable input maps to `None` (price, rating) or
//! `0` (sold), never to an error.

use crate::types::{NormalizedRecord, Record, SENTINEL_MISSING};

pub fn normalize(record: &Record) -> NormalizedRecord {
    NormalizedRecord {
        price_value: parse_price(&record.price),
        rating_value: parse_rating(&record.rating),
        sold_value: parse_sold(&record.sold),
    }
}

pub fn normalize_all(records: &[Record]) -> Vec<NormalizedRecord> {
    records.iter().map(normalize).collect()
}

/// `"$1,234.50"` → `1234.5`. Accepts a leading currency symbol or code (`S$`, `RM`).
pub fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw
        .trim()
        .trim_start_matches(|c: char| c.is_alphabetic() || is_currency_symbol(c))
        .trim();
    let cleaned: String = trimmed.chars().filter(|&c| c != ',').collect();
    parse_finite(&cleaned)
}

/// `"4.5 (123)"` → `4.5`.
pub fn parse_rating(raw: &str) -> Option<f64> {
    if raw == SENTINEL_MISSING {
        return None;
    }
    raw.split_whitespace().next().and_then(parse_finite)
}

/// `"1.2k sold"` → `1200`, `"58 sold"` → `58`, anything else → `0`.
pub fn parse_sold(raw: &str) -> i64 {
    if raw == SENTINEL_MISSING {
        return 0;
    }
    let lower = raw.to_lowercase();
    if let Some(idx) = lower.find('k') {
        return parse_finite(lower[..idx].trim())
            .map(|v| (v * 1000.0).round())
            .filter(|v| v.abs() < i64::MAX as f64)
            .map(|v| v as i64)
            .unwrap_or(0);
    }
    let digits: String = lower.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().unwrap_or(0)
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_currency_symbol(c: char) -> bool {
    matches!(c, '$' | '€' | '£' | '¥' | '₱' | '₫' | '฿' | '₩' | '₹')
}
