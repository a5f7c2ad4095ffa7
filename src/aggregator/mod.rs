//! Run-level statistics over the collected records.

pub mod correlation;
pub mod summary;

use std::collections::HashMap;

use crate::config::TOP_N;
use crate::normalizer::normalize_all;
use crate::types::{NormalizedRecord, Record};

pub use correlation::{CorrelationMatrix, Metric};
pub use summary::MetricSummary;

/// A top-seller entry: the raw record plus the sales figure it was ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord {
    pub record: Record,
    pub sold_value: i64,
}

/// Raw location strings with their counts, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocationDistribution {
    pub entries: Vec<(String, usize)>,
}

impl LocationDistribution {
    /// Ties keep the order in which locations were first seen.
    pub fn from_records(records: &[Record]) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut entries: Vec<(String, usize)> = Vec::new();
        for r in records {
            match index.get(r.location.as_str()) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(r.location.as_str(), entries.len());
                    entries.push((r.location.clone(), 1));
                }
            }
        }
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsReport {
    /// Local time, `%Y-%m-%d %H:%M:%S`.
    pub analysis_date: String,
    pub total_count: usize,
    pub price: MetricSummary,
    pub rating: MetricSummary,
    pub sales: MetricSummary,
    pub correlations: CorrelationMatrix,
    pub top_selling: Vec<RankedRecord>,
    pub locations: LocationDistribution,
}

/// Aggregate `records`, stamped with the current local time.
pub fn aggregate(records: &[Record]) -> StatsReport {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    aggregate_at(records, now)
}

pub fn aggregate_at(records: &[Record], analysis_date: String) -> StatsReport {
    let normalized = normalize_all(records);
    let column = |m: Metric| -> Vec<f64> { normalized.iter().filter_map(|r| m.value(r)).collect() };

    StatsReport {
        analysis_date,
        total_count: records.len(),
        price: MetricSummary::from_values(&column(Metric::Price)),
        rating: MetricSummary::from_values(&column(Metric::Rating)),
        sales: MetricSummary::from_values(&column(Metric::Sold)),
        correlations: CorrelationMatrix::compute(&normalized),
        top_selling: top_selling(records, &normalized, TOP_N),
        locations: LocationDistribution::from_records(records),
    }
}

/// Highest `sold_value` first; equal sales keep insertion order.
pub fn top_selling(records: &[Record], normalized: &[NormalizedRecord], n: usize) -> Vec<RankedRecord> {
    let mut ranked: Vec<RankedRecord> = records
        .iter()
        .zip(normalized)
        .map(|(record, norm)| RankedRecord {
            record: record.clone(),
            sold_value: norm.sold_value,
        })
        .collect();
    ranked.sort_by(|a, b| b.sold_value.cmp(&a.sold_value));
    ranked.truncate(n);
    ranked
}
