use tracing::info;

use crate::types::{Record, TermOutcome};

/// Ordered accumulation of records across search terms.
///
/// Each term's acquisition hands back its own [`TermOutcome`]; the caller merges
/// them here in term order. Duplicates across terms are kept.
#[derive(Debug, Default)]
pub struct Collector {
    records: Vec<Record>,
    merges: usize,
    failed_terms: Vec<String>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, outcome: TermOutcome) {
        if outcome.records.is_empty() {
            self.failed_terms.push(outcome.term);
            return;
        }
        info!(
            term = %outcome.term,
            added = outcome.records.len(),
            total = self.records.len() + outcome.records.len(),
            "Merged term results"
        );
        self.records.extend(outcome.records);
        self.merges += 1;
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of terms that contributed at least one record.
    pub fn merges(&self) -> usize {
        self.merges
    }

    /// Terms that contributed nothing, in the order they ran.
    pub fn failed_terms(&self) -> &[String] {
        &self.failed_terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AcquisitionState;

    fn outcome(term: &str, names: &[&str]) -> TermOutcome {
        TermOutcome {
            term: term.to_string(),
            records: names
                .iter()
                .map(|n| Record { name: n.to_string(), ..Record::default() })
                .collect(),
            attempts: 1,
            final_state: if names.is_empty() {
                AcquisitionState::Terminal
            } else {
                AcquisitionState::Success
            },
        }
    }

    #[test]
    fn preserves_term_then_item_order() {
        let mut c = Collector::new();
        c.merge(outcome("a", &["a1", "a2"]));
        c.merge(outcome("b", &[]));
        c.merge(outcome("c", &["c1", "a1"]));

        let names: Vec<_> = c.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a1", "a2", "c1", "a1"]);
        assert_eq!(c.merges(), 2);
        assert_eq!(c.failed_terms(), &["b".to_string()]);
    }

    #[test]
    fn starts_empty() {
        let c = Collector::new();
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
        assert!(c.into_records().is_empty());
    }
}
