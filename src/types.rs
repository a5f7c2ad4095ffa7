use serde::{Deserialize, Serialize};

/// Placeholder for a field that was never set.
pub const SENTINEL_UNSET: &str = "None";

/// Placeholder for an optional field whose locator found nothing.
pub const SENTINEL_MISSING: &str = "N/A";

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One catalog listing exactly as scraped. Every field holds either real text
/// or one of the sentinels; none is ever empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub price: String,
    pub rating: String,
    pub sold: String,
    pub location: String,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            name: SENTINEL_UNSET.to_string(),
            price: SENTINEL_UNSET.to_string(),
            rating: SENTINEL_UNSET.to_string(),
            sold: SENTINEL_UNSET.to_string(),
            location: SENTINEL_UNSET.to_string(),
        }
    }
}

impl Record {
    pub fn fields(&self) -> [(Field, &str); 5] {
        [
            (Field::Name, self.name.as_str()),
            (Field::Price, self.price.as_str()),
            (Field::Rating, self.rating.as_str()),
            (Field::Sold, self.sold.as_str()),
            (Field::Location, self.location.as_str()),
        ]
    }

    /// True when every field is a sentinel or non-empty trimmed text.
    pub fn is_well_formed(&self) -> bool {
        self.fields().iter().all(|(_, v)| {
            *v == SENTINEL_UNSET || *v == SENTINEL_MISSING || (!v.is_empty() && v.trim() == *v)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Price,
    Rating,
    Sold,
    Location,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Field::Name => "name",
            Field::Price => "price",
            Field::Rating => "rating",
            Field::Sold => "sold",
            Field::Location => "location",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Normalized view
// ---------------------------------------------------------------------------

/// Numeric view of a [`Record`]. `sold_value` falls back to 0 rather than null.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRecord {
    pub price_value: Option<f64>,
    pub rating_value: Option<f64>,
    pub sold_value: i64,
}

// ---------------------------------------------------------------------------
// Acquisition outcome
// ---------------------------------------------------------------------------

/// Where a term's acquisition state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Idle,
    Navigating,
    AwaitingContent,
    Extracting,
    Success,
    RetryableFailure,
    Terminal,
}

impl std::fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AcquisitionState::Idle => "idle",
            AcquisitionState::Navigating => "navigating",
            AcquisitionState::AwaitingContent => "awaiting_content",
            AcquisitionState::Extracting => "extracting",
            AcquisitionState::Success => "success",
            AcquisitionState::RetryableFailure => "retryable_failure",
            AcquisitionState::Terminal => "terminal",
        };
        write!(f, "{s}")
    }
}

/// What one search term contributed. Returned to the caller for merging.
#[derive(Debug, Clone)]
pub struct TermOutcome {
    pub term: String,
    pub records: Vec<Record>,
    pub attempts: u32,
    /// `Success` or `Terminal`.
    pub final_state: AcquisitionState,
}

impl TermOutcome {
    pub fn succeeded(&self) -> bool {
        self.final_state == AcquisitionState::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_all_unset_sentinels() {
        let r = Record::default();
        assert!(r.fields().iter().all(|(_, v)| *v == SENTINEL_UNSET));
        assert!(r.is_well_formed());
    }

    #[test]
    fn padded_or_empty_fields_are_not_well_formed() {
        let mut r = Record::default();
        r.name = " Phone".to_string();
        assert!(!r.is_well_formed());
        r.name = String::new();
        assert!(!r.is_well_formed());
        r.name = "Phone".to_string();
        r.rating = SENTINEL_MISSING.to_string();
        assert!(r.is_well_formed());
    }

    #[test]
    fn record_serializes_with_five_keys() {
        let v = serde_json::to_value(Record::default()).unwrap();
        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "price", "rating", "sold", "location"]);
    }
}
