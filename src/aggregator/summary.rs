use statrs::statistics::Statistics;

/// Descriptive statistics over the non-null values of one metric.
/// Every figure except `count` is `None` when it is undefined for the sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n − 1); needs at least two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl MetricSummary {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Self {
            count: values.len(),
            mean: finite(values.mean()),
            std: if values.len() >= 2 { finite(values.std_dev()) } else { None },
            min: finite(values.min()),
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.50),
            p75: quantile(&sorted, 0.75),
            max: finite(values.max()),
        }
    }
}

/// Quantile of an ascending slice with linear interpolation between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}
