use statrs::statistics::Statistics;

use crate::types::NormalizedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Price,
    Rating,
    Sold,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Price, Metric::Rating, Metric::Sold];

    pub fn key(self) -> &'static str {
        match self {
            Metric::Price => "price",
            Metric::Rating => "rating",
            Metric::Sold => "sold",
        }
    }

    fn index(self) -> usize {
        match self {
            Metric::Price => 0,
            Metric::Rating => 1,
            Metric::Sold => 2,
        }
    }

    pub fn value(self, r: &NormalizedRecord) -> Option<f64> {
        match self {
            Metric::Price => r.price_value,
            Metric::Rating => r.rating_value,
            Metric::Sold => Some(r.sold_value as f64),
        }
    }
}

/// Symmetric Pearson correlation matrix over price, rating and sold.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CorrelationMatrix {
    cells: [[Option<f64>; 3]; 3],
}

impl CorrelationMatrix {
    /// Pairwise-complete: each cell only uses rows where both metrics are present.
    pub fn compute(rows: &[NormalizedRecord]) -> Self {
        let mut cells = [[None; 3]; 3];
        for (i, a) in Metric::ALL.iter().enumerate() {
            for b in &Metric::ALL[i..] {
                let r = if a == b {
                    let xs: Vec<f64> = rows.iter().filter_map(|r| a.value(r)).collect();
                    has_variance(&xs).then_some(1.0)
                } else {
                    let (xs, ys): (Vec<f64>, Vec<f64>) = rows
                        .iter()
                        .filter_map(|r| Some((a.value(r)?, b.value(r)?)))
                        .unzip();
                    pearson(&xs, &ys)
                };
                cells[a.index()][b.index()] = r;
                cells[b.index()][a.index()] = r;
            }
        }
        Self { cells }
    }

    pub fn get(&self, a: Metric, b: Metric) -> Option<f64> {
        self.cells[a.index()][b.index()]
    }
}

/// `None` with fewer than two pairs or when either side is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if !has_variance(xs) || !has_variance(ys) {
        return None;
    }
    let r = xs.covariance(ys) / (xs.std_dev() * ys.std_dev());
    r.is_finite().then_some(r.clamp(-1.0, 1.0))
}

fn has_variance(xs: &[f64]) -> bool {
    xs.len() >= 2 && xs.iter().any(|&x| x != xs[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(price: Option<f64>, rating: Option<f64>, sold: i64) -> NormalizedRecord {
        NormalizedRecord { price_value: price, rating_value: rating, sold_value: sold }
    }

    #[test]
    fn perfect_linear_relationships() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_side_is_undefined() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let rows = vec![
            row(Some(10.0), Some(4.0), 5),
            row(Some(20.0), Some(4.5), 1000),
            row(Some(35.0), None, 0),
            row(None, Some(3.0), 12),
        ];
        let m = CorrelationMatrix::compute(&rows);
        for a in Metric::ALL {
            assert_eq!(m.get(a, a), Some(1.0));
            for b in Metric::ALL {
                assert_eq!(m.get(a, b), m.get(b, a));
            }
        }
    }

    #[test]
    fn zero_variance_metric_has_null_diagonal() {
        let rows = vec![row(Some(1.0), None, 0), row(Some(2.0), None, 0)];
        let m = CorrelationMatrix::compute(&rows);
        assert_eq!(m.get(Metric::Price, Metric::Price), Some(1.0));
        assert_eq!(m.get(Metric::Sold, Metric::Sold), None);
        assert_eq!(m.get(Metric::Rating, Metric::Rating), None);
        assert_eq!(m.get(Metric::Price, Metric::Sold), None);
    }

    #[test]
    fn uses_only_complete_pairs() {
        let rows = vec![
            row(Some(1.0), Some(1.0), 0),
            row(Some(2.0), Some(2.0), 0),
            row(Some(3.0), None, 0),
            row(None, Some(100.0), 0),
            row(Some(4.0), Some(4.0), 0),
        ];
        let m = CorrelationMatrix::compute(&rows);
        let r = m.get(Metric::Price, Metric::Rating).unwrap();
        assert!((r - 1.0).abs() < 1e-12, "{r}");
    }
}
