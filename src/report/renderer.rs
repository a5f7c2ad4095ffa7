use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregator::{Metric, StatsReport};
use crate::config::REPORT_FILE;
use crate::error::{AppError, Result};

use super::{number, NULL_SENTINEL};

/// Chart images a renderer may reference.
///
/// Nothing in this crate draws them. A separate plotting step writes the PNGs
/// into the output directory under [`ChartArtifact::file_name`] before the
/// report is rendered; charts it did not produce are simply left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChartArtifact {
    PriceDistribution,
    PriceVsRating,
    PriceVsSales,
    LocationDistribution,
}

impl ChartArtifact {
    pub const ALL: [ChartArtifact; 4] = [
        ChartArtifact::PriceVsSales,
        ChartArtifact::PriceDistribution,
        ChartArtifact::LocationDistribution,
        ChartArtifact::PriceVsRating,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ChartArtifact::PriceDistribution => "price_analysis.png",
            ChartArtifact::PriceVsRating => "price_vs_rating.png",
            ChartArtifact::PriceVsSales => "price_vs_sales.png",
            ChartArtifact::LocationDistribution => "location_distribution.png",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartArtifact::PriceDistribution => "Price Distribution",
            ChartArtifact::PriceVsRating => "Price vs Rating",
            ChartArtifact::PriceVsSales => "Price vs Sales Analysis",
            ChartArtifact::LocationDistribution => "Location Distribution",
        }
    }

    /// Charts that exist in `dir`, keyed by file name.
    pub fn present_in(dir: &Path) -> BTreeMap<String, PathBuf> {
        Self::ALL
            .iter()
            .map(|c| dir.join(c.file_name()))
            .filter(|p| p.is_file())
            .filter_map(|p| {
                let name = p.file_name()?.to_string_lossy().into_owned();
                Some((name, p))
            })
            .collect()
    }
}

/// Turns a [`StatsReport`] plus available charts into a persisted document.
pub trait ReportRenderer {
    /// Returns the path of the written document.
    fn render(
        &self,
        report: &StatsReport,
        charts: &BTreeMap<String, PathBuf>,
        output_dir: &Path,
    ) -> Result<PathBuf>;
}

/// Plain-text report with the same sections as the spreadsheet summary.
pub struct TextReportRenderer {
    pub title: String,
}

impl Default for TextReportRenderer {
    fn default() -> Self {
        Self {
            title: "Lazada Product Analysis Report".to_string(),
        }
    }
}

impl TextReportRenderer {
    pub fn render_to_string(&self, report: &StatsReport, charts: &BTreeMap<String, PathBuf>) -> String {
        let mut lines = vec![
            self.title.clone(),
            format!("Generated on: {}", report.analysis_date),
            String::new(),
            "Product Overview".to_string(),
            row("Total Products", report.total_count),
            String::new(),
        ];

        let p = &report.price;
        lines.push("Price Statistics (SGD)".to_string());
        lines.extend(
            [
                ("Average", p.mean),
                ("Median", p.p50),
                ("Minimum", p.min),
                ("Maximum", p.max),
                ("Standard Deviation", p.std),
            ]
            .into_iter()
            .map(|(label, v)| row(label, cell(v))),
        );
        lines.push(String::new());

        let s = &report.sales;
        lines.push("Sales Statistics".to_string());
        lines.extend(
            [
                ("Average Sales", s.mean),
                ("Median Sales", s.p50),
                ("Minimum Sales", s.min),
                ("Maximum Sales", s.max),
            ]
            .into_iter()
            .map(|(label, v)| row(label, cell(v))),
        );
        lines.push(row("Total Products Sold", s.count));
        lines.push(String::new());

        lines.push("Top Selling Products".to_string());
        lines.push(format!(
            "{:<40}{:<15}{:<15}{:<15}",
            "Product Name", "Price (SGD)", "Units Sold", "Rating"
        ));
        lines.extend(report.top_selling.iter().map(|r| {
            format!(
                "{:<40}{:<15}{:<15}{:<15}",
                truncate(&r.record.name, 38),
                r.record.price,
                r.record.sold,
                r.record.rating
            )
        }));
        lines.push(String::new());

        lines.push("Correlation Analysis".to_string());
        lines.push(format!("{:<40}{:<15}{:<15}{:<15}", "", "Price", "Rating", "Sales"));
        lines.extend(Metric::ALL.into_iter().map(|a| {
            let cells: String = Metric::ALL
                .iter()
                .map(|&b| format!("{:<15}", cell(report.correlations.get(a, b))))
                .collect();
            row(label_for(a), cells)
        }));
        lines.push(String::new());

        lines.push("Location Distribution".to_string());
        lines.extend(
            report
                .locations
                .entries
                .iter()
                .map(|(location, count)| row(&truncate(location, 38), count)),
        );

        if !charts.is_empty() {
            lines.push(String::new());
            lines.push("Charts".to_string());
            lines.extend(ChartArtifact::ALL.into_iter().filter_map(|chart| {
                let path = charts.get(chart.file_name())?;
                Some(row(chart.title(), path.display()))
            }));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl ReportRenderer for TextReportRenderer {
    fn render(
        &self,
        report: &StatsReport,
        charts: &BTreeMap<String, PathBuf>,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)
            .map_err(|e| AppError::Export(format!("create {}: {e}", output_dir.display())))?;
        let path = output_dir.join(REPORT_FILE);
        fs::write(&path, self.render_to_string(report, charts))
            .map_err(|e| AppError::Export(format!("write {}: {e}", path.display())))?;
        Ok(path)
    }
}

/// Label padded to the value column.
fn row(label: &str, value: impl std::fmt::Display) -> String {
    format!("{label:<40}{value}")
}

fn cell(v: Option<f64>) -> String {
    match number(v).as_f64() {
        Some(x) => format!("{x:.2}"),
        None => NULL_SENTINEL.to_string(),
    }
}

fn label_for(m: Metric) -> &'static str {
    match m {
        Metric::Price => "Price",
        Metric::Rating => "Rating",
        Metric::Sold => "Sales",
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max_chars - 1).collect();
        t.push('…');
        t
    }
}
