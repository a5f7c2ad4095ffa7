use std::path::Path;

use tracing::{info, warn};

use crate::acquisition::AcquisitionController;
use crate::aggregator::{aggregate, StatsReport};
use crate::browser::BrowserAgent;
use crate::collector::Collector;
use crate::config::Config;
use crate::error::Result;
use crate::report::{export_analysis, export_records, TextReportRenderer};
use crate::types::Record;

/// Run every search term in order and merge what each one yields.
pub async fn acquire_all<A: BrowserAgent>(controller: &AcquisitionController<A>, terms: &[String]) -> Collector {
    let mut collector = Collector::new();
    for (i, term) in terms.iter().enumerate() {
        info!("[{}/{}] Processing search term \"{term}\"", i + 1, terms.len());
        let outcome = controller.acquire(term).await;
        collector.merge(outcome);
    }
    if !collector.failed_terms().is_empty() {
        warn!("Terms with no results: {}", collector.failed_terms().join(", "));
    }
    info!("Acquisition complete: {} records from {} terms", collector.len(), terms.len());
    collector
}

/// Normalize, aggregate and write the statistics and report. Export problems
/// are logged, never returned.
pub fn analyze_and_export(records: &[Record], cfg: &Config) -> Option<StatsReport> {
    if records.is_empty() {
        info!("Nothing to analyze");
        return None;
    }

    let report = aggregate(records);
    export_analysis(&report, Path::new(&cfg.output_dir), &TextReportRenderer::default());
    info!("Successfully analyzed {} records", report.total_count);
    Some(report)
}

/// The full scrape → analyze run.
pub async fn run<A: BrowserAgent>(cfg: Config, agent: A) -> Result<Option<StatsReport>> {
    let terms = cfg.search_terms.clone();
    let controller = AcquisitionController::new(cfg.clone(), agent)?;
    let collector = acquire_all(&controller, &terms).await;
    let records = collector.into_records();
    if let Err(e) = export_records(&records, &cfg.records_path()) {
        warn!("Record export failed: {e}");
    }
    Ok(analyze_and_export(&records, &cfg))
}
