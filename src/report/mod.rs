//! Persisted artifacts: the raw record export, `statistics.json`, and the
//! hand-off to a [`ReportRenderer`].

pub mod renderer;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::aggregator::{CorrelationMatrix, Metric, MetricSummary, StatsReport};
use crate::config::STATISTICS_FILE;
use crate::error::{AppError, Result};
use crate::types::Record;

pub use renderer::{ChartArtifact, ReportRenderer, TextReportRenderer};

/// Emitted in place of any undefined number.
pub const NULL_SENTINEL: &str = "N.A";

/// Write `records` as an indented JSON array. Returns `Ok(None)` without
/// touching the filesystem when there is nothing to write.
pub fn export_records(records: &[Record], path: &Path) -> Result<Option<PathBuf>> {
    if records.is_empty() {
        info!("No records collected; skipping record export");
        return Ok(None);
    }
    write_json(path, &records)?;
    info!("Saved {} records to {}", records.len(), path.display());
    Ok(Some(path.to_path_buf()))
}

/// Read a record export back, e.g. to re-run the analysis offline.
///
/// Hand-edited or foreign files may hold blank or padded fields; those entries
/// are dropped so the analysis only sees well-formed records.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let raw = fs::read_to_string(path)?;
    let mut records: Vec<Record> = serde_json::from_str(&raw)?;
    let before = records.len();
    records.retain(Record::is_well_formed);
    if records.len() < before {
        warn!(
            "Dropped {} malformed records from {}",
            before - records.len(),
            path.display()
        );
    }
    Ok(records)
}

pub fn export_statistics(report: &StatsReport, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(STATISTICS_FILE);
    write_json(&path, &report_to_json(report))?;
    info!("Saved statistics to {}", path.display());
    Ok(path)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| AppError::Export(format!("create {}: {e}", dir.display())))?;
    }
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    fs::write(path, buf).map_err(|e| AppError::Export(format!("write {}: {e}", path.display())))
}

// ---------------------------------------------------------------------------
// StatsReport → JSON
// ---------------------------------------------------------------------------

pub fn report_to_json(report: &StatsReport) -> Value {
    let mut root = Map::new();
    root.insert("analysis_date".into(), json!(report.analysis_date));
    root.insert("total_products".into(), json!(report.total_count));
    root.insert("price_statistics".into(), summary_to_json(&report.price));
    root.insert("rating_statistics".into(), summary_to_json(&report.rating));
    root.insert("sales_statistics".into(), summary_to_json(&report.sales));
    root.insert("correlations".into(), correlations_to_json(&report.correlations));
    root.insert(
        "top_selling_products".into(),
        Value::Array(
            report
                .top_selling
                .iter()
                .map(|r| {
                    json!({
                        "name": r.record.name,
                        "price": r.record.price,
                        "sold": r.record.sold,
                        "rating": r.record.rating,
                    })
                })
                .collect(),
        ),
    );
    let mut locations = Map::new();
    for (location, count) in &report.locations.entries {
        locations.insert(location.clone(), json!(count));
    }
    root.insert("location_distribution".into(), Value::Object(locations));
    Value::Object(root)
}

fn summary_to_json(s: &MetricSummary) -> Value {
    let mut m = Map::new();
    m.insert("count".into(), json!(s.count));
    m.insert("mean".into(), number(s.mean));
    m.insert("std".into(), number(s.std));
    m.insert("min".into(), number(s.min));
    m.insert("25%".into(), number(s.p25));
    m.insert("50%".into(), number(s.p50));
    m.insert("75%".into(), number(s.p75));
    m.insert("max".into(), number(s.max));
    Value::Object(m)
}

fn correlations_to_json(c: &CorrelationMatrix) -> Value {
    let mut outer = Map::new();
    for a in Metric::ALL {
        let mut row = Map::new();
        for b in Metric::ALL {
            row.insert(b.key().into(), number(c.get(a, b)));
        }
        outer.insert(a.key().into(), Value::Object(row));
    }
    Value::Object(outer)
}

/// Two-decimal number, or the null sentinel.
pub fn number(v: Option<f64>) -> Value {
    match v.map(round2).filter(|x| x.is_finite()) {
        Some(x) => json!(x),
        None => json!(NULL_SENTINEL),
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Best-effort export of statistics plus the rendered report. Failures are
/// logged and do not affect the in-memory report.
pub fn export_analysis(report: &StatsReport, output_dir: &Path, renderer: &dyn ReportRenderer) {
    if let Err(e) = export_statistics(report, output_dir) {
        warn!("Statistics export failed: {e}");
    }
    let charts = ChartArtifact::present_in(output_dir);
    match renderer.render(report, &charts, output_dir) {
        Ok(path) => info!("Report saved to {}", path.display()),
        Err(e) => warn!("Report rendering failed: {e}"),
    }
}
