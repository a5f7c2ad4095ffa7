//! Re-runs the analysis over an existing record export without scraping.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use catalog_scraper::config::Config;
use catalog_scraper::pipeline::analyze_and_export;
use catalog_scraper::report::load_records;

fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    let path = cfg.records_path();
    let records = match load_records(&path) {
        Ok(r) => r,
        Err(e) => {
            error!("Could not read {}: {e}", path.display());
            std::process::exit(1);
        }
    };
    info!("Loaded {} records from {}", records.len(), path.display());

    analyze_and_export(&records, &cfg);
}
