use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use catalog_scraper::browser::chromium::ChromiumAgent;
use catalog_scraper::config::Config;
use catalog_scraper::pipeline;

#[tokio::main]
async fn main() {
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

    info!(
        "Starting scrape: {} terms, {} attempts each, up to {} items per page",
        cfg.search_terms.len(),
        cfg.max_retries,
        cfg.max_items,
    );

    let agent = ChromiumAgent::new(cfg.chrome_path.clone());
    if let Err(e) = pipeline::run(cfg, agent).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
