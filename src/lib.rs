pub mod acquisition;
pub mod aggregator;
pub mod browser;
pub mod collector;
pub mod config;
pub mod error;
pub mod extractor;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod types;
