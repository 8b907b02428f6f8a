//! Report sink trait and error types
//!
//! A sink receives the finished crawl report and persists it somewhere.
//! The crawl itself never depends on a sink succeeding.

use crate::crawler::CrawlReport;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for finished crawl reports
pub trait ReportSink: Send + Sync {
    /// Persists `report`, returning where it was written
    fn persist(&self, report: &CrawlReport) -> OutputResult<PathBuf>;
}
