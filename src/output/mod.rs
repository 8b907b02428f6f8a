//! Output module for persisting crawl reports
//!
//! This module handles:
//! - The sink interface the crawl report is handed to
//! - Writing reports as timestamped, indented JSON files

mod json_file;
mod traits;

pub use json_file::{format_report, JsonFileSink};
pub use traits::{OutputError, OutputResult, ReportSink};
