//! Timestamped JSON report files
//!
//! Each report lands in its own file, `<dir>/<YYYY_MM_DD_HH_MM_SS>_items.json`,
//! indented with four spaces. The directory is created when missing.

use crate::config::OutputConfig;
use crate::crawler::CrawlReport;
use crate::output::traits::{OutputResult, ReportSink};
use chrono::Local;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Writes every report to a fresh file under one directory
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.results_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for JsonFileSink {
    fn persist(&self, report: &CrawlReport) -> OutputResult<PathBuf> {
        let json = format_report(report)?;
        fs::create_dir_all(&self.dir)?;

        let stamp = Local::now().format("%Y_%m_%d_%H_%M_%S").to_string();
        let mut attempt = 0u32;

        // Two reports within the same second get a numeric suffix
        loop {
            let name = if attempt == 0 {
                format!("{}_items.json", stamp)
            } else {
                format!("{}_{}_items.json", stamp, attempt)
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(json.as_bytes())?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Renders a report as JSON indented with four spaces
pub fn format_report(report: &CrawlReport) -> OutputResult<String> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    report.serialize(&mut serializer)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
