//! Configuration module for Lingua-Crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing file is not an error for the CLI: `Config::default()` is used instead.
//!
//! # Example
//!
//! ```no_run
//! use lingua_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("lingua.toml")).unwrap();
//! println!("Searching {}", config.crawler.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SelectorConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
pub(crate) use validation::compile_selector;
