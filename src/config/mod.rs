//! Configuration module for Lecture-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and merging command-line overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use lecture_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Crawl starts at: {}", config.crawler.root_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, ExtractionConfig, OutputConfig, Overrides, UserAgentConfig,
    DEFAULT_LINK_PREFIX, DEFAULT_ROOT_URL, DEFAULT_SITE_BASE,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
