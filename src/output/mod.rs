//! Output module for crawl outcomes and reports
//!
//! This module handles:
//! - Per-page outcome tags and their per-run totals
//! - Catalogue statistics read back from the database

mod outcome;
pub mod stats;

pub use outcome::{Outcome, OutcomeCounters};
pub use stats::{load_statistics, print_outcomes, print_statistics, StoreStatistics};
