//! Statistics generation from the lecture database
//!
//! This module provides functionality for extracting and displaying
//! catalogue statistics from the storage layer.

use crate::output::{Outcome, OutcomeCounters};
use crate::storage::{RunRecord, SqliteStorage};
use crate::HarvestError;
use std::collections::HashMap;

/// Catalogue statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Total number of stored lectures
    pub total_records: u64,

    /// Lectures queued for conversion
    pub scheduled: u64,

    /// Lectures already consumed downstream
    pub converted: u64,

    /// Count of lectures per language code
    pub by_language: HashMap<String, u64>,

    /// Most recent harvest run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &SqliteStorage) -> Result<StoreStatistics, HarvestError> {
    Ok(StoreStatistics {
        total_records: storage.count_records()?,
        scheduled: storage.count_scheduled()?,
        converted: storage.count_converted()?,
        by_language: storage.count_by_language()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Catalogue Statistics ===\n");

    println!("Overview:");
    println!("  Stored lectures: {}", stats.total_records);
    println!("  Scheduled: {}", stats.scheduled);
    println!("  Converted: {}", stats.converted);
    println!();

    if !stats.by_language.is_empty() {
        println!("By Language:");
        let mut languages: Vec<_> = stats.by_language.iter().collect();
        languages.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (language, count) in languages {
            println!("  {}: {}", language, count);
        }
        println!();
    }

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run (#{}, project {}):", run.id, run.project_id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            print_outcomes(&run.outcomes);
        }
        None => println!("No harvest runs recorded."),
    }
}

/// Prints an outcome summary, one line per outcome
pub fn print_outcomes(outcomes: &OutcomeCounters) {
    for outcome in Outcome::ALL {
        println!("  {:<18} {}", outcome.as_str(), outcomes.get(outcome));
    }
    println!("  {:<18} {}", "total", outcomes.total());
}
