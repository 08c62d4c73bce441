//! State module for upsert decisions
//!
//! This module decides what happens to a candidate record given what the
//! store already holds under its identity key.
//!
//! # Components
//!
//! - `ExistingState`: Absent, present and unconverted, or present and converted
//! - `UpsertPolicy`: The decision table driven by the overwrite and stop flags
//! - `UpsertDecision`: Write, overwrite, or skip with an optional stop signal

mod upsert;

// Re-export main types
pub use upsert::{ExistingState, UpsertDecision, UpsertPolicy};
