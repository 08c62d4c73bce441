//! Lecture page extraction
//!
//! This module handles:
//! - Reading named fields out of a page with tolerant CSS locators
//! - Parsing localized day and time strings
//! - Assembling validated `LectureRecord`s, or the reason a page is skipped

mod builder;
pub mod fields;
mod locale;

pub use builder::{
    content_hash, duration_seconds, infer_language, CrawlCandidate, RecordBuilder, SkipReason,
};
pub use fields::{collapse_whitespace, FieldExtractor, FieldName, FieldSpec, Rule};
pub use locale::{parse_time_of_day, DateLocale};
