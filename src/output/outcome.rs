//! Per-page outcomes and their running totals
//!
//! Each processed page resolves to exactly one `Outcome`. The crawl folds
//! those tags into an `OutcomeCounters` value; nothing reads the counters
//! back to make a decision.

use crate::extract::SkipReason;
use std::fmt;

/// Terminal outcome of one target page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The page has no audio link
    NoAudio,
    /// Lecturer, day or start time could not be extracted
    MissingKeyField,
    /// robots.txt forbids fetching the page
    Disallowed,
    /// The record exists and was left alone
    AlreadyPresent,
    /// An unconverted record was rewritten
    Overwritten,
    /// No usable end time
    NoDuration,
    /// A new record was written
    Saved,
}

impl Outcome {
    pub const ALL: [Outcome; 7] = [
        Outcome::Saved,
        Outcome::Overwritten,
        Outcome::AlreadyPresent,
        Outcome::NoAudio,
        Outcome::MissingKeyField,
        Outcome::NoDuration,
        Outcome::Disallowed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAudio => "no_audio",
            Self::MissingKeyField => "missing_key_field",
            Self::Disallowed => "disallowed",
            Self::AlreadyPresent => "already_present",
            Self::Overwritten => "overwritten",
            Self::NoDuration => "no_duration",
            Self::Saved => "saved",
        }
    }
}

impl From<SkipReason> for Outcome {
    fn from(reason: SkipReason) -> Self {
        match reason {
            SkipReason::NoAudioLink => Self::NoAudio,
            SkipReason::MissingKeyField(_) => Self::MissingKeyField,
            SkipReason::NoDuration => Self::NoDuration,
        }
    }
}

/// Outcome counts accumulated over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounters {
    pub no_audio: u64,
    pub missing_key_field: u64,
    pub disallowed: u64,
    pub already_present: u64,
    pub overwritten: u64,
    pub no_duration: u64,
    pub saved: u64,
}

impl OutcomeCounters {
    /// Returns these counts with one more `outcome`
    #[must_use]
    pub fn tally(mut self, outcome: Outcome) -> Self {
        *self.slot(outcome) += 1;
        self
    }

    pub fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::NoAudio => self.no_audio,
            Outcome::MissingKeyField => self.missing_key_field,
            Outcome::Disallowed => self.disallowed,
            Outcome::AlreadyPresent => self.already_present,
            Outcome::Overwritten => self.overwritten,
            Outcome::NoDuration => self.no_duration,
            Outcome::Saved => self.saved,
        }
    }

    /// Number of pages that reached a terminal outcome
    pub fn total(&self) -> u64 {
        Outcome::ALL.iter().map(|o| self.get(*o)).sum()
    }

    fn slot(&mut self, outcome: Outcome) -> &mut u64 {
        match outcome {
            Outcome::NoAudio => &mut self.no_audio,
            Outcome::MissingKeyField => &mut self.missing_key_field,
            Outcome::Disallowed => &mut self.disallowed,
            Outcome::AlreadyPresent => &mut self.already_present,
            Outcome::Overwritten => &mut self.overwritten,
            Outcome::NoDuration => &mut self.no_duration,
            Outcome::Saved => &mut self.saved,
        }
    }
}

impl FromIterator<Outcome> for OutcomeCounters {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), Self::tally)
    }
}

impl fmt::Display for OutcomeCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Outcome::ALL
            .iter()
            .map(|o| format!("{}={}", o.as_str(), self.get(*o)))
            .collect();
        f.write_str(&parts.join(" "))
    }
}
