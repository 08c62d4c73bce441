use crate::storage::LectureRecord;

/// What the store currently holds for a candidate's identity key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingState {
    /// No record with this key
    Absent,

    /// A record exists and has not been consumed downstream
    PresentUnconverted,

    /// A record exists and downstream processing already consumed it
    PresentConverted,
}

impl ExistingState {
    /// Classifies the result of a store lookup
    pub fn from_lookup(existing: Option<&LectureRecord>) -> Self {
        match existing {
            None => Self::Absent,
            Some(record) if record.converted => Self::PresentConverted,
            Some(_) => Self::PresentUnconverted,
        }
    }
}

/// Action to take for one candidate record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertDecision {
    /// Store a new record
    Write,

    /// Replace the existing record
    Overwrite,

    /// Leave the store untouched; `terminate` asks the runner to stop the crawl
    Skip { terminate: bool },
}

impl UpsertDecision {
    pub fn terminates(&self) -> bool {
        matches!(self, Self::Skip { terminate: true })
    }
}

/// Conflict policy for candidates whose key may already be stored
///
/// | Existing state     | overwrite = false          | overwrite = true |
/// |--------------------|----------------------------|------------------|
/// | Absent             | write                      | write            |
/// | PresentUnconverted | skip, stop if requested    | overwrite        |
/// | PresentConverted   | skip, stop if requested    | skip             |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertPolicy {
    /// Permit rewriting records that are not yet converted
    pub overwrite: bool,

    /// Halt the crawl at the first already-present record
    pub stop_when_present: bool,
}

impl UpsertPolicy {
    pub fn new(overwrite: bool, stop_when_present: bool) -> Self {
        Self {
            overwrite,
            stop_when_present,
        }
    }

    pub fn decide(&self, existing: ExistingState) -> UpsertDecision {
        match (existing, self.overwrite) {
            (ExistingState::Absent, _) => UpsertDecision::Write,
            (ExistingState::PresentUnconverted, true) => UpsertDecision::Overwrite,
            // Converted records are never rewritten, and overwrite mode never stops
            (ExistingState::PresentConverted, true) => UpsertDecision::Skip { terminate: false },
            (_, false) => UpsertDecision::Skip {
                terminate: self.stop_when_present,
            },
        }
    }
}
