//! Record assembly from extracted fields
//!
//! A page first becomes a `CrawlCandidate` holding whatever fields could be
//! read. `RecordBuilder` then checks the required fields, computes the
//! derived ones and either produces a `LectureRecord` or says why the page
//! is skipped.

use crate::config::ExtractionConfig;
use crate::extract::fields::{self, FieldExtractor, FieldName};
use crate::extract::locale::{parse_time_of_day, DateLocale};
use crate::storage::{IdentityKey, LectureRecord};
use crate::ConfigError;
use chrono::{DateTime, NaiveTime, Utc};
use scraper::Html;
use sha2::{Digest, Sha256};
use std::fmt;

/// Why a page did not produce a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The page has no audio link
    NoAudioLink,
    /// A field of the identity key is absent or unparsable
    MissingKeyField(FieldName),
    /// The end time is absent, unparsable or before the start time
    NoDuration,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAudioLink => f.write_str("no audio link"),
            Self::MissingKeyField(field) => write!(f, "missing key field {}", field),
            Self::NoDuration => f.write_str("no duration"),
        }
    }
}

/// Raw field values of one target page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlCandidate {
    pub source: String,
    pub audio_link: Option<String>,
    pub title: Option<String>,
    pub type_title: Option<String>,
    pub lecturer: Option<String>,
    pub function: Option<String>,
    pub day: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub lesson_type: Option<String>,
    pub chair: Option<String>,
    pub video_link: Option<String>,
}

impl CrawlCandidate {
    /// Parses a page body and reads every known field
    pub fn from_html(html: &str, source: &str) -> Self {
        let document = Html::parse_document(html);
        Self::from_document(&document, source)
    }

    pub fn from_document(document: &Html, source: &str) -> Self {
        let extractor = FieldExtractor::new(document);
        Self {
            source: source.to_string(),
            audio_link: extractor.extract(&fields::AUDIO_LINK),
            title: extractor.extract(&fields::TITLE),
            type_title: extractor.extract(&fields::TYPE_TITLE),
            lecturer: extractor.extract(&fields::LECTURER),
            function: extractor.extract(&fields::FUNCTION),
            day: extractor.extract(&fields::DAY),
            start_time: extractor.extract(&fields::START_TIME),
            end_time: extractor.extract(&fields::END_TIME),
            lesson_type: extractor.extract(&fields::LESSON_TYPE),
            chair: extractor.extract(&fields::CHAIR),
            video_link: extractor.extract(&fields::VIDEO_LINK),
        }
    }
}

/// Turns lecture pages into records
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    locale: DateLocale,
    default_language: String,
}

impl RecordBuilder {
    pub fn new(locale: DateLocale, default_language: impl Into<String>) -> Self {
        Self {
            locale,
            default_language: default_language.into(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let locale = DateLocale::from_tag(&config.locale).ok_or_else(|| {
            ConfigError::Validation(format!("unsupported locale '{}'", config.locale))
        })?;
        Ok(Self::new(locale, config.default_language.clone()))
    }

    /// Builds a record from a fetched page, stamped with the current time
    pub fn build(&self, html: &str, source: &str) -> Result<LectureRecord, SkipReason> {
        self.finish(CrawlCandidate::from_html(html, source), Utc::now())
    }

    /// Validates a candidate and computes the derived fields
    ///
    /// Checks run in a fixed order: audio link, then the key fields
    /// (lecturer, day, start time), then the end time.
    pub fn finish(
        &self,
        candidate: CrawlCandidate,
        scraped: DateTime<Utc>,
    ) -> Result<LectureRecord, SkipReason> {
        let audio_link = candidate.audio_link.ok_or(SkipReason::NoAudioLink)?;

        let lecturer = candidate
            .lecturer
            .ok_or(SkipReason::MissingKeyField(FieldName::Lecturer))?;
        let day = candidate
            .day
            .ok_or(SkipReason::MissingKeyField(FieldName::Day))?;
        let start_time = candidate
            .start_time
            .ok_or(SkipReason::MissingKeyField(FieldName::StartTime))?;

        let date = self
            .locale
            .parse_long_date(&day)
            .ok_or(SkipReason::MissingKeyField(FieldName::Day))?;
        let start = parse_time_of_day(&start_time)
            .ok_or(SkipReason::MissingKeyField(FieldName::StartTime))?;

        let end_time = candidate.end_time.ok_or(SkipReason::NoDuration)?;
        let end = parse_time_of_day(&end_time).ok_or(SkipReason::NoDuration)?;
        let duration_sec = duration_seconds(start, end).ok_or(SkipReason::NoDuration)?;

        let language = infer_language(&audio_link, &self.default_language);

        Ok(LectureRecord {
            key: IdentityKey::new(&lecturer, &day, &start_time),
            content_hash: content_hash(&candidate.source),
            source: candidate.source,
            scraped,
            title: candidate.title,
            type_title: candidate.type_title,
            lesson_type: candidate.lesson_type,
            lecturer,
            function: candidate.function,
            date: date.and_time(NaiveTime::MIN),
            start_time,
            end_time,
            duration_sec,
            audio_link,
            language,
            chair: candidate.chair,
            video_link: candidate.video_link,
            scheduled: false,
            converted: false,
        })
    }
}

/// Seconds between two times of the same day
///
/// Lectures never cross midnight, so an end before the start has no
/// duration.
pub fn duration_seconds(start: NaiveTime, end: NaiveTime) -> Option<u32> {
    let seconds = (end - start).num_seconds();
    u32::try_from(seconds).ok()
}

/// Language code carried by an audio filename like `name-fr.mp3`
///
/// Falls back to `default` unless the text after the last hyphen of the
/// file stem is exactly two characters.
pub fn infer_language(audio_link: &str, default: &str) -> String {
    let path = audio_link
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or(audio_link);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let stem = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    };

    match stem.rfind('-') {
        Some(hyphen) => {
            let suffix = &stem[hyphen + 1..];
            if suffix.chars().count() == 2 {
                suffix.to_string()
            } else {
                default.to_string()
            }
        }
        None => default.to_string(),
    }
}

/// SHA-256 of the source URL, stored as an opaque scheduling seed
pub fn content_hash(source: &str) -> Vec<u8> {
    Sha256::digest(source.as_bytes()).to_vec()
}
