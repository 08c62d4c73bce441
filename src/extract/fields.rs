//! Tolerant field extraction from lecture pages
//!
//! A field is described by a CSS locator and an extraction rule. Looking a
//! field up never fails: a missing node, an empty value or a locator that
//! does not parse all come back as `None`.

use scraper::{ElementRef, Html, Selector};
use std::fmt;

/// Fields read from a lecture page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    AudioLink,
    Title,
    TypeTitle,
    Lecturer,
    Function,
    Day,
    StartTime,
    EndTime,
    LessonType,
    Chair,
    VideoLink,
}

impl FieldName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AudioLink => "audio_link",
            Self::Title => "title",
            Self::TypeTitle => "type_title",
            Self::Lecturer => "lecturer",
            Self::Function => "function",
            Self::Day => "day",
            Self::StartTime => "start_time",
            Self::EndTime => "end_time",
            Self::LessonType => "lesson_type",
            Self::Chair => "chair",
            Self::VideoLink => "video_link",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a value is read from the first node matching a locator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// All descendant text, whitespace collapsed
    Text,
    /// The first non-blank text node directly under the element
    LeadingText,
    /// The value of an attribute
    Attr(&'static str),
}

/// A field descriptor: what to look for and how to read it
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: FieldName,
    pub locator: &'static str,
    pub rule: Rule,
}

impl FieldSpec {
    pub const fn new(name: FieldName, locator: &'static str, rule: Rule) -> Self {
        Self { name, locator, rule }
    }
}

pub const AUDIO_LINK: FieldSpec =
    FieldSpec::new(FieldName::AudioLink, "li.audio a[href]", Rule::Attr("href"));
pub const VIDEO_LINK: FieldSpec =
    FieldSpec::new(FieldName::VideoLink, "li.video a[href]", Rule::Attr("href"));
pub const TITLE: FieldSpec = FieldSpec::new(FieldName::Title, "#title", Rule::Text);
pub const TYPE_TITLE: FieldSpec = FieldSpec::new(FieldName::TypeTitle, ".headerpage h4", Rule::Text);
pub const LECTURER: FieldSpec =
    FieldSpec::new(FieldName::Lecturer, "h3.lecturer", Rule::LeadingText);
pub const FUNCTION: FieldSpec =
    FieldSpec::new(FieldName::Function, "h3.lecturer .function", Rule::Text);
pub const DAY: FieldSpec = FieldSpec::new(FieldName::Day, "span.day", Rule::Text);
pub const START_TIME: FieldSpec = FieldSpec::new(FieldName::StartTime, "span.from", Rule::Text);
pub const END_TIME: FieldSpec = FieldSpec::new(FieldName::EndTime, "span.to", Rule::Text);
pub const LESSON_TYPE: FieldSpec = FieldSpec::new(FieldName::LessonType, "span.type", Rule::Text);
pub const CHAIR: FieldSpec = FieldSpec::new(FieldName::Chair, "div.chair-baseline", Rule::Text);

/// Reads field values out of one parsed document
pub struct FieldExtractor<'a> {
    document: &'a Html,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(document: &'a Html) -> Self {
        Self { document }
    }

    /// Returns the value of `spec`, or None if it is absent
    pub fn extract(&self, spec: &FieldSpec) -> Option<String> {
        let selector = match Selector::parse(spec.locator) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::warn!("Invalid locator for {}: {:?}", spec.name, e);
                return None;
            }
        };

        let element = self.document.select(&selector).next()?;
        read(element, spec.rule)
    }
}

fn read(element: ElementRef<'_>, rule: Rule) -> Option<String> {
    match rule {
        Rule::Text => collapse_whitespace(&element.text().collect::<String>()),
        Rule::LeadingText => element
            .children()
            .filter_map(|child| child.value().as_text())
            .find_map(|text| collapse_whitespace(text)),
        Rule::Attr(name) => element
            .value()
            .attr(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
    }
}

/// Trims and collapses internal whitespace; blank text is absence
pub fn collapse_whitespace(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
