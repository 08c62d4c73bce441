//! Locale-aware parsing of day and time strings
//!
//! Lecture pages show the day in long form ("29 juin 2017") in the site's
//! language, and times as "17:00" or, in French typography, "17h00".

use chrono::{NaiveDate, NaiveTime};

/// Languages whose long-form dates can be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLocale {
    French,
    English,
}

impl DateLocale {
    /// Resolves a POSIX-style locale tag ("fr_FR.UTF-8", "en-GB", "fr")
    pub fn from_tag(tag: &str) -> Option<Self> {
        let language = tag
            .split(|c| c == '_' || c == '-' || c == '.')
            .next()
            .unwrap_or("")
            .to_lowercase();

        match language.as_str() {
            "fr" => Some(Self::French),
            "en" => Some(Self::English),
            _ => None,
        }
    }

    /// Parses a "<day> <month name> <year>" string
    ///
    /// Month names are matched case-insensitively, with or without accents.
    /// French "1er" and English ordinal suffixes are accepted on the day.
    pub fn parse_long_date(&self, text: &str) -> Option<NaiveDate> {
        let mut parts = text.split_whitespace();
        let day = parse_day(parts.next()?)?;
        let month = self.month_number(parts.next()?)?;
        let year: i32 = parts.next()?.parse().ok()?;

        if parts.next().is_some() {
            return None;
        }

        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn month_number(&self, name: &str) -> Option<u32> {
        let name = name.trim_end_matches('.').to_lowercase();
        let table: &[&[&str]] = match self {
            Self::French => &FRENCH_MONTHS,
            Self::English => &ENGLISH_MONTHS,
        };

        table
            .iter()
            .position(|spellings| spellings.contains(&name.as_str()))
            .map(|index| index as u32 + 1)
    }
}

const FRENCH_MONTHS: [&[&str]; 12] = [
    &["janvier"],
    &["février", "fevrier"],
    &["mars"],
    &["avril"],
    &["mai"],
    &["juin"],
    &["juillet"],
    &["août", "aout"],
    &["septembre"],
    &["octobre"],
    &["novembre"],
    &["décembre", "decembre"],
];

const ENGLISH_MONTHS: [&[&str]; 12] = [
    &["january"],
    &["february"],
    &["march"],
    &["april"],
    &["may"],
    &["june"],
    &["july"],
    &["august"],
    &["september"],
    &["october"],
    &["november"],
    &["december"],
];

fn parse_day(token: &str) -> Option<u32> {
    let digits = token.trim_end_matches(|c: char| c.is_alphabetic());
    if digits.is_empty() || digits.len() > 2 {
        return None;
    }
    digits.parse().ok()
}

/// Parses an "HH:MM" or "HHhMM" time of day
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let normalized = text.trim().replace(['h', 'H'], ":");
    let normalized = if normalized.ends_with(':') {
        format!("{}00", normalized)
    } else {
        normalized
    };
    NaiveTime::parse_from_str(&normalized, "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(DateLocale::from_tag("fr_FR.UTF-8"), Some(DateLocale::French));
        assert_eq!(DateLocale::from_tag("fr"), Some(DateLocale::French));
        assert_eq!(DateLocale::from_tag("FR-ca"), Some(DateLocale::French));
        assert_eq!(DateLocale::from_tag("en_GB"), Some(DateLocale::English));
        assert_eq!(DateLocale::from_tag("de_DE"), None);
        assert_eq!(DateLocale::from_tag(""), None);
    }

    #[test]
    fn test_parse_french_date() {
        let fr = DateLocale::French;
        assert_eq!(fr.parse_long_date("29 juin 2017"), Some(date(2017, 6, 29)));
        assert_eq!(fr.parse_long_date("3 Février 2020"), Some(date(2020, 2, 3)));
        assert_eq!(fr.parse_long_date("15 aout 2019"), Some(date(2019, 8, 15)));
        assert_eq!(fr.parse_long_date("1er décembre 2018"), Some(date(2018, 12, 1)));
    }

    #[test]
    fn test_parse_english_date() {
        let en = DateLocale::English;
        assert_eq!(en.parse_long_date("29 June 2017"), Some(date(2017, 6, 29)));
        assert_eq!(en.parse_long_date("2nd March 2021"), Some(date(2021, 3, 2)));
    }

    #[test]
    fn test_wrong_locale_does_not_parse() {
        assert_eq!(DateLocale::English.parse_long_date("29 juin 2017"), None);
        assert_eq!(DateLocale::French.parse_long_date("29 June 2017"), None);
    }

    #[test]
    fn test_malformed_dates() {
        let fr = DateLocale::French;
        assert_eq!(fr.parse_long_date(""), None);
        assert_eq!(fr.parse_long_date("juin 2017"), None);
        assert_eq!(fr.parse_long_date("31 juin 2017"), None);
        assert_eq!(fr.parse_long_date("29 juin 2017 17:00"), None);
        assert_eq!(fr.parse_long_date("2017-06-29"), None);
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("17:00"), NaiveTime::from_hms_opt(17, 0, 0));
        assert_eq!(parse_time_of_day(" 9:30 "), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time_of_day("17h30"), NaiveTime::from_hms_opt(17, 30, 0));
        assert_eq!(parse_time_of_day("18h"), NaiveTime::from_hms_opt(18, 0, 0));
        assert_eq!(parse_time_of_day("noon"), None);
        assert_eq!(parse_time_of_day("25:00"), None);
    }
}
