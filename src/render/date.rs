use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{RenderError, RenderResult};

/// Display locale for bound dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Egyptian Arabic: Arabic-Indic digits, Gregorian month names.
    #[default]
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "en")]
    English,
}

const ARABIC_MONTHS: [&str; 12] = [
    "يناير",
    "فبراير",
    "مارس",
    "أبريل",
    "مايو",
    "يونيو",
    "يوليو",
    "أغسطس",
    "سبتمبر",
    "أكتوبر",
    "نوفمبر",
    "ديسمبر",
];

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Accepts a plain ISO-8601 date or a full RFC 3339 timestamp.
pub fn parse_issue_date(raw: &str) -> RenderResult<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|stamp| stamp.date_naive()))
        .map_err(|_| RenderError::InvalidIssueDate {
            value: raw.to_string(),
        })
}

pub fn format_date(date: NaiveDate, locale: Locale) -> String {
    let month_index = date.month0() as usize;
    match locale {
        Locale::Arabic => format!(
            "{} {} {}",
            arabic_digits(date.day()),
            ARABIC_MONTHS[month_index],
            arabic_digits(date.year())
        ),
        Locale::English => format!(
            "{} {}, {}",
            ENGLISH_MONTHS[month_index],
            date.day(),
            date.year()
        ),
    }
}

pub fn format_issue_date(raw: &str, locale: Locale) -> RenderResult<String> {
    parse_issue_date(raw).map(|date| format_date(date, locale))
}

fn arabic_digits(value: impl ToString) -> String {
    value
        .to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(digit) => char::from_u32(0x0660 + digit).unwrap_or(c),
            None => c,
        })
        .collect()
}
