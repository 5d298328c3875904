use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::domain::{CanonicalField, cell_text};
use crate::error::CellIssue;

static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})(?:[ T]\d{1,2}:\d{2}(?::\d{2})?)?$").unwrap()
});

static YEAR_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})[/.\-](\d{1,2})[/.\-](\d{1,2})(?:[ T]\d{1,2}:\d{2}(?::\d{2})?)?$").unwrap()
});

/// Comma is the decimal separator. Inner whitespace, negative and non-finite
/// values are rejected.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', ".");
    if cleaned.is_empty() || cleaned.contains(char::is_whitespace) {
        return None;
    }
    let value = cleaned.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

pub fn load_or_zero(text: &str) -> f64 {
    parse_decimal(text).unwrap_or(0.0)
}

pub fn parse_load(value: &Value) -> Result<f64, CellIssue> {
    let malformed = |raw: String| CellIssue::MalformedNumber {
        field: CanonicalField::Load,
        raw,
    };
    match value {
        Value::Number(number) => number
            .as_f64()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or_else(|| malformed(number.to_string())),
        other => match cell_text(other) {
            None => Ok(0.0),
            Some(text) if text.trim().is_empty() => Ok(0.0),
            Some(text) => parse_decimal(&text).ok_or_else(|| malformed(text)),
        },
    }
}

pub fn parse_count(field: CanonicalField, value: &Value) -> Result<Option<u32>, CellIssue> {
    let Some(text) = cell_text(value) else {
        return Ok(None);
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    parse_decimal(&text)
        .filter(|count| *count >= 1.0 && count.fract() == 0.0 && *count <= f64::from(u32::MAX))
        .map(|count| Some(count as u32))
        .ok_or(CellIssue::MalformedCount { field, raw: text })
}

/// Day-first calendar date (`05/01/2026`, `5-1-26`, `05.01.2026 14:30`).
/// Year-first ISO text (`2026-01-05`) is accepted as well. Two-digit years
/// follow the POSIX pivot: 69..=99 map to 19xx, the rest to 20xx.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Some(caps) = YEAR_FIRST.captures(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    let caps = DAY_FIRST.captures(text)?;
    let day = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let year_text = &caps[3];
    let mut year: i32 = year_text.parse().ok()?;
    if year_text.len() == 2 {
        year += if year >= 69 { 1900 } else { 2000 };
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn parse_date_cell(value: &Value) -> Result<NaiveDate, CellIssue> {
    let raw = cell_text(value).unwrap_or_default();
    parse_date(&raw).ok_or(CellIssue::MalformedDate { raw })
}
