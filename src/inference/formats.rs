//! Scalar type detection for text values
//!
//! Each sample is classified on its own (first matching class wins), then the
//! column gets the kind that reaches the homogeneity threshold, or `String`.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::SchemaOptions;
use super::types::ScalarKind;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}|\d{4}/\d{2}/\d{2}|\d{2}-\d{2}-\d{4})$")
        .unwrap()
});

static TIMESTAMP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?Z?$").unwrap()
});

static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}(:\d{2}(\.\d+)?)?$").unwrap());

const BOOLEAN_TRUE: [&str; 4] = ["true", "yes", "1", "on"];
const BOOLEAN_FALSE: [&str; 4] = ["false", "no", "0", "off"];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Trim and collapse internal whitespace runs to a single space
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Classify a single non-empty value
pub fn classify(value: &str, options: &SchemaOptions) -> ScalarKind {
    if options.boolean_detection && parse_boolean(value).is_some() {
        ScalarKind::Boolean
    } else if options.numeric_detection && value.parse::<i64>().is_ok() {
        ScalarKind::Integer
    } else if options.numeric_detection && value.parse::<f64>().is_ok() {
        ScalarKind::Double
    } else if options.temporal_detection && DATE_PATTERN.is_match(value) {
        ScalarKind::Date
    } else if options.temporal_detection && TIMESTAMP_PATTERN.is_match(value) {
        ScalarKind::Timestamp
    } else if options.temporal_detection && TIME_PATTERN.is_match(value) {
        ScalarKind::Time
    } else {
        ScalarKind::String
    }
}

/// Pick the column kind for a set of samples by majority vote
pub fn detect_scalar_kind<S: AsRef<str>>(samples: &[S], options: &SchemaOptions) -> ScalarKind {
    let mut counts: HashMap<ScalarKind, usize> = HashMap::new();
    let mut total = 0usize;

    for sample in samples {
        let sample = sample.as_ref();
        if sample.is_empty() {
            continue;
        }
        total += 1;
        *counts.entry(classify(sample, options)).or_insert(0) += 1;
    }

    if total == 0 {
        return ScalarKind::String;
    }

    // Iterate kinds in a fixed order so a threshold <= 0.5 stays deterministic
    ScalarKind::ALL
        .into_iter()
        .find(|kind| {
            let count = counts.get(kind).copied().unwrap_or(0);
            count > 0 && count as f64 / total as f64 >= options.homogeneity_threshold
        })
        .unwrap_or(ScalarKind::String)
}

/// Boolean value of a text, if it is one of the recognised spellings
pub fn parse_boolean(value: &str) -> Option<bool> {
    let lower = value.to_ascii_lowercase();
    if BOOLEAN_TRUE.contains(&lower.as_str()) {
        Some(true)
    } else if BOOLEAN_FALSE.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.strip_suffix('Z').unwrap_or(value);
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}
