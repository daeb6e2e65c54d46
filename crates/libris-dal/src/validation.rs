//! Predicates classifying raw request values.
//!
//! JSON payloads arrive as [`serde_json::Value`] so that numbers sent as
//! strings (`"1999"`) are accepted the same way as real numbers.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde_json::Value;

/// Years after the current one that are still accepted, for planned releases.
pub const PLANNED_PUBLISHING_BUFFER: i32 = 5;

pub const ISBN_LENGTH: usize = 13;

pub const MIN_PASSWORD_LENGTH: usize = 8;

static IMAGE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^https?://[^\s/$.?#].[^\s]*\.(?:png|jpg|jpeg|gif|bmp|webp|svg)$")
        .case_insensitive(true)
        .build()
        .expect("valid image url pattern")
});

pub fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

pub fn is_string_provided(candidate: &Value) -> bool {
    matches!(candidate, Value::String(s) if !s.is_empty())
}

/// Numeric value of `candidate` if it is a number or a non-empty string
/// holding a finite number.
pub fn coerce_number(candidate: &Value) -> Option<f64> {
    match candidate {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Like [`coerce_number`] but only for integral values fitting into `i64`.
pub fn coerce_integer(candidate: &Value) -> Option<i64> {
    if let Value::Number(n) = candidate {
        if let Some(i) = n.as_i64() {
            return Some(i);
        }
    }
    coerce_number(candidate)
        .filter(|n| n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64)
        .map(|n| n as i64)
}

pub fn is_number_provided(candidate: &Value) -> bool {
    coerce_number(candidate).is_some()
}

/// Exactly 13 digits after trimming.
pub fn is_valid_isbn(candidate: &str) -> bool {
    let candidate = candidate.trim();
    candidate.len() == ISBN_LENGTH && candidate.bytes().all(|b| b.is_ascii_digit())
}

pub fn publication_year(candidate: &Value) -> Option<i32> {
    let max = current_year() + PLANNED_PUBLISHING_BUFFER;
    coerce_integer(candidate)
        .filter(|year| (0..=max as i64).contains(year))
        .map(|year| year as i32)
}

pub fn is_valid_publication_year(candidate: &Value) -> bool {
    publication_year(candidate).is_some()
}

pub fn is_valid_image_url(candidate: &str) -> bool {
    IMAGE_URL_RE.is_match(candidate)
}

pub fn is_valid_password(candidate: &str) -> bool {
    candidate.chars().count() >= MIN_PASSWORD_LENGTH
}

pub fn is_defined(candidate: Option<&Value>) -> bool {
    matches!(candidate, Some(v) if !v.is_null())
}
