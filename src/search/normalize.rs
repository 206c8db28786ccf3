//! Turns a loosely-typed parameter bag into a [`NormalizedSearchRequest`].
//!
//! Every field has a total coercion rule. The only hard failures are a
//! missing or unsupported `media_type` and a date that is not `YYYY-MM-DD`.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::SearchError;
use crate::domain::{DEFAULT_SORT, MediaKind, NormalizedSearchRequest};

/// Raw search parameters as received from a caller.
pub type RawParams = Map<String, Value>;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn normalize(raw: &RawParams) -> Result<NormalizedSearchRequest, SearchError> {
    let media_kind = media_kind(raw)?;

    Ok(NormalizedSearchRequest {
        media_kind,
        start_date: date(raw, "start_date")?,
        end_date: date(raw, "end_date")?,
        genre_ids: genre_ids(present(raw, "genre_ids")),
        min_rating: rating(raw, "min_rating"),
        max_rating: rating(raw, "max_rating"),
        sort_token: present(raw, "sort_by").map_or_else(|| DEFAULT_SORT.to_string(), text),
        page: present(raw, "page").map_or(1, page_number),
    })
}

/// Non-finite bounds are dropped and `-0` folds into `0`, so equal bounds
/// always encode the same way.
fn rating(raw: &RawParams, key: &str) -> Option<f64> {
    present(raw, key)
        .map(coerce_float)
        .filter(|v| v.is_finite())
        .map(|v| if v == 0.0 { 0.0 } else { v })
}

fn media_kind(raw: &RawParams) -> Result<MediaKind, SearchError> {
    let Some(value) = present(raw, "media_type") else {
        return Err(SearchError::InvalidMediaKind(None));
    };

    let value = text(value);
    value
        .parse()
        .map_err(|_| SearchError::InvalidMediaKind(Some(value)))
}

fn date(raw: &RawParams, key: &str) -> Result<Option<NaiveDate>, SearchError> {
    present(raw, key)
        .map(|value| {
            let value = text(value);
            NaiveDate::parse_from_str(&value, DATE_FORMAT)
                .map_err(|_| SearchError::InvalidDateFormat(value))
        })
        .transpose()
}

/// Looks up `key`, treating null, blank strings, empty lists and `false` as absent.
#[must_use]
pub fn present<'a>(raw: &'a RawParams, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| !is_blank(value))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(true) | Value::Number(_) => false,
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn genre_ids(value: Option<&Value>) -> Vec<u32> {
    let mut ids: Vec<u32> = match value {
        None => return Vec::new(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| to_genre_id(lenient_int(part)))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| to_genre_id(coerce_int(item)))
            .collect(),
        Some(other) => vec![to_genre_id(coerce_int(other))],
    };

    ids.sort_unstable();
    ids.dedup();
    ids
}

fn to_genre_id(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn page_number(value: &Value) -> u32 {
    u32::try_from(coerce_int(value).max(1)).unwrap_or(u32::MAX)
}

/// Integer coercion; anything non-numeric becomes 0.
#[must_use]
pub fn coerce_int(value: &Value) -> i64 {
    match value {
        #[allow(clippy::cast_possible_truncation)]
        Value::Number(n) => n
            .as_i64()
            .unwrap_or_else(|| n.as_f64().map_or(0, |f| f as i64)),
        Value::String(s) => lenient_int(s),
        _ => 0,
    }
}

/// Float coercion; anything non-numeric becomes 0.0.
#[must_use]
pub fn coerce_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => lenient_float(s),
        _ => 0.0,
    }
}

/// Parses the leading integer of `input` ("12abc" is 12, "abc" is 0).
#[must_use]
pub fn lenient_int(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}

/// Parses the leading decimal number of `input` ("7.5 stars" is 7.5, "abc" is 0.0).
#[must_use]
pub fn lenient_float(input: &str) -> f64 {
    let trimmed = input.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        has_digits = true;
    }

    if !has_digits {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-' | b'+')) {
            exp_end += 1;
        }
        if bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
                exp_end += 1;
            }
            end = exp_end;
        }
    }

    trimmed[..end].parse().unwrap_or(0.0)
}
