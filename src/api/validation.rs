use chrono::NaiveDate;
use serde_json::Value;

use super::ApiError;
use crate::domain::{MAX_PAGE, MediaKind};
use crate::search::SearchError;
use crate::search::normalize::{DATE_FORMAT, RawParams, coerce_int, present};

/// Request-level checks run before the search pipeline sees the parameters.
pub fn validate_search_params(raw: &RawParams) -> Result<(), ApiError> {
    validate_media_type(raw.get("media_type"))?;
    validate_date_range(raw)?;
    validate_page(present(raw, "page"))?;
    Ok(())
}

pub fn validate_media_type(value: Option<&Value>) -> Result<MediaKind, ApiError> {
    let Some(Value::String(raw)) = value else {
        return Err(SearchError::InvalidMediaKind(None).into());
    };

    raw.parse()
        .map_err(|_| SearchError::InvalidMediaKind(Some(raw.clone())).into())
}

fn parse_date(raw: &RawParams, key: &str) -> Result<Option<NaiveDate>, ApiError> {
    let Some(value) = present(raw, key) else {
        return Ok(None);
    };

    let text = value
        .as_str()
        .map_or_else(|| value.to_string(), |s| s.trim().to_string());
    NaiveDate::parse_from_str(&text, DATE_FORMAT)
        .map(Some)
        .map_err(|_| SearchError::InvalidDateFormat(text).into())
}

pub fn validate_date_range(raw: &RawParams) -> Result<(), ApiError> {
    let start = parse_date(raw, "start_date")?;
    let end = parse_date(raw, "end_date")?;

    if let (Some(start), Some(end)) = (start, end)
        && start > end
    {
        return Err(SearchError::InvalidDateRange.into());
    }

    Ok(())
}

pub fn validate_page(value: Option<&Value>) -> Result<(), ApiError> {
    let Some(value) = value else {
        return Ok(());
    };

    if (1..=i64::from(MAX_PAGE)).contains(&coerce_int(value)) {
        Ok(())
    } else {
        Err(SearchError::InvalidPage { max: MAX_PAGE }.into())
    }
}
