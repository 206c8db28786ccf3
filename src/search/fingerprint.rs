//! Deterministic cache keys for normalized search requests.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::domain::NormalizedSearchRequest;

/// SHA-256 over the request's fields encoded as JSON in sorted key order,
/// rendered as 64 lowercase hex characters.
///
/// Field-wise equal requests always produce the same key, whatever the key
/// order or representation of the parameters they were normalized from.
#[must_use]
pub fn fingerprint(req: &NormalizedSearchRequest) -> String {
    let digest = Sha256::digest(canonical_json(req).as_bytes());

    digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

fn canonical_json(req: &NormalizedSearchRequest) -> String {
    let date = |d: Option<chrono::NaiveDate>| {
        d.map_or(Value::Null, |d| Value::String(d.format("%Y-%m-%d").to_string()))
    };

    let genre_ids = if req.genre_ids.is_empty() {
        Value::Null
    } else {
        Value::from(req.genre_ids.clone())
    };

    let fields: BTreeMap<&str, Value> = BTreeMap::from([
        ("end_date", date(req.end_date)),
        ("genre_ids", genre_ids),
        ("max_rating", req.max_rating.map_or(Value::Null, Value::from)),
        ("media_type", Value::from(req.media_kind.as_str())),
        ("min_rating", req.min_rating.map_or(Value::Null, Value::from)),
        ("page", Value::from(req.page)),
        ("sort_by", Value::from(req.sort_token.as_str())),
        ("start_date", date(req.start_date)),
    ]);

    // A map of plain JSON values always serializes.
    serde_json::to_string(&fields).unwrap_or_default()
}
