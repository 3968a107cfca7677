use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::{HISTORICAL_SOURCE, SNAPSHOT_SOURCE, TIME_SERIES_SOURCE};
use crate::error::{Result, TrackerError};
use crate::types::{CountryTimeline, RawProvinceRecord, RawSnapshotRecord, Timeline};

/// A decoded batch plus the number of elements that had to be skipped
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decode a JSON array element by element. A non-array payload is an
/// `InvalidInput` error; elements that fail to decode are skipped.
pub fn decode_array<T: DeserializeOwned>(source_name: &str, bytes: &[u8]) -> Result<Decoded<T>> {
    let value: Value = serde_json::from_slice(bytes)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(TrackerError::InvalidInput {
                source_name: source_name.to_string(),
                found: json_kind(&other).to_string(),
            })
        }
    };

    let total = items.len();
    let mut records = Vec::with_capacity(total);
    let mut skipped = 0;
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Skipping malformed {} element {}: {}", source_name, index, e);
                skipped += 1;
            }
        }
    }

    debug!("Decoded {}/{} {} elements", records.len(), total, source_name);
    Ok(Decoded { records, skipped })
}

/// Mistyped fields inside a row degrade to absent; a row is skipped only when
/// it is not an object or carries no country name
pub fn decode_time_series(bytes: &[u8]) -> Result<Decoded<RawProvinceRecord>> {
    let mut decoded: Decoded<RawProvinceRecord> = decode_array(TIME_SERIES_SOURCE, bytes)?;
    let before = decoded.records.len();
    decoded.records.retain(|record| !record.country.trim().is_empty());
    let unnamed = before - decoded.records.len();
    if unnamed > 0 {
        warn!("Skipping {} {} rows without a country name", unnamed, TIME_SERIES_SOURCE);
        decoded.skipped += unnamed;
    }
    Ok(decoded)
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<Decoded<RawSnapshotRecord>> {
    decode_array(SNAPSHOT_SOURCE, bytes)
}

/// The global endpoint answers with a bare timeline
pub fn decode_global_timeline(bytes: &[u8]) -> Result<Timeline> {
    let value: Value = serde_json::from_slice(bytes)?;
    if !value.is_object() {
        return Err(TrackerError::InvalidInput {
            source_name: HISTORICAL_SOURCE.to_string(),
            found: json_kind(&value).to_string(),
        });
    }
    Ok(serde_json::from_value(value)?)
}

/// The per-country endpoint wraps the timeline with the country name
pub fn decode_country_timeline(bytes: &[u8]) -> Result<CountryTimeline> {
    let value: Value = serde_json::from_slice(bytes)?;
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return Err(TrackerError::Api {
            message: message.to_string(),
        });
    }
    if !value.is_object() {
        return Err(TrackerError::InvalidInput {
            source_name: HISTORICAL_SOURCE.to_string(),
            found: json_kind(&value).to_string(),
        });
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_payload_is_invalid_input() {
        let err = decode_time_series(b"null").unwrap_err();
        match err {
            TrackerError::InvalidInput { source_name, found } => {
                assert_eq!(source_name, "jhucsse");
                assert_eq!(found, "null");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_object_payload_is_invalid_input() {
        let err = decode_snapshot(br#"{"message":"nope"}"#).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidInput { .. }));
    }

    #[test]
    fn test_malformed_elements_are_skipped() {
        let payload = json!([
            { "country": "Peru", "province": null, "stats": { "confirmed": 1, "deaths": 0 } },
            { "country": "Chile", "stats": "not-an-object" },
            42,
            { "country": 12, "stats": { "confirmed": 1, "deaths": 0 } },
            { "province": "Nowhere", "stats": { "confirmed": 1, "deaths": 0 } },
            { "country": "Bolivia", "stats": null }
        ]);

        let decoded = decode_time_series(payload.to_string().as_bytes()).unwrap();
        let names: Vec<&str> = decoded.records.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["Peru", "Chile", "Bolivia"]);
        assert_eq!(decoded.records[1].stats, None);
        assert_eq!(decoded.skipped, 3);
    }

    #[test]
    fn test_empty_array() {
        let decoded = decode_snapshot(b"[]").unwrap();
        assert!(decoded.records.is_empty());
        assert_eq!(decoded.skipped, 0);
    }

    #[test]
    fn test_not_json_is_json_error() {
        assert!(matches!(decode_time_series(b"<html>").unwrap_err(), TrackerError::Json(_)));
    }

    #[test]
    fn test_country_timeline_message_is_api_error() {
        let body = br#"{"message":"Country not found or doesn't have any historical data"}"#;
        assert!(matches!(decode_country_timeline(body).unwrap_err(), TrackerError::Api { .. }));
    }

    #[test]
    fn test_country_timeline_decodes() {
        let body = json!({
            "country": "Canada",
            "province": ["mainland"],
            "timeline": { "cases": { "1/22/20": 0 }, "deaths": { "1/22/20": 0 }, "recovered": {} }
        });
        let decoded = decode_country_timeline(body.to_string().as_bytes()).unwrap();
        assert_eq!(decoded.country, "Canada");
        assert_eq!(decoded.timeline.cases.len(), 1);
    }

    #[test]
    fn test_global_timeline_rejects_array() {
        assert!(matches!(decode_global_timeline(b"[]").unwrap_err(), TrackerError::InvalidInput { .. }));
    }
}
