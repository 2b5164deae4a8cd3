//! Validation of upstream payloads.
//!
//! The upstream schema is outside our control, so every field is checked
//! before use. A bad record is dropped on its own; only a payload with no
//! usable records at all is an error.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::error::{FeedError, ParseError};
use super::types::{LocalizedName, ParsedBusRecord, RawBusFields, RawFeedRecord, RouteField};

/// Longest slice of a bad value echoed back in an error.
const MAX_ECHO_CHARS: usize = 64;

/// Records that survived validation, and how many did not.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBatch {
    pub records: Vec<ParsedBusRecord>,
    pub rejected: usize,
}

/// Parse a raw upstream body into validated records.
///
/// Accepts either a top-level array of records or an object carrying the
/// array under `data`. An empty body, an empty array and a batch in which
/// every record is invalid are all errors.
pub fn parse_payload(body: &str) -> Result<ParsedBatch, FeedError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(FeedError::EmptyPayload);
    }

    let value: Value = serde_json::from_str(body).map_err(|e| FeedError::Json {
        message: e.to_string(),
    })?;

    let entries = extract_entries(value)?;
    if entries.is_empty() {
        return Err(FeedError::EmptyPayload);
    }

    let mut records = Vec::with_capacity(entries.len());
    let mut rejected = 0;

    for (index, entry) in entries.into_iter().enumerate() {
        match parse_record(entry) {
            Ok(record) => records.push(record),
            Err(e) => {
                rejected += 1;
                debug!(index, error = %e, "dropping malformed feed record");
            }
        }
    }

    if records.is_empty() {
        return Err(FeedError::NoValidRecords { rejected });
    }

    Ok(ParsedBatch { records, rejected })
}

/// Pull the list of entries out of the payload envelope.
fn extract_entries(value: Value) -> Result<Vec<RawFeedRecord>, FeedError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Err(FeedError::EmptyPayload),
            Some(_) => Err(FeedError::Json {
                message: "`data` is not an array".to_string(),
            }),
        },
        Value::Null => Err(FeedError::EmptyPayload),
        _ => Err(FeedError::Json {
            message: "expected an array of records or an object with `data`".to_string(),
        }),
    }
}

/// Validate a single upstream entry.
pub fn parse_record(raw: RawFeedRecord) -> Result<ParsedBusRecord, ParseError> {
    if !raw.is_object() {
        return Err(ParseError::NotAnObject);
    }

    let fields: RawBusFields =
        serde_json::from_value(raw).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let route = match fields.route {
        Some(RouteField::Text(s)) => non_blank(s),
        Some(RouteField::Number(n)) => Some(n.to_string()),
        None => None,
    }
    .ok_or(ParseError::MissingField("route"))?;

    let eta = fields
        .eta
        .and_then(non_blank)
        .ok_or(ParseError::MissingField("eta"))?;
    let eta = parse_time("eta", &eta)?;

    let timestamp = match fields.data_timestamp.and_then(non_blank) {
        Some(t) => Some(parse_time("data_timestamp", &t)?),
        None => fields
            .timestamp
            .and_then(non_blank)
            .map(|t| parse_time("timestamp", &t))
            .transpose()?,
    };

    Ok(ParsedBusRecord {
        route,
        destination: LocalizedName {
            en: fields.dest_en.and_then(non_blank),
            zh: fields.dest_tc.and_then(non_blank),
        },
        area: fields.area.and_then(non_blank),
        district: fields.district.and_then(non_blank),
        eta,
        timestamp,
        remark: LocalizedName {
            en: fields.rmk_en.and_then(non_blank),
            zh: fields.rmk_tc.and_then(non_blank),
        },
    })
}

/// Trim a string, treating blank as absent.
fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_time(field: &'static str, value: &str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ParseError::InvalidTime {
            field,
            value: value.chars().take(MAX_ECHO_CHARS).collect(),
        })
}
