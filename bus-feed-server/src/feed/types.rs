//! Bus feed record types.
//!
//! Three shapes flow through the proxy: the untrusted upstream entry,
//! the validated subset that survives parsing, and the bilingual record
//! served to callers. Only the last one is part of the public wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the upstream payload, before any validation.
pub type RawFeedRecord = serde_json::Value;

/// Upstream fields the parser knows how to read.
///
/// Everything is optional here; `parse` decides what is required.
/// The field names follow the public ETA feeds (`dest_en`, `rmk_tc`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBusFields {
    /// Route number. Some feeds send it as a JSON number.
    pub route: Option<RouteField>,

    /// Destination, English.
    pub dest_en: Option<String>,

    /// Destination, Traditional Chinese.
    pub dest_tc: Option<String>,

    pub area: Option<String>,
    pub district: Option<String>,

    /// Estimated arrival (RFC 3339).
    pub eta: Option<String>,

    /// When the upstream produced this estimate (RFC 3339).
    pub data_timestamp: Option<String>,

    /// Older spelling of `data_timestamp`; used only when that is absent.
    pub timestamp: Option<String>,

    /// Remark, English (e.g. "Scheduled Bus").
    pub rmk_en: Option<String>,

    /// Remark, Traditional Chinese.
    pub rmk_tc: Option<String>,
}

/// A route identifier as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RouteField {
    Text(String),
    Number(u64),
}

/// A name that may be known in either language, both or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedName {
    pub en: Option<String>,
    pub zh: Option<String>,
}

impl LocalizedName {
    /// Create a name known in both languages.
    pub fn both(en: impl Into<String>, zh: impl Into<String>) -> Self {
        Self {
            en: Some(en.into()),
            zh: Some(zh.into()),
        }
    }

    /// English text, falling back to Chinese.
    pub fn en_or_zh(&self) -> Option<&str> {
        self.en.as_deref().or(self.zh.as_deref())
    }

    /// Chinese text, falling back to English.
    pub fn zh_or_en(&self) -> Option<&str> {
        self.zh.as_deref().or(self.en.as_deref())
    }
}

/// An upstream record that passed shape validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBusRecord {
    /// Route identifier, trimmed and non-empty.
    pub route: String,

    /// Where the bus is heading.
    pub destination: LocalizedName,

    pub area: Option<String>,
    pub district: Option<String>,

    /// Estimated arrival.
    pub eta: DateTime<Utc>,

    /// Upstream data timestamp, if the feed sent one.
    pub timestamp: Option<DateTime<Utc>>,

    pub remark: LocalizedName,
}

/// Text in both supported languages. Neither variant is ever empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub zh: String,
}

/// Where a record applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub area: String,
    pub district: String,
}

/// Arrival status shown next to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusStatus {
    /// Due within a minute.
    Arriving,
    OnTime,
    Delayed,
    /// Timetabled run without live tracking.
    Scheduled,
    /// Estimate already in the past.
    Departed,
}

/// The stable record shape served to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBusRecord {
    pub id: String,
    pub route: String,
    pub message: LocalizedText,
    pub location: Location,
    pub status: BusStatus,
    /// Whole minutes until arrival, never negative.
    pub eta_minutes: i64,
    pub timestamp: DateTime<Utc>,
}
