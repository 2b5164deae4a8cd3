//! Normalization of parsed records into the bilingual output shape.
//!
//! Every field a consumer renders is filled in here. Missing upstream
//! values are replaced with a default, never passed through as empty.

use chrono::{DateTime, Utc};

use super::types::{
    BusStatus, LocalizedText, Location, NormalizedBusRecord, ParsedBusRecord,
};

const UNKNOWN_AREA: &str = "Unknown area";
const UNKNOWN_DISTRICT: &str = "Unknown district";

/// Normalize a batch. Record ids are derived from the position in the batch.
pub fn normalize_batch(
    records: &[ParsedBusRecord],
    now: DateTime<Utc>,
) -> Vec<NormalizedBusRecord> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_record(index, record, now))
        .collect()
}

/// Normalize one record relative to `now`.
pub fn normalize_record(
    index: usize,
    record: &ParsedBusRecord,
    now: DateTime<Utc>,
) -> NormalizedBusRecord {
    let secs_until = (record.eta - now).num_seconds();
    // Round up so a bus 30 seconds away shows as 1 min, not 0
    let eta_minutes = if secs_until <= 0 {
        0
    } else {
        (secs_until + 59) / 60
    };
    let status = classify(record, secs_until, eta_minutes);

    let area = record
        .area
        .clone()
        .or_else(|| record.destination.en_or_zh().map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_AREA.to_string());
    let district = record
        .district
        .clone()
        .unwrap_or_else(|| UNKNOWN_DISTRICT.to_string());

    NormalizedBusRecord {
        id: format!("{}-{}", record.route, index),
        route: record.route.clone(),
        message: LocalizedText {
            en: english_message(record, status, eta_minutes),
            zh: chinese_message(record, status, eta_minutes),
        },
        location: Location { area, district },
        status,
        eta_minutes,
        timestamp: record.timestamp.unwrap_or(now),
    }
}

fn classify(record: &ParsedBusRecord, secs_until: i64, eta_minutes: i64) -> BusStatus {
    if secs_until < 0 {
        BusStatus::Departed
    } else if eta_minutes <= 1 {
        BusStatus::Arriving
    } else if remark_mentions_delay(record) {
        BusStatus::Delayed
    } else if remark_mentions_schedule(record) {
        BusStatus::Scheduled
    } else {
        BusStatus::OnTime
    }
}

fn remark_mentions_delay(record: &ParsedBusRecord) -> bool {
    record
        .remark
        .en
        .as_deref()
        .is_some_and(|r| r.to_lowercase().contains("delay"))
        || record
            .remark
            .zh
            .as_deref()
            .is_some_and(|r| r.contains("延誤") || r.contains("延迟"))
}

fn remark_mentions_schedule(record: &ParsedBusRecord) -> bool {
    record
        .remark
        .en
        .as_deref()
        .is_some_and(|r| r.to_lowercase().contains("scheduled"))
        || record
            .remark
            .zh
            .as_deref()
            .is_some_and(|r| r.contains("原定班次"))
}

fn english_message(record: &ParsedBusRecord, status: BusStatus, eta_minutes: i64) -> String {
    let phrase = match status {
        BusStatus::Departed => "departed".to_string(),
        BusStatus::Arriving => "arriving now".to_string(),
        BusStatus::Delayed => format!("arriving in {eta_minutes} min (delayed)"),
        BusStatus::Scheduled => format!("arriving in {eta_minutes} min (scheduled)"),
        BusStatus::OnTime => format!("arriving in {eta_minutes} min"),
    };

    match record.destination.en_or_zh() {
        Some(dest) => format!("Route {} to {}: {}", record.route, dest, phrase),
        None => format!("Route {}: {}", record.route, phrase),
    }
}

fn chinese_message(record: &ParsedBusRecord, status: BusStatus, eta_minutes: i64) -> String {
    let phrase = match status {
        BusStatus::Departed => "已開出".to_string(),
        BusStatus::Arriving => "即將到達".to_string(),
        BusStatus::Delayed => format!("{eta_minutes} 分鐘後到達（延誤）"),
        BusStatus::Scheduled => format!("{eta_minutes} 分鐘後到達（原定班次）"),
        BusStatus::OnTime => format!("{eta_minutes} 分鐘後到達"),
    };

    match record.destination.zh_or_en() {
        Some(dest) => format!("{} 線往 {}：{}", record.route, dest, phrase),
        None => format!("{} 線：{}", record.route, phrase),
    }
}
