//! Synthetic bus records served while the upstream feed is unavailable.
//!
//! The output is a pure function of the current time: the same six routes
//! with arrivals staggered at fixed offsets, so a UI can keep rendering.

use chrono::{DateTime, TimeDelta, Utc};

use super::error::FeedError;
use super::normalize::normalize_record;
use super::types::{LocalizedName, NormalizedBusRecord, ParsedBusRecord};

struct MockRoute {
    route: &'static str,
    dest_en: &'static str,
    dest_zh: &'static str,
    area: &'static str,
    district: &'static str,
    eta_offset_mins: i64,
}

const MOCK_ROUTES: [MockRoute; 6] = [
    MockRoute {
        route: "1A",
        dest_en: "Sau Mau Ping (Central)",
        dest_zh: "秀茂坪(中)",
        area: "Kowloon",
        district: "Kwun Tong",
        eta_offset_mins: 2,
    },
    MockRoute {
        route: "2",
        dest_en: "Cheung Sha Wan",
        dest_zh: "長沙灣",
        area: "Kowloon",
        district: "Sham Shui Po",
        eta_offset_mins: 5,
    },
    MockRoute {
        route: "6",
        dest_en: "Lai Chi Kok",
        dest_zh: "荔枝角",
        area: "Kowloon",
        district: "Sham Shui Po",
        eta_offset_mins: 8,
    },
    MockRoute {
        route: "11",
        dest_en: "Diamond Hill Station",
        dest_zh: "鑽石山站",
        area: "Kowloon",
        district: "Wong Tai Sin",
        eta_offset_mins: 1,
    },
    MockRoute {
        route: "40X",
        dest_en: "Wu Kai Sha Station",
        dest_zh: "烏溪沙站",
        area: "New Territories",
        district: "Sha Tin",
        eta_offset_mins: 12,
    },
    MockRoute {
        route: "960",
        dest_en: "Wan Chai North",
        dest_zh: "灣仔北",
        area: "Hong Kong Island",
        district: "Wan Chai",
        eta_offset_mins: 15,
    },
];

/// Number of records `generate` always returns.
pub const MOCK_RECORD_COUNT: usize = MOCK_ROUTES.len();

/// Generate the fallback record list for the given wall-clock time.
pub fn generate(now_millis: i64) -> Result<Vec<NormalizedBusRecord>, FeedError> {
    let now = DateTime::<Utc>::from_timestamp_millis(now_millis).ok_or_else(|| {
        FeedError::Synthesis(format!("timestamp {now_millis} ms is out of range"))
    })?;

    MOCK_ROUTES
        .iter()
        .enumerate()
        .map(|(index, mock)| {
            let eta = now
                .checked_add_signed(TimeDelta::minutes(mock.eta_offset_mins))
                .ok_or_else(|| {
                    FeedError::Synthesis(format!("arrival time for route {} overflows", mock.route))
                })?;

            let parsed = ParsedBusRecord {
                route: mock.route.to_string(),
                destination: LocalizedName::both(mock.dest_en, mock.dest_zh),
                area: Some(mock.area.to_string()),
                district: Some(mock.district.to_string()),
                eta,
                timestamp: Some(now),
                remark: LocalizedName::default(),
            };

            let mut record = normalize_record(index, &parsed, now);
            record.id = format!("mock-{}", record.id);
            Ok(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::BusStatus;
    use chrono::TimeZone;

    fn now_millis() -> i64 {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn fixed_size_and_deterministic() {
        let first = generate(now_millis()).unwrap();
        let second = generate(now_millis()).unwrap();

        assert_eq!(first.len(), MOCK_RECORD_COUNT);
        assert_eq!(first, second);
    }

    #[test]
    fn records_are_plausible() {
        let records = generate(now_millis()).unwrap();

        assert_eq!(records[0].id, "mock-1A-0");
        assert_eq!(records[0].eta_minutes, 2);
        assert_eq!(records[0].status, BusStatus::OnTime);
        assert_eq!(records[3].status, BusStatus::Arriving);

        for record in &records {
            assert!(record.id.starts_with("mock-"));
            assert!(!record.message.en.is_empty());
            assert!(!record.message.zh.is_empty());
            assert!(!record.location.area.is_empty());
            assert!(!record.location.district.is_empty());
            assert_eq!(record.timestamp.timestamp_millis(), now_millis());
        }
    }

    #[test]
    fn unrepresentable_time_is_a_synthesis_failure() {
        assert!(matches!(generate(i64::MAX), Err(FeedError::Synthesis(_))));
    }
}
