//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::clock::Clock;
use crate::feed::{FeedError, FeedSource};

/// 2026-10-19 08:00:00 UTC (16:00 in Hong Kong).
pub(crate) fn start_millis() -> i64 {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0)
        .unwrap()
        .timestamp_millis()
}

/// A clock that only moves when told to.
pub(crate) struct ManualClock(AtomicI64);

impl ManualClock {
    pub(crate) fn new(millis: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(millis)))
    }

    pub(crate) fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a `StubSource` answers with.
#[derive(Debug, Clone)]
pub(crate) enum StubResponse {
    Body(String),
    Status(u16),
    /// Never answers within any sane timeout.
    Hang,
}

/// A feed source with a canned response that counts its calls.
#[derive(Clone)]
pub(crate) struct StubSource {
    response: Arc<Mutex<StubResponse>>,
    calls: Arc<AtomicUsize>,
}

impl StubSource {
    pub(crate) fn new(response: StubResponse) -> Self {
        Self {
            response: Arc::new(Mutex::new(response)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn body(body: impl Into<String>) -> Self {
        Self::new(StubResponse::Body(body.into()))
    }

    pub(crate) fn set(&self, response: StubResponse) {
        *self.response.lock().unwrap() = response;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FeedSource for StubSource {
    async fn fetch(&self) -> Result<String, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.response.lock().unwrap().clone();
        match response {
            StubResponse::Body(body) => Ok(body),
            StubResponse::Status(status) => Err(FeedError::Api {
                status,
                message: "stub failure".to_string(),
            }),
            StubResponse::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(FeedError::EmptyPayload)
            }
        }
    }
}

/// A realistic upstream payload with three valid records and one bad one.
pub(crate) fn sample_payload() -> String {
    json!({
        "type": "ETA",
        "version": "1.0",
        "generated_timestamp": "2026-10-19T15:59:45+08:00",
        "data": [
            {
                "co": "KMB", "route": "1A", "dir": "O", "service_type": 1, "seq": 1,
                "dest_tc": "秀茂坪(中)", "dest_en": "SAU MAU PING (CENTRAL)",
                "eta_seq": 1, "eta": "2026-10-19T16:03:00+08:00",
                "rmk_tc": "", "rmk_en": "",
                "data_timestamp": "2026-10-19T15:59:30+08:00"
            },
            {
                "co": "KMB", "route": "1A", "dir": "O", "service_type": 1, "seq": 1,
                "dest_tc": "秀茂坪(中)", "dest_en": "SAU MAU PING (CENTRAL)",
                "eta_seq": 2, "eta": "2026-10-19T16:14:00+08:00",
                "rmk_tc": "原定班次", "rmk_en": "Scheduled Bus",
                "data_timestamp": "2026-10-19T15:59:30+08:00"
            },
            {
                "co": "KMB", "route": "1A", "dir": "O", "service_type": 1, "seq": 1,
                "dest_tc": "秀茂坪(中)", "dest_en": "SAU MAU PING (CENTRAL)",
                "eta_seq": 3, "eta": null,
                "rmk_tc": "", "rmk_en": "",
                "data_timestamp": "2026-10-19T15:59:30+08:00"
            },
            {
                "co": "KMB", "route": "2", "dir": "O", "service_type": 1, "seq": 4,
                "dest_tc": "長沙灣", "dest_en": "CHEUNG SHA WAN",
                "area": "Kowloon", "district": "Sham Shui Po",
                "eta_seq": 1, "eta": "2026-10-19T16:06:00+08:00",
                "rmk_tc": "", "rmk_en": "",
                "data_timestamp": "2026-10-19T15:59:30+08:00"
            }
        ]
    })
    .to_string()
}
