//! Data transfer objects for web responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{BusData, DataSource};
use crate::feed::NormalizedBusRecord;

/// Envelope returned by the bus data endpoint.
///
/// Error responses use the same shape so clients need one decoder.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusDataResponse {
    /// Bus records, possibly synthetic
    pub records: Vec<NormalizedBusRecord>,

    /// `live`, `cached` or `mock`
    pub source: DataSource,

    /// When the records were produced
    pub fetched_at: DateTime<Utc>,

    /// Why the data is not live, if it is not
    pub errors: Vec<String>,
}

impl BusDataResponse {
    /// An empty envelope carrying a single error message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            source: DataSource::Mock,
            fetched_at: Utc::now(),
            errors: vec![message.into()],
        }
    }
}

impl From<BusData> for BusDataResponse {
    fn from(data: BusData) -> Self {
        Self {
            fetched_at: data.fetched_at(),
            records: data.records,
            source: data.source,
            errors: data.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case_envelope() {
        let response = BusDataResponse::from(BusData {
            records: Vec::new(),
            source: DataSource::Cached,
            fetched_at_millis: 1_792_396_800_000,
            errors: Vec::new(),
        });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["source"], "cached");
        assert_eq!(json["fetchedAt"], "2026-10-19T08:00:00Z");
        assert!(json["records"].as_array().unwrap().is_empty());
        assert!(json["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn rejected_envelope() {
        let response = BusDataResponse::rejected("method POST not allowed");

        assert!(response.records.is_empty());
        assert_eq!(response.source, DataSource::Mock);
        assert_eq!(response.errors, vec!["method POST not allowed".to_string()]);
    }
}
