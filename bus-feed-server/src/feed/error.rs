//! Bus feed error types.

use std::time::Duration;

/// Errors from fetching and decoding the upstream feed.
///
/// Every variant except `Synthesis`, `FallbackFailed` and `ClockOutOfRange`
/// is a transient upstream failure that the cache recovers from by serving mock data.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, connection refused, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream did not answer within the fetch timeout
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    /// Upstream returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Payload is not JSON or not a recognised shape
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Payload carried no records at all
    #[error("upstream returned an empty payload")]
    EmptyPayload,

    /// Every record failed validation
    #[error("no valid records in upstream payload ({rejected} rejected)")]
    NoValidRecords { rejected: usize },

    /// The wall clock reading cannot be represented as a timestamp
    #[error("clock reading {0} ms is out of range")]
    ClockOutOfRange(i64),

    /// The fallback generator itself failed
    #[error("failed to synthesize fallback data: {0}")]
    Synthesis(String),

    /// Upstream failed and so did the fallback that should have covered it
    #[error("{upstream}; {fallback}")]
    FallbackFailed {
        upstream: String,
        #[source]
        fallback: Box<FeedError>,
    },
}

impl FeedError {
    /// Messages for a response's `errors` list, one per distinct failure.
    pub fn messages(&self) -> Vec<String> {
        match self {
            FeedError::FallbackFailed { upstream, fallback } => {
                vec![upstream.clone(), fallback.to_string()]
            }
            other => vec![other.to_string()],
        }
    }
}

/// Why a single upstream record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("record is not a JSON object")]
    NotAnObject,

    /// A field had the wrong JSON type
    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid timestamp in {field}: {value}")]
    InvalidTime { field: &'static str, value: String },
}
