//! Upstream live bus-arrival feed.
//!
//! This module fetches the third-party feed, validates each record and
//! maps the survivors into a stable bilingual shape. It also provides the
//! synthetic records used when the feed is unavailable.
//!
//! Key characteristics of the upstream:
//! - The schema is controlled externally and treated as untrusted
//! - Records arrive either as a bare array or wrapped in `{"data": [...]}`
//! - Times are RFC 3339 with a local offset

mod client;
mod error;
pub mod mock;
mod normalize;
mod parse;
mod types;

pub use client::{FeedConfig, FeedSource, HttpFeedSource};
pub use error::{FeedError, ParseError};
pub use normalize::{normalize_batch, normalize_record};
pub use parse::{ParsedBatch, parse_payload, parse_record};
pub use types::{
    BusStatus, LocalizedName, LocalizedText, Location, NormalizedBusRecord, ParsedBusRecord,
    RawBusFields, RawFeedRecord, RouteField,
};
