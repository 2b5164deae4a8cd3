//! Live bus-arrival feed proxy.
//!
//! Fetches a third-party transit feed, normalizes it into a stable
//! bilingual shape and caches it, serving deterministic synthetic data
//! whenever the upstream is unavailable.

pub mod cache;
pub mod clock;
pub mod config;
pub mod feed;
pub mod web;

#[cfg(test)]
mod testing;
