//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::BusFeedCache;

/// Shared application state.
pub struct AppState<S> {
    /// Cached upstream bus feed
    pub feed: Arc<BusFeedCache<S>>,
}

impl<S> AppState<S> {
    /// Create a new app state.
    pub fn new(feed: BusFeedCache<S>) -> Self {
        Self {
            feed: Arc::new(feed),
        }
    }
}

// Manual impl: cloning only bumps the Arc, `S` need not be `Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            feed: Arc::clone(&self.feed),
        }
    }
}
