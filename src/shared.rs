//! # Shared Matcher Module
//!
//! Copy-on-write matcher snapshots for concurrent request handling.
//!
//! Matching is pure and read-only, so any number of request threads may
//! share one [`Matcher`] without synchronization - the only thing that
//! must be coordinated is replacing the route set. `SharedMatcher` wraps
//! the matcher in a lock-free [`ArcSwap`]: readers `load()` a snapshot
//! per request, writers build a complete new matcher and `store()` it
//! atomically. In-flight requests keep matching against the snapshot
//! they loaded.

use std::sync::Arc;

use arc_swap::ArcSwap;
use http::Method;

use crate::matcher::{MatchOutcome, Matcher};

/// Lock-free shared handle to the current matcher snapshot.
#[derive(Debug)]
pub struct SharedMatcher {
    inner: ArcSwap<Matcher>,
}

impl SharedMatcher {
    #[must_use]
    pub fn new(matcher: Matcher) -> Self {
        SharedMatcher {
            inner: ArcSwap::from_pointee(matcher),
        }
    }

    /// The current snapshot. Hold it for the duration of one request.
    #[must_use]
    pub fn load(&self) -> Arc<Matcher> {
        self.inner.load_full()
    }

    /// Atomically replace the snapshot with a freshly built matcher.
    pub fn store(&self, matcher: Matcher) {
        self.inner.store(Arc::new(matcher));
    }

    /// Convenience: match against the current snapshot.
    #[must_use]
    pub fn match_route(
        &self,
        method: &Method,
        path: &str,
        query: &[(String, String)],
    ) -> MatchOutcome {
        self.inner.load().match_route(method, path, query)
    }
}
