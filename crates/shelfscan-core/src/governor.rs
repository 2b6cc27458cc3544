//! Sliding-window rate governor for outbound lookup and search traffic.
//!
//! Bounds how many governed operations a caller may start per time
//! window, independent of any inbound HTTP rate limiting. Purely
//! in-process and best-effort: counters live in memory and do not
//! survive a restart.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Sliding-window counter keyed by caller identity (IP, user id, or a
/// fixed default key for global throttling).
///
/// Each admitted operation records its timestamp; before admitting a new
/// one the governor drops timestamps older than the window and rejects
/// if the remaining count has reached the maximum. Check-then-append
/// happens under one lock, so concurrent callers on the same key cannot
/// both slip past the limit.
pub struct RateGovernor {
    max_requests: usize,
    window: Duration,
    requests: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateGovernor {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Admits or rejects an operation for `caller_key` as of now.
    pub fn admit(&self, caller_key: &str) -> bool {
        self.admit_at(caller_key, Instant::now())
    }

    /// Admits or rejects an operation for `caller_key` as of `now`.
    ///
    /// Time is a parameter so tests can drive the window without
    /// sleeping. `now` must not move backwards between calls on the
    /// same key; stale timestamps are simply never evicted otherwise.
    pub fn admit_at(&self, caller_key: &str, now: Instant) -> bool {
        let mut requests = self
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let timestamps = requests.entry(caller_key.to_owned()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            tracing::debug!(
                caller = caller_key,
                in_window = timestamps.len(),
                max = self.max_requests,
                "rate governor rejected operation"
            );
            return false;
        }

        timestamps.push(now);
        true
    }
}

/// Independent governors per governed capability (e.g. `"lookup"` for
/// barcode resolution, `"search"` for retailer searches), each with its
/// own window and limit.
#[derive(Default)]
pub struct GovernorSet {
    governors: HashMap<String, RateGovernor>,
}

impl GovernorSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a capability with its own limit and window.
    #[must_use]
    pub fn with_capability(mut self, capability: &str, max_requests: usize, window: Duration) -> Self {
        self.governors
            .insert(capability.to_owned(), RateGovernor::new(max_requests, window));
        self
    }

    /// Admits or rejects one operation for `caller_key` under
    /// `capability_key`. Capabilities never registered are ungoverned
    /// and always admitted.
    pub fn admit(&self, caller_key: &str, capability_key: &str) -> bool {
        match self.governors.get(capability_key) {
            Some(governor) => governor.admit(caller_key),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(60_000);

    #[test]
    fn admits_up_to_the_limit_then_rejects() {
        let governor = RateGovernor::new(5, WINDOW);
        let now = Instant::now();
        for _ in 0..5 {
            assert!(governor.admit_at("10.0.0.1", now));
        }
        assert!(!governor.admit_at("10.0.0.1", now));
    }

    #[test]
    fn admits_again_after_the_window_passes() {
        let governor = RateGovernor::new(5, WINDOW);
        let start = Instant::now();
        for _ in 0..5 {
            assert!(governor.admit_at("10.0.0.1", start));
        }
        assert!(!governor.admit_at("10.0.0.1", start + Duration::from_millis(59_999)));
        assert!(governor.admit_at("10.0.0.1", start + Duration::from_millis(60_001)));
    }

    #[test]
    fn callers_are_counted_independently() {
        let governor = RateGovernor::new(1, WINDOW);
        let now = Instant::now();
        assert!(governor.admit_at("alice", now));
        assert!(!governor.admit_at("alice", now));
        assert!(governor.admit_at("bob", now));
    }

    #[test]
    fn window_slides_rather_than_resets() {
        let governor = RateGovernor::new(2, Duration::from_millis(100));
        let start = Instant::now();
        assert!(governor.admit_at("k", start));
        assert!(governor.admit_at("k", start + Duration::from_millis(60)));
        // First timestamp has aged out; the one from t=60 has not.
        assert!(governor.admit_at("k", start + Duration::from_millis(110)));
        assert!(!governor.admit_at("k", start + Duration::from_millis(120)));
    }

    #[test]
    fn capabilities_are_governed_separately() {
        let set = GovernorSet::new()
            .with_capability("lookup", 1, WINDOW)
            .with_capability("search", 1, WINDOW);
        assert!(set.admit("alice", "lookup"));
        assert!(!set.admit("alice", "lookup"));
        assert!(set.admit("alice", "search"));
    }

    #[test]
    fn unregistered_capability_is_ungoverned() {
        let set = GovernorSet::new().with_capability("lookup", 1, WINDOW);
        assert!(set.admit("alice", "export"));
        assert!(set.admit("alice", "export"));
    }
}
