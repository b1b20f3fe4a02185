//! Per-entity shield open counter.
//!
//! Counts are scoped to the UTC calendar day by key construction, so a
//! new day implicitly resets the count to 0 on first read. A short
//! debounce window guards against duplicate invocations for a single
//! presentation (the host may re-render the shield within the same
//! interaction).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::store::PrefStore;

/// Two invocations closer together than this count as one presentation.
const DEBOUNCE_WINDOW_SECS: f64 = 2.0;

const OPENS_PREFIX: &str = "shield.opens";

pub struct OpenCounter {
    store: Arc<dyn PrefStore>,
}

impl OpenCounter {
    pub fn new(store: Arc<dyn PrefStore>) -> Self {
        Self { store }
    }

    fn count_key(entity_key: &str, now: DateTime<Utc>) -> String {
        format!("{OPENS_PREFIX}.{}.{entity_key}", now.format("%Y-%m-%d"))
    }

    fn last_seen_key(entity_key: &str) -> String {
        format!("{OPENS_PREFIX}.lastSeen.{entity_key}")
    }

    /// Today's count for the entity. Pure read; missing or mistyped
    /// state reads as 0.
    pub fn current(&self, entity_key: &str, now: DateTime<Utc>) -> i64 {
        self.store
            .get(&Self::count_key(entity_key, now))
            .and_then(|value| value.as_i64())
            .unwrap_or(0)
    }

    /// Debounced read-modify-write: returns the stored count unchanged
    /// (writing nothing) when the last bump was under the debounce
    /// window ago, otherwise increments today's count and records `now`.
    ///
    /// Known limitations: the store offers no transaction primitive, so
    /// concurrent bumps from separate processes can lose increments;
    /// the debounce compares wall-clock epoch seconds, so a clock
    /// adjustment can double-count or hold the counter until the clock
    /// passes the stored timestamp again.
    pub fn bump(&self, entity_key: &str, now: DateTime<Utc>) -> i64 {
        let now_secs = now.timestamp_millis() as f64 / 1000.0;
        let last_seen = self
            .store
            .get(&Self::last_seen_key(entity_key))
            .and_then(|value| value.as_f64());

        if let Some(last_seen) = last_seen {
            if now_secs - last_seen < DEBOUNCE_WINDOW_SECS {
                return self.current(entity_key, now);
            }
        }

        let next = self.current(entity_key, now) + 1;
        self.store.set(&Self::count_key(entity_key, now), json!(next));
        self.store.set(&Self::last_seen_key(entity_key), json!(now_secs));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn counter_over(store: Arc<MemoryStore>) -> OpenCounter {
        OpenCounter::new(store)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_first_bump_returns_one() {
        let store = Arc::new(MemoryStore::new());
        let counter = counter_over(store);
        assert_eq!(counter.bump("app:com.x", at(1_000_000)), 1);
    }

    #[test]
    fn test_bump_debounces_within_window() {
        let store = Arc::new(MemoryStore::new());
        let counter = counter_over(store.clone());

        let t0 = at(1_000_000);
        assert_eq!(counter.bump("app:com.x", t0), 1);

        let before = store.snapshot();
        assert_eq!(counter.bump("app:com.x", t0 + chrono::Duration::seconds(1)), 1);
        // The debounced call must not touch the store.
        assert_eq!(store.snapshot(), before);

        assert_eq!(counter.bump("app:com.x", t0 + chrono::Duration::seconds(2)), 2);
    }

    #[test]
    fn test_current_is_pure_and_defaults_to_zero() {
        let store = Arc::new(MemoryStore::new());
        let counter = counter_over(store.clone());

        assert_eq!(counter.current("app:com.x", at(1_000_000)), 0);
        assert!(store.snapshot().is_empty());

        // Mistyped stored count degrades to 0 instead of failing.
        store.set(
            "shield.opens.1970-01-12.app:com.x",
            serde_json::json!("three"),
        );
        assert_eq!(counter.current("app:com.x", at(1_000_000)), 0);
    }

    #[test]
    fn test_day_rollover_resets_count() {
        let store = Arc::new(MemoryStore::new());
        let counter = counter_over(store);

        let day_one = at(1_000_000);
        counter.bump("domain:example.com", day_one);
        counter.bump("domain:example.com", day_one + chrono::Duration::seconds(10));
        assert_eq!(counter.current("domain:example.com", day_one), 2);

        let next_day = day_one + chrono::Duration::days(1);
        assert_eq!(counter.current("domain:example.com", next_day), 0);
        // First bump of the new day starts from 1 again.
        assert_eq!(counter.bump("domain:example.com", next_day), 1);
    }

    #[test]
    fn test_keys_are_isolated_per_entity() {
        let store = Arc::new(MemoryStore::new());
        let counter = counter_over(store);

        let now = at(1_000_000);
        counter.bump("app:com.x", now);
        assert_eq!(counter.current("app:com.y", now), 0);
    }
}
