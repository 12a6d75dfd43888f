//! Sliding-window plus lifetime-cap gate for expensive, per-session operations.
//!
//! Denial is a normal outcome: no method on [`RequestLimiter`] returns an error.
//! Store failures and corrupt persisted state are logged and absorbed.

mod clock;
mod config;
mod state;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LimiterConfig;
pub use state::LimiterState;
pub use store::{FileLimiterStore, InMemoryLimiterStore, LimiterStore, StoreError};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Which quota rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitReason {
    Rate,
    Lifetime,
}

impl LimitReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rate => "too many requests in the current window",
            Self::Lifetime => "session request allowance used up",
        }
    }
}

/// Snapshot of a key's standing against its quotas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<LimitReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
    pub remaining: u32,
}

impl LimitDecision {
    pub fn summary(&self) -> String {
        match (self.reason, self.retry_after_ms) {
            (None, _) => format!("allowed ({} remaining)", self.remaining),
            (Some(LimitReason::Rate), Some(ms)) => format!(
                "denied: {}; retry in {}s",
                LimitReason::Rate.label(),
                ms.div_ceil(1000)
            ),
            (Some(reason), _) => format!("denied: {}", reason.label()),
        }
    }
}

/// Result of [`RequestLimiter::check_and_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The attempt was recorded; carries the post-update standing.
    Admitted(LimitDecision),
    /// Nothing was recorded.
    Denied(LimitDecision),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted(_))
    }

    pub fn decision(&self) -> &LimitDecision {
        match self {
            Admission::Admitted(decision) | Admission::Denied(decision) => decision,
        }
    }

    pub fn into_decision(self) -> LimitDecision {
        match self {
            Admission::Admitted(decision) | Admission::Denied(decision) => decision,
        }
    }
}

/// Limiter instance owning its quotas, store and clock.
///
/// Reads and writes for one key happen under that key's lock, so a
/// `check_and_record` cannot interleave with another call on the same key.
pub struct RequestLimiter<S: ?Sized, C = SystemClock> {
    config: LimiterConfig,
    store: Arc<S>,
    clock: C,
    fallback: InMemoryLimiterStore,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S> RequestLimiter<S, SystemClock>
where
    S: LimiterStore + ?Sized,
{
    pub fn new(config: LimiterConfig, store: Arc<S>) -> Self {
        Self::with_clock(config, store, SystemClock)
    }
}

impl<S, C> RequestLimiter<S, C>
where
    S: LimiterStore + ?Sized,
    C: Clock,
{
    pub fn with_clock(config: LimiterConfig, store: Arc<S>, clock: C) -> Self {
        Self {
            config,
            store,
            clock,
            fallback: InMemoryLimiterStore::new(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Evaluates the key's standing without mutating it.
    pub fn peek(&self, key: &str) -> LimitDecision {
        self.with_key_lock(key, || {
            let now = self.clock.now_ms();
            let mut state = self.load(key);
            state.prune(self.config.window_duration_ms, now);
            self.evaluate(&state, now)
        })
    }

    /// Records one event unconditionally and returns the post-update standing.
    pub fn record(&self, key: &str) -> LimitDecision {
        self.with_key_lock(key, || {
            let now = self.clock.now_ms();
            let mut state = self.load(key);
            state.prune(self.config.window_duration_ms, now);
            self.append(key, &mut state, now)
        })
    }

    /// Records only when the key is currently allowed; a denial consumes nothing.
    pub fn check_and_record(&self, key: &str) -> Admission {
        self.with_key_lock(key, || {
            let now = self.clock.now_ms();
            let mut state = self.load(key);
            state.prune(self.config.window_duration_ms, now);

            let decision = self.evaluate(&state, now);
            if !decision.allowed {
                debug!(key, reason = ?decision.reason, "limiter denied request");
                return Admission::Denied(decision);
            }

            Admission::Admitted(self.append(key, &mut state, now))
        })
    }

    /// Clears all bookkeeping for a key.
    pub fn reset(&self, key: &str) {
        self.with_key_lock(key, || {
            if let Err(err) = self.store.remove(key) {
                warn!(key, error = %err, "limiter store remove failed");
            }
            let _ = self.fallback.remove(key);
        })
    }

    fn append(&self, key: &str, state: &mut LimiterState, now: i64) -> LimitDecision {
        state.timestamps.push(now);
        state.total = state.total.saturating_add(1);
        self.persist(key, state);
        self.evaluate(state, now)
    }

    fn evaluate(&self, state: &LimiterState, now: i64) -> LimitDecision {
        let max_lifetime = u64::from(self.config.max_lifetime);
        let remaining = max_lifetime.saturating_sub(state.total);
        let remaining = u32::try_from(remaining).unwrap_or(u32::MAX);

        if state.total >= max_lifetime {
            return LimitDecision {
                allowed: false,
                reason: Some(LimitReason::Lifetime),
                retry_after_ms: None,
                remaining: 0,
            };
        }

        if state.timestamps.len() >= self.config.max_per_window as usize {
            let oldest = state.oldest().unwrap_or(now);
            let elapsed = u64::try_from(now.saturating_sub(oldest)).unwrap_or(0);
            return LimitDecision {
                allowed: false,
                reason: Some(LimitReason::Rate),
                retry_after_ms: Some(self.config.window_duration_ms.saturating_sub(elapsed)),
                remaining,
            };
        }

        LimitDecision {
            allowed: true,
            reason: None,
            retry_after_ms: None,
            remaining,
        }
    }

    fn load(&self, key: &str) -> LimiterState {
        // A fallback entry means the last write to the store failed, so the
        // store copy is stale or missing.
        let degraded = self.fallback.get(key).ok().flatten();
        let raw = match degraded {
            Some(raw) => Some(raw),
            None => match self.store.get(key) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(key, error = %err, "limiter store read failed; starting from empty state");
                    None
                }
            },
        };

        let Some(raw) = raw else {
            return LimiterState::default();
        };

        let (state, discarded) = LimiterState::decode(&raw);
        if discarded {
            warn!(key, "discarded malformed limiter state");
        }
        state
    }

    fn persist(&self, key: &str, state: &LimiterState) {
        let encoded = state.encode();
        match self.store.set(key, &encoded) {
            Ok(()) => {
                let _ = self.fallback.remove(key);
            }
            Err(err) => {
                warn!(key, error = %err, "limiter store write failed; keeping process-local state");
                let _ = self.fallback.set(key, &encoded);
            }
        }
    }

    /// Runs `f` inside the key's critical section, dropping the lock entry
    /// afterwards when no other caller is waiting on it.
    fn with_key_lock<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = lock_ignoring_poison(&self.locks);
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let result = {
            let _guard = lock_ignoring_poison(&*lock);
            f()
        };

        let mut locks = lock_ignoring_poison(&self.locks);
        // One reference in the map plus ours.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
        result
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        lock_ignoring_poison(&self.locks).len()
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(config: LimiterConfig) -> RequestLimiter<InMemoryLimiterStore, ManualClock> {
        RequestLimiter::with_clock(
            config,
            Arc::new(InMemoryLimiterStore::new()),
            ManualClock::starting_at(1_700_000_000_000),
        )
    }

    #[test]
    fn fresh_key_is_allowed_with_full_allowance() {
        let limiter = limiter(LimiterConfig::default());
        let decision = limiter.peek("chat");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 20);
        assert_eq!(decision.reason, None);
    }

    #[test]
    fn record_returns_post_update_standing() {
        let limiter = limiter(LimiterConfig::default());
        let decision = limiter.record("chat");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 19);
    }

    #[test]
    fn rate_denial_reports_retry_hint_from_oldest_event() {
        let limiter = limiter(LimiterConfig {
            max_per_window: 2,
            window_duration_ms: 10_000,
            max_lifetime: 20,
        });
        limiter.record("chat");
        limiter.clock().advance(4_000);
        limiter.record("chat");
        limiter.clock().advance(1_000);

        let decision = limiter.peek("chat");
        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some(LimitReason::Rate));
        assert_eq!(decision.retry_after_ms, Some(5_000));
        assert_eq!(decision.remaining, 18);
    }

    #[test]
    fn sixth_admission_is_recorded_even_though_the_window_is_now_full() {
        let limiter = limiter(LimiterConfig::default());
        for _ in 0..5 {
            assert!(limiter.check_and_record("chat").is_admitted());
        }
        match limiter.check_and_record("chat") {
            Admission::Admitted(decision) => {
                assert!(!decision.allowed);
                assert_eq!(decision.reason, Some(LimitReason::Rate));
            }
            other => panic!("expected admission, got {other:?}"),
        }
        assert_eq!(limiter.peek("chat").remaining, 14);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(LimiterConfig {
            max_per_window: 1,
            ..LimiterConfig::default()
        });
        assert!(limiter.check_and_record("a").is_admitted());
        assert!(!limiter.check_and_record("a").is_admitted());
        assert!(limiter.check_and_record("b").is_admitted());
    }

    #[test]
    fn reset_restores_allowance() {
        let limiter = limiter(LimiterConfig {
            max_lifetime: 1,
            ..LimiterConfig::default()
        });
        limiter.record("chat");
        assert_eq!(limiter.peek("chat").reason, Some(LimitReason::Lifetime));
        limiter.reset("chat");
        assert!(limiter.peek("chat").allowed);
    }

    #[test]
    fn corrupt_state_is_treated_as_empty() {
        let store = Arc::new(InMemoryLimiterStore::new());
        store.set("chat", "{{{").expect("memory store accepts writes");
        let limiter = RequestLimiter::with_clock(
            LimiterConfig::default(),
            store.clone(),
            ManualClock::starting_at(0),
        );

        let decision = limiter.check_and_record("chat");
        assert!(decision.is_admitted());
        assert_eq!(decision.decision().remaining, 19);

        let raw = store.get("chat").expect("read").expect("state written");
        assert_eq!(raw, r#"{"timestamps":[0],"total":1}"#);
    }

    #[test]
    fn lock_entries_are_released_after_each_call() {
        let limiter = limiter(LimiterConfig::default());
        for n in 0..100 {
            limiter.peek(&format!("chat:visitor-{n}"));
        }
        limiter.record("chat:a");
        limiter.check_and_record("chat:b");
        limiter.reset("chat:a");
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn summary_reads_naturally() {
        let decision = LimitDecision {
            allowed: false,
            reason: Some(LimitReason::Rate),
            retry_after_ms: Some(1_200),
            remaining: 4,
        };
        assert_eq!(
            decision.summary(),
            "denied: too many requests in the current window; retry in 2s"
        );
    }
}
