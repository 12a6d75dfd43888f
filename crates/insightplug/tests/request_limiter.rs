use insightplug::limiter::{
    Admission, FileLimiterStore, InMemoryLimiterStore, LimitReason, LimiterConfig, LimiterStore,
    ManualClock, RequestLimiter, StoreError,
};
use std::sync::Arc;
use std::thread;

const START: i64 = 1_767_225_600_000;

fn memory_limiter(config: LimiterConfig) -> RequestLimiter<InMemoryLimiterStore, ManualClock> {
    RequestLimiter::with_clock(
        config,
        Arc::new(InMemoryLimiterStore::new()),
        ManualClock::starting_at(START),
    )
}

#[test]
fn seventh_instant_request_is_rate_limited() {
    let limiter = memory_limiter(LimiterConfig::default());
    for _ in 0..6 {
        limiter.record("chat");
    }

    match limiter.check_and_record("chat") {
        Admission::Denied(decision) => {
            assert!(!decision.allowed);
            assert_eq!(decision.reason, Some(LimitReason::Rate));
            assert_eq!(decision.retry_after_ms, Some(60_000));
        }
        other => panic!("expected denial, got {other:?}"),
    }
}

#[test]
fn denied_attempts_consume_nothing() {
    let limiter = memory_limiter(LimiterConfig::default());
    for _ in 0..6 {
        limiter.record("chat");
    }
    let before = limiter.peek("chat").remaining;
    for _ in 0..10 {
        assert!(!limiter.check_and_record("chat").is_admitted());
    }
    assert_eq!(limiter.peek("chat").remaining, before);
}

#[test]
fn peek_is_idempotent() {
    let limiter = memory_limiter(LimiterConfig::default());
    limiter.record("chat");
    let first = limiter.peek("chat");
    for _ in 0..25 {
        assert_eq!(limiter.peek("chat"), first);
    }
}

#[test]
fn window_reopens_after_full_duration() {
    let limiter = memory_limiter(LimiterConfig::default());
    for _ in 0..6 {
        limiter.record("chat");
    }
    limiter.clock().advance(59_999);
    assert_eq!(limiter.peek("chat").reason, Some(LimitReason::Rate));
    assert_eq!(limiter.peek("chat").retry_after_ms, Some(1));

    limiter.clock().advance(1);
    let decision = limiter.peek("chat");
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 14);
}

#[test]
fn lifetime_cap_is_permanent() {
    let limiter = memory_limiter(LimiterConfig::default());
    for round in 0..4 {
        for _ in 0..5 {
            assert!(limiter.check_and_record("chat").is_admitted());
        }
        limiter.clock().advance(60_000 * (round + 1));
    }

    for _ in 0..3 {
        limiter.clock().advance(86_400_000);
        match limiter.check_and_record("chat") {
            Admission::Denied(decision) => {
                assert_eq!(decision.reason, Some(LimitReason::Lifetime));
                assert_eq!(decision.remaining, 0);
                assert_eq!(decision.retry_after_ms, None);
            }
            other => panic!("expected lifetime denial, got {other:?}"),
        }
    }
}

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = LimiterConfig {
        max_lifetime: 3,
        ..LimiterConfig::default()
    };

    {
        let store = Arc::new(FileLimiterStore::open(dir.path()).expect("store opens"));
        let limiter = RequestLimiter::with_clock(config, store, ManualClock::starting_at(START));
        limiter.record("chat:session-a");
        limiter.record("chat:session-a");
    }

    let store = Arc::new(FileLimiterStore::open(dir.path()).expect("store reopens"));
    let limiter = RequestLimiter::with_clock(config, store, ManualClock::starting_at(START + 1));
    assert_eq!(limiter.peek("chat:session-a").remaining, 1);
    assert!(limiter.check_and_record("chat:session-a").is_admitted());
    assert_eq!(
        limiter.peek("chat:session-a").reason,
        Some(LimitReason::Lifetime)
    );
}

#[test]
fn state_with_unknown_and_missing_fields_is_accepted() {
    let store = Arc::new(InMemoryLimiterStore::new());
    store
        .set("chat", &format!(r#"{{"timestamps":[{START}],"version":2}}"#))
        .expect("seed");
    let limiter = RequestLimiter::with_clock(
        LimiterConfig::default(),
        store,
        ManualClock::starting_at(START + 10),
    );

    let decision = limiter.peek("chat");
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 20);
}

#[derive(Debug, Default)]
struct BrokenStore;

impl LimiterStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }
}

#[test]
fn failing_store_degrades_to_process_memory() {
    let limiter = RequestLimiter::with_clock(
        LimiterConfig {
            max_per_window: 2,
            ..LimiterConfig::default()
        },
        Arc::new(BrokenStore),
        ManualClock::starting_at(START),
    );

    assert!(limiter.check_and_record("chat").is_admitted());
    assert!(limiter.check_and_record("chat").is_admitted());
    assert!(!limiter.check_and_record("chat").is_admitted());
}

/// Reads succeed but every write is rejected, like a read-only state dir.
#[derive(Debug, Default)]
struct ReadOnlyStore;

impl LimiterStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only filesystem".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

#[test]
fn rejected_writes_still_count_against_quotas() {
    let limiter = RequestLimiter::with_clock(
        LimiterConfig::default(),
        Arc::new(ReadOnlyStore),
        ManualClock::starting_at(START),
    );

    let admitted = (0..50)
        .filter(|_| limiter.check_and_record("chat:s").is_admitted())
        .count();
    assert_eq!(admitted, 6);
    assert_eq!(limiter.peek("chat:s").reason, Some(LimitReason::Rate));

    for _ in 0..10 {
        limiter.clock().advance(60_000);
        while limiter.check_and_record("chat:s").is_admitted() {}
    }
    assert_eq!(limiter.peek("chat:s").reason, Some(LimitReason::Lifetime));
}

#[test]
fn missing_state_dir_falls_back_without_losing_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state_dir = dir.path().join("limits");
    let store = Arc::new(FileLimiterStore::open(&state_dir).expect("store opens"));
    std::fs::remove_dir_all(&state_dir).expect("state dir removed");

    let limiter = RequestLimiter::with_clock(
        LimiterConfig {
            max_lifetime: 2,
            ..LimiterConfig::default()
        },
        store,
        ManualClock::starting_at(START),
    );
    assert!(limiter.check_and_record("chat:s").is_admitted());
    assert!(limiter.check_and_record("chat:s").is_admitted());
    assert!(!limiter.check_and_record("chat:s").is_admitted());
}

#[test]
fn file_backed_sessions_with_similar_ids_stay_independent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let limiter = RequestLimiter::with_clock(
        LimiterConfig {
            max_lifetime: 1,
            ..LimiterConfig::default()
        },
        Arc::new(FileLimiterStore::open(dir.path()).expect("store opens")),
        ManualClock::starting_at(START),
    );

    assert!(limiter.check_and_record("chat:a.b").is_admitted());
    for other in ["chat:a_b", "chat/a/b", "chat:a b"] {
        let decision = limiter.peek(other);
        assert!(decision.allowed, "{other}");
        assert_eq!(decision.remaining, 1);
    }
}

#[test]
fn concurrent_callers_never_exceed_the_window() {
    let limiter = Arc::new(memory_limiter(LimiterConfig {
        max_per_window: 6,
        window_duration_ms: 60_000,
        max_lifetime: 1_000,
    }));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            thread::spawn(move || {
                (0..4)
                    .filter(|_| limiter.check_and_record("shared").is_admitted())
                    .count()
            })
        })
        .collect();

    let admitted: usize = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker finished"))
        .sum();
    assert_eq!(admitted, 6);
}
