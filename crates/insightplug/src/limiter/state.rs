use serde::Serialize;
use serde_json::Value;

/// Persisted bookkeeping for one limiter key.
///
/// Stored as `{"timestamps": [..], "total": n}`. Decoding is lenient: unknown
/// fields are ignored and a missing or malformed field falls back to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LimiterState {
    pub timestamps: Vec<i64>,
    pub total: u64,
}

impl LimiterState {
    /// Returns the decoded state and whether anything had to be discarded.
    pub fn decode(raw: &str) -> (Self, bool) {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(_) => return (Self::default(), true),
        };

        let Some(object) = value.as_object() else {
            return (Self::default(), true);
        };

        let mut discarded = false;
        let mut timestamps = match object.get("timestamps") {
            Some(Value::Array(items)) => {
                let parsed: Vec<i64> = items.iter().filter_map(Value::as_i64).collect();
                discarded |= parsed.len() != items.len();
                parsed
            }
            Some(_) => {
                discarded = true;
                Vec::new()
            }
            None => Vec::new(),
        };
        timestamps.sort_unstable();

        let total = match object.get("total") {
            Some(value) => match value.as_u64() {
                Some(total) => total,
                None => {
                    discarded = true;
                    0
                }
            },
            None => 0,
        };

        (Self { timestamps, total }, discarded)
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Drops timestamps at or before `now - window_ms`.
    pub fn prune(&mut self, window_ms: u64, now_ms: i64) {
        let cutoff = now_ms.saturating_sub(i64::try_from(window_ms).unwrap_or(i64::MAX));
        self.timestamps.retain(|ts| *ts > cutoff);
    }

    pub fn oldest(&self) -> Option<i64> {
        self.timestamps.first().copied()
    }
}
