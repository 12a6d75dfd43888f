use serde::{Deserialize, Serialize};

/// Quotas applied to every key guarded by a limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    pub max_per_window: u32,
    pub window_duration_ms: u64,
    pub max_lifetime: u32,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            max_per_window: 6,
            window_duration_ms: 60_000,
            max_lifetime: 20,
        }
    }
}
