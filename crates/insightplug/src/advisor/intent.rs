use serde::{Deserialize, Serialize};

/// Topic a chat question is about. Drives which canned explanation is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Savings,
    Charging,
    Range,
    Incentive,
    General,
}

// First match wins, so order is precedence.
const KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::Savings,
        &[
            "saving",
            "save",
            "cost",
            "payback",
            "pay back",
            "break even",
            "break-even",
            "breakeven",
            "money",
            "cheaper",
            "expensive",
            "tco",
        ],
    ),
    (Intent::Charging, &["charging", "charge", "charger", "home", "plug"]),
    (
        Intent::Range,
        &["range", "utilization", "utilisation", "battery", "distance", "anxiety"],
    ),
    (Intent::Incentive, &["tax", "credit", "incentive", "rebate"]),
];

impl Intent {
    pub fn classify(query: &str) -> Intent {
        let normalized = query.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|word| normalized.contains(word)))
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::General)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Intent::Savings => "savings",
            Intent::Charging => "charging",
            Intent::Range => "range",
            Intent::Incentive => "incentive",
            Intent::General => "general",
        }
    }
}
