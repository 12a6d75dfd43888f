use super::intent::Intent;
use crate::economics::{BreakEven, ChargingInterval, DerivedMetrics, VehicleProfile};
use serde::{Deserialize, Serialize};

/// Profile and the metrics already derived from it.
#[derive(Debug, Clone, Copy)]
pub struct AdvisorContext<'a> {
    pub profile: &'a VehicleProfile,
    pub metrics: &'a DerivedMetrics,
}

impl<'a> AdvisorContext<'a> {
    pub fn new(profile: &'a VehicleProfile, metrics: &'a DerivedMetrics) -> Self {
        Self { profile, metrics }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub intent: Intent,
    pub text: String,
}

/// Dashboard summary of a whole ownership period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorSummary {
    pub total_savings: f64,
    /// First projection year in which the EV is ahead; `None` when it never is.
    pub break_even_year: Option<u32>,
    pub key_insights: Vec<String>,
    pub recommendation: String,
}

/// Offline, rule-based explainer. Never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrativeComposer;

impl NarrativeComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(&self, query: &str, context: &AdvisorContext<'_>) -> Narrative {
        let intent = Intent::classify(query);
        Narrative {
            intent,
            text: self.explain(intent, context),
        }
    }

    pub fn explain(&self, intent: Intent, context: &AdvisorContext<'_>) -> String {
        let AdvisorContext { profile, metrics } = *context;
        match intent {
            Intent::Savings => {
                let delta = if metrics.monthly_surplus >= 0.0 {
                    format!(
                        "Monthly surplus is around {}.",
                        format_currency(metrics.monthly_surplus)
                    )
                } else {
                    format!(
                        "Monthly deficit is around {}.",
                        format_currency(metrics.monthly_surplus.abs())
                    )
                };
                let payback = match metrics.break_even {
                    BreakEven::Years(years) if years == 0.0 => {
                        "There is no upfront premium to recover.".to_string()
                    }
                    BreakEven::Years(years) => format!(
                        "Running-cost savings repay the upfront premium in about {years:.1} years."
                    ),
                    BreakEven::Unreachable => {
                        "At these energy prices the upfront premium is not recovered from running costs."
                            .to_string()
                    }
                };
                format!("{delta} {payback}")
            }
            Intent::Charging => {
                let home_share = (profile.home_charging_ratio * 100.0).round();
                let cadence = match metrics.charging_interval {
                    ChargingInterval::Days(days) => format!(
                        "You would recharge about every {days} days at your current driving pace."
                    ),
                    ChargingInterval::Unlimited => {
                        "At your current driving pace a recharge is effectively never forced."
                            .to_string()
                    }
                };
                format!(
                    "{cadence} With {home_share:.0}% home charging your blended rate is ${:.2}/kWh; a higher home share improves the cash flow signal.",
                    metrics.blended_rate_per_kwh
                )
            }
            Intent::Range => {
                let buffer = if metrics.daily_asset_utilization_pct >= 80.0 {
                    "which leaves little buffer for unplanned trips"
                } else {
                    "so the range buffer is healthy"
                };
                format!(
                    "Daily utilization is about {:.1}% of your EPA range ({} miles), {buffer}.",
                    metrics.daily_asset_utilization_pct, profile.vehicle.epa_range_miles
                )
            }
            Intent::Incentive => format!(
                "This analysis applies a {} incentive, bringing the EV price to {}. Eligibility depends on the vehicle and your tax situation, so confirm it before counting on it.",
                format_currency(profile.tax_incentive),
                format_currency(profile.net_ev_price())
            ),
            Intent::General => {
                "I can explain the cash-flow signal, the charging interval or the utilization trade-off if you name a focus."
                    .to_string()
            }
        }
    }

    pub fn summarize(&self, context: &AdvisorContext<'_>) -> AdvisorSummary {
        let AdvisorContext { profile, metrics } = *context;
        let final_savings = metrics.final_savings();
        let years = profile.ownership_years;

        let interval = match metrics.charging_interval {
            ChargingInterval::Days(days) => format!("roughly every {days} days"),
            ChargingInterval::Unlimited => "effectively never".to_string(),
        };

        let recommendation = if final_savings >= 0.0 {
            format!(
                "Projected total cost advantage for the EV is about {} over {years} years.",
                format_currency(final_savings)
            )
        } else {
            format!(
                "Projected total cost advantage for the gasoline car is about {} over {years} years.",
                format_currency(final_savings.abs())
            )
        };

        AdvisorSummary {
            total_savings: final_savings.max(0.0),
            break_even_year: metrics.projection_break_even_year(),
            key_insights: vec![
                format!(
                    "Daily utilization is about {:.1}% of range, leaving buffer for variability.",
                    metrics.daily_asset_utilization_pct
                ),
                format!("Charging is needed {interval} at current usage."),
                format!(
                    "Estimated monthly operating delta is {}.",
                    format_currency(metrics.monthly_surplus)
                ),
            ],
            recommendation,
        }
    }
}

/// Whole-dollar amount with thousands separators, e.g. `$12,345` or `-$80`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}")
}
