use super::break_even::BreakEven;
use super::projection::ProjectionPoint;
use super::tco::TcoSummary;
use super::utilization::ChargingInterval;
use serde::{Deserialize, Serialize};

/// Everything the engine derives from one profile. Recomputed on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub legacy_monthly_cost: f64,
    pub efficient_monthly_cost: f64,
    pub monthly_surplus: f64,
    pub blended_rate_per_kwh: f64,
    pub daily_asset_utilization_pct: f64,
    pub charging_interval: ChargingInterval,
    pub break_even: BreakEven,
    pub cost_projection: Vec<ProjectionPoint>,
    pub tco: TcoSummary,
}

impl DerivedMetrics {
    /// Cumulative savings at the end of the ownership period.
    pub fn final_savings(&self) -> f64 {
        self.cost_projection
            .last()
            .map(|point| point.cumulative_savings)
            .unwrap_or_default()
    }

    pub fn projection_break_even_year(&self) -> Option<u32> {
        super::projection::projection_break_even_year(&self.cost_projection)
    }
}
