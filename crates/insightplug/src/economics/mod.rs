//! Deterministic EV versus gasoline cost signals.
//!
//! Every calculation is a pure function of a [`VehicleProfile`] and the
//! engine's [`EngineAssumptions`]; nothing here performs I/O.

mod break_even;
mod error;
mod metrics;
mod monthly;
mod profile;
mod projection;
mod tco;
mod utilization;

pub use break_even::BreakEven;
pub use error::EconomicsError;
pub use metrics::DerivedMetrics;
pub use monthly::MonthlyCosts;
pub use profile::{RegionProfile, VehicleProfile, VehicleSpec};
pub use projection::{projection_break_even_year, ProjectionPoint};
pub use tco::{MileageBreakEven, TcoSummary};
pub use utilization::{ChargingInterval, UtilizationSignals};

#[cfg(test)]
pub(crate) use profile::fixtures;

use serde::{Deserialize, Serialize};

/// Fixed constants the formulas rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineAssumptions {
    /// Public charging price as a multiple of the residential rate.
    pub public_rate_multiplier: f64,
    pub days_per_month: f64,
    pub days_per_year: f64,
    pub ice_maintenance_per_year: f64,
    pub ev_maintenance_per_year: f64,
    pub ice_depreciation_rate: f64,
    pub ev_depreciation_rate: f64,
    pub tco_years: u32,
}

impl Default for EngineAssumptions {
    fn default() -> Self {
        Self {
            public_rate_multiplier: 2.5,
            days_per_month: 30.4,
            days_per_year: 365.0,
            ice_maintenance_per_year: 1_200.0,
            ev_maintenance_per_year: 400.0,
            ice_depreciation_rate: 0.15,
            ev_depreciation_rate: 0.10,
            tco_years: 5,
        }
    }
}

/// Stateless engine applying the assumptions to a profile.
#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    assumptions: EngineAssumptions,
}

impl SignalEngine {
    pub fn new(assumptions: EngineAssumptions) -> Self {
        Self { assumptions }
    }

    pub fn standard() -> Self {
        Self::default()
    }

    pub fn assumptions(&self) -> &EngineAssumptions {
        &self.assumptions
    }

    pub fn monthly_costs(&self, profile: &VehicleProfile) -> Result<MonthlyCosts, EconomicsError> {
        monthly::monthly_costs(&self.assumptions, profile)
    }

    pub fn blended_rate(&self, profile: &VehicleProfile) -> f64 {
        monthly::blended_rate(&self.assumptions, profile)
    }

    pub fn utilization_signals(
        &self,
        profile: &VehicleProfile,
    ) -> Result<UtilizationSignals, EconomicsError> {
        utilization::utilization_signals(profile)
    }

    pub fn break_even(
        &self,
        profile: &VehicleProfile,
        monthly_surplus: f64,
    ) -> Result<BreakEven, EconomicsError> {
        break_even::break_even(profile, monthly_surplus)
    }

    pub fn projection(
        &self,
        profile: &VehicleProfile,
    ) -> Result<Vec<ProjectionPoint>, EconomicsError> {
        projection::projection(&self.assumptions, profile)
    }

    pub fn tco(&self, profile: &VehicleProfile, years: u32) -> Result<TcoSummary, EconomicsError> {
        tco::tco(&self.assumptions, profile, years)
    }

    /// Validates the profile once, then runs every calculation.
    pub fn derive(&self, profile: &VehicleProfile) -> Result<DerivedMetrics, EconomicsError> {
        profile.validate()?;

        let costs = self.monthly_costs(profile)?;
        let signals = self.utilization_signals(profile)?;
        let break_even = self.break_even(profile, costs.surplus())?;
        let cost_projection = self.projection(profile)?;
        let tco = self.tco(profile, self.assumptions.tco_years)?;

        Ok(DerivedMetrics {
            legacy_monthly_cost: costs.legacy,
            efficient_monthly_cost: costs.efficient,
            monthly_surplus: costs.surplus(),
            blended_rate_per_kwh: self.blended_rate(profile),
            daily_asset_utilization_pct: signals.daily_asset_utilization_pct,
            charging_interval: signals.charging_interval,
            break_even,
            cost_projection,
            tco,
        })
    }
}
