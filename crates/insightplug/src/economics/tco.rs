use super::error::{require_positive, require_years, EconomicsError};
use super::monthly::blended_rate;
use super::profile::VehicleProfile;
use super::EngineAssumptions;
use serde::{Deserialize, Serialize};

/// Distance the EV must cover before its lower per-mile cost repays the premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MileageBreakEven {
    Miles { miles: f64 },
    /// Per-mile cost is not lower for the EV; carries the (non-positive) advantage.
    Never { per_mile_advantage: f64 },
}

impl MileageBreakEven {
    pub fn miles(&self) -> Option<f64> {
        match self {
            MileageBreakEven::Miles { miles } => Some(*miles),
            MileageBreakEven::Never { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TcoSummary {
    pub years: u32,
    pub total_ice_cost: f64,
    pub total_ev_cost: f64,
    /// ICE total minus EV total.
    pub tco_savings: f64,
    pub break_even_miles: MileageBreakEven,
}

pub(crate) fn tco(
    assumptions: &EngineAssumptions,
    profile: &VehicleProfile,
    years: u32,
) -> Result<TcoSummary, EconomicsError> {
    let years = require_years("years", years)?;
    let mpg = require_positive("ice_mpg", profile.ice_mpg)?;
    let efficiency = require_positive("ev_efficiency", profile.ev_efficiency)?;

    let horizon = f64::from(years);
    let blended = blended_rate(assumptions, profile);
    let annual_miles = profile.daily_miles * assumptions.days_per_year;

    let annual_fuel = annual_miles / mpg * profile.gas_price_per_gallon;
    let annual_electric = annual_miles / efficiency * blended;
    let ice_depreciation = profile.ice_price * assumptions.ice_depreciation_rate;
    let ev_depreciation = profile.ev_price * assumptions.ev_depreciation_rate;

    // Maintenance enters as the profile's differential, charged to the ICE
    // side. The yearly projection uses the per-drivetrain constants instead.
    let total_ice_cost = profile.ice_price
        + horizon * (annual_fuel + ice_depreciation)
        + horizon * profile.maintenance_saving_per_year;
    let total_ev_cost = profile.net_ev_price() + horizon * (annual_electric + ev_depreciation);

    let per_mile_advantage = profile.gas_price_per_gallon / mpg - blended / efficiency;
    let price_gap = profile.price_gap();
    let break_even_miles = if price_gap == 0.0 {
        MileageBreakEven::Miles { miles: 0.0 }
    } else if per_mile_advantage <= 0.0 {
        MileageBreakEven::Never { per_mile_advantage }
    } else {
        MileageBreakEven::Miles {
            miles: price_gap / per_mile_advantage,
        }
    };

    Ok(TcoSummary {
        years,
        total_ice_cost,
        total_ev_cost,
        tco_savings: total_ice_cost - total_ev_cost,
        break_even_miles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economics::profile::fixtures::brooklyn_model_3;

    #[test]
    fn five_year_totals_include_depreciation_and_maintenance() {
        let summary = tco(&EngineAssumptions::default(), &brooklyn_model_3(), 5).expect("valid");
        assert_eq!(summary.years, 5);
        assert!((summary.total_ice_cost - 54_438.25).abs() < 1e-6);
        assert!((summary.total_ev_cost - 59_246.7129).abs() < 1e-3);
        assert!((summary.tco_savings + 4_808.4629).abs() < 1e-3);
    }

    #[test]
    fn break_even_miles_divides_gap_by_per_mile_advantage() {
        let summary = tco(&EngineAssumptions::default(), &brooklyn_model_3(), 5).expect("valid");
        let miles = summary.break_even_miles.miles().expect("reachable");
        assert!((miles - 311_152.85).abs() < 0.1);
    }

    #[test]
    fn expensive_electricity_never_breaks_even() {
        let mut profile = brooklyn_model_3();
        profile.electricity_rate_per_kwh = 0.60;
        let summary = tco(&EngineAssumptions::default(), &profile, 5).expect("valid");
        match summary.break_even_miles {
            MileageBreakEven::Never { per_mile_advantage } => assert!(per_mile_advantage < 0.0),
            other => panic!("expected never, got {other:?}"),
        }
    }

    #[test]
    fn no_premium_means_zero_miles() {
        let mut profile = brooklyn_model_3();
        profile.ev_price = 30_000.0;
        let summary = tco(&EngineAssumptions::default(), &profile, 5).expect("valid");
        assert_eq!(summary.break_even_miles, MileageBreakEven::Miles { miles: 0.0 });
    }

    #[test]
    fn maintenance_saving_moves_only_the_ice_total() {
        let base = tco(&EngineAssumptions::default(), &brooklyn_model_3(), 5).expect("valid");
        let mut profile = brooklyn_model_3();
        profile.maintenance_saving_per_year = 800.0;
        let richer = tco(&EngineAssumptions::default(), &profile, 5).expect("valid");

        assert!((richer.total_ice_cost - base.total_ice_cost - 1_500.0).abs() < 1e-6);
        assert_eq!(richer.total_ev_cost, base.total_ev_cost);
    }

    #[test]
    fn zero_year_horizon_is_rejected() {
        let err = tco(&EngineAssumptions::default(), &brooklyn_model_3(), 0).expect_err("years");
        assert_eq!(err.field(), "years");
    }
}
