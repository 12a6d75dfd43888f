use super::error::{require_non_negative, require_positive, require_ratio, EconomicsError};
use super::profile::VehicleProfile;
use super::EngineAssumptions;
use serde::{Deserialize, Serialize};

/// Monthly energy spend for both drivetrains, rounded to whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCosts {
    pub legacy: f64,
    pub efficient: f64,
}

impl MonthlyCosts {
    /// Positive when the EV is cheaper to run.
    pub fn surplus(&self) -> f64 {
        self.legacy - self.efficient
    }
}

/// Home/public weighted electricity price per kWh.
pub(crate) fn blended_rate(assumptions: &EngineAssumptions, profile: &VehicleProfile) -> f64 {
    let home = profile.home_charging_ratio;
    let rate = profile.electricity_rate_per_kwh;
    home * rate + (1.0 - home) * (rate * assumptions.public_rate_multiplier)
}

pub(crate) fn monthly_costs(
    assumptions: &EngineAssumptions,
    profile: &VehicleProfile,
) -> Result<MonthlyCosts, EconomicsError> {
    let mpg = require_positive("ice_mpg", profile.ice_mpg)?;
    let efficiency = require_positive("ev_efficiency", profile.ev_efficiency)?;
    let daily_miles = require_non_negative("daily_miles", profile.daily_miles)?;
    let gas_price = require_non_negative("gas_price_per_gallon", profile.gas_price_per_gallon)?;
    require_non_negative("electricity_rate_per_kwh", profile.electricity_rate_per_kwh)?;
    require_ratio("home_charging_ratio", profile.home_charging_ratio)?;

    let miles_per_month = daily_miles * assumptions.days_per_month;
    let legacy = (miles_per_month / mpg * gas_price).round();
    let efficient = (miles_per_month / efficiency * blended_rate(assumptions, profile)).round();

    Ok(MonthlyCosts { legacy, efficient })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economics::profile::fixtures::brooklyn_model_3;

    #[test]
    fn brooklyn_commute_rounds_to_whole_dollars() {
        let costs = monthly_costs(&EngineAssumptions::default(), &brooklyn_model_3())
            .expect("valid profile");
        assert_eq!(costs.legacy, 49.0);
        assert_eq!(costs.efficient, 38.0);
        assert_eq!(costs.surplus(), 11.0);
    }

    #[test]
    fn blended_rate_applies_public_premium_to_remaining_share() {
        let profile = brooklyn_model_3();
        let rate = blended_rate(&EngineAssumptions::default(), &profile);
        let expected = 0.75 * 0.2224 + 0.25 * 0.2224 * 2.5;
        assert!((rate - expected).abs() < 1e-12);
    }

    #[test]
    fn all_home_charging_uses_the_state_rate() {
        let mut profile = brooklyn_model_3();
        profile.home_charging_ratio = 1.0;
        let rate = blended_rate(&EngineAssumptions::default(), &profile);
        assert!((rate - 0.2224).abs() < 1e-12);
    }

    #[test]
    fn zero_denominators_are_rejected() {
        let mut profile = brooklyn_model_3();
        profile.ice_mpg = 0.0;
        let err = monthly_costs(&EngineAssumptions::default(), &profile).expect_err("mpg");
        assert_eq!(err.field(), "ice_mpg");

        let mut profile = brooklyn_model_3();
        profile.ev_efficiency = -3.0;
        let err = monthly_costs(&EngineAssumptions::default(), &profile).expect_err("efficiency");
        assert_eq!(err.field(), "ev_efficiency");
    }

    #[test]
    fn parked_car_costs_nothing() {
        let mut profile = brooklyn_model_3();
        profile.daily_miles = 0.0;
        let costs = monthly_costs(&EngineAssumptions::default(), &profile).expect("valid");
        assert_eq!(costs.legacy, 0.0);
        assert_eq!(costs.efficient, 0.0);
    }
}
