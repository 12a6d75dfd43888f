use super::error::{
    require_non_negative, require_positive, require_ratio, require_years, EconomicsError,
};
use serde::{Deserialize, Serialize};

/// County-level driving context the profile was seeded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionProfile {
    pub id: String,
    pub name: String,
    pub state: String,
    pub average_daily_miles: f64,
}

/// Electric vehicle under evaluation plus its gasoline benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub make: String,
    pub model: String,
    pub battery_capacity_kwh: f64,
    pub epa_range_miles: f64,
    pub msrp: f64,
    pub ice_benchmark_model: String,
    pub ice_benchmark_price: f64,
    pub ice_benchmark_mpg: f64,
}

/// Immutable input to every engine calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleProfile {
    pub region: RegionProfile,
    pub vehicle: VehicleSpec,
    /// Share of charging done at home, 0..=1; the rest is public charging.
    pub home_charging_ratio: f64,
    pub daily_miles: f64,
    pub gas_price_per_gallon: f64,
    /// Residential rate for the region's state.
    pub electricity_rate_per_kwh: f64,
    pub ice_mpg: f64,
    pub ice_price: f64,
    pub ev_price: f64,
    pub tax_incentive: f64,
    /// Distance covered per kWh; monthly energy is miles divided by this figure.
    pub ev_efficiency: f64,
    pub ownership_years: u32,
    /// EV maintenance saving against the gasoline benchmark; negative when the EV costs more.
    pub maintenance_saving_per_year: f64,
}

impl VehicleProfile {
    /// Checks every field the engine reads.
    pub fn validate(&self) -> Result<(), EconomicsError> {
        require_non_negative("region.average_daily_miles", self.region.average_daily_miles)?;
        require_positive("vehicle.battery_capacity_kwh", self.vehicle.battery_capacity_kwh)?;
        require_positive("vehicle.epa_range_miles", self.vehicle.epa_range_miles)?;
        require_non_negative("vehicle.msrp", self.vehicle.msrp)?;
        require_non_negative("vehicle.ice_benchmark_price", self.vehicle.ice_benchmark_price)?;
        require_positive("vehicle.ice_benchmark_mpg", self.vehicle.ice_benchmark_mpg)?;

        require_ratio("home_charging_ratio", self.home_charging_ratio)?;
        require_non_negative("daily_miles", self.daily_miles)?;
        require_positive("gas_price_per_gallon", self.gas_price_per_gallon)?;
        require_positive("electricity_rate_per_kwh", self.electricity_rate_per_kwh)?;
        require_positive("ice_mpg", self.ice_mpg)?;
        require_non_negative("ice_price", self.ice_price)?;
        require_non_negative("ev_price", self.ev_price)?;
        require_non_negative("tax_incentive", self.tax_incentive)?;
        require_positive("ev_efficiency", self.ev_efficiency)?;
        require_years("ownership_years", self.ownership_years)?;
        super::error::require_finite(
            "maintenance_saving_per_year",
            self.maintenance_saving_per_year,
        )?;
        Ok(())
    }

    /// Upfront premium still owed after the incentive, floored at zero.
    pub fn price_gap(&self) -> f64 {
        (self.ev_price - self.ice_price - self.tax_incentive).max(0.0)
    }

    /// EV purchase price net of the incentive.
    pub fn net_ev_price(&self) -> f64 {
        self.ev_price - self.tax_incentive
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::brooklyn_model_3;
    use super::*;

    #[test]
    fn fixture_is_valid() {
        brooklyn_model_3().validate().expect("fixture validates");
    }

    #[test]
    fn rejects_ratio_outside_unit_interval() {
        let mut profile = brooklyn_model_3();
        profile.home_charging_ratio = 1.2;
        let err = profile.validate().expect_err("ratio rejected");
        assert_eq!(err.field(), "home_charging_ratio");
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut profile = brooklyn_model_3();
        profile.gas_price_per_gallon = f64::NAN;
        let err = profile.validate().expect_err("nan rejected");
        assert_eq!(err.field(), "gas_price_per_gallon");
    }

    #[test]
    fn price_gap_is_floored_at_zero() {
        let mut profile = brooklyn_model_3();
        assert!((profile.price_gap() - 7_490.0).abs() < 1e-9);
        profile.tax_incentive = 20_000.0;
        assert_eq!(profile.price_gap(), 0.0);
    }
}
