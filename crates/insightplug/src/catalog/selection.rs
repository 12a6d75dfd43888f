use super::{CatalogError, ReferenceCatalog};
use crate::economics::{RegionProfile, VehicleProfile, VehicleSpec};
use serde::{Deserialize, Serialize};

/// Values used when a selection leaves a field unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileDefaults {
    pub gas_price_per_gallon: f64,
    pub home_charging_ratio: f64,
    pub ownership_years: u32,
    pub tax_incentive: f64,
    pub ev_efficiency: f64,
    pub maintenance_saving_per_year: f64,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            gas_price_per_gallon: 3.45,
            home_charging_ratio: 0.75,
            ownership_years: 10,
            tax_incentive: 7_500.0,
            ev_efficiency: 3.8,
            maintenance_saving_per_year: 500.0,
        }
    }
}

/// A region and vehicle picked from the catalog plus optional overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSelection {
    pub region: String,
    pub vehicle: String,
    #[serde(default)]
    pub daily_miles: Option<f64>,
    #[serde(default)]
    pub home_charging_ratio: Option<f64>,
    #[serde(default)]
    pub ownership_years: Option<u32>,
    #[serde(default)]
    pub gas_price_per_gallon: Option<f64>,
    #[serde(default)]
    pub electricity_rate_per_kwh: Option<f64>,
    #[serde(default)]
    pub ice_mpg: Option<f64>,
    #[serde(default)]
    pub ice_price: Option<f64>,
    #[serde(default)]
    pub ev_price: Option<f64>,
    #[serde(default)]
    pub tax_incentive: Option<f64>,
    #[serde(default)]
    pub ev_efficiency: Option<f64>,
    #[serde(default)]
    pub maintenance_saving_per_year: Option<f64>,
}

impl ProfileSelection {
    pub fn new(region: impl Into<String>, vehicle: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            vehicle: vehicle.into(),
            ..Self::default()
        }
    }
}

impl ReferenceCatalog {
    pub fn build_profile(
        &self,
        selection: &ProfileSelection,
    ) -> Result<VehicleProfile, CatalogError> {
        self.build_profile_with(selection, &ProfileDefaults::default())
    }

    /// Overrides are copied as given; range checks happen in the engine.
    pub fn build_profile_with(
        &self,
        selection: &ProfileSelection,
        defaults: &ProfileDefaults,
    ) -> Result<VehicleProfile, CatalogError> {
        let region = self
            .region(&selection.region)
            .ok_or_else(|| CatalogError::UnknownRegion(selection.region.clone()))?;
        let ev = self
            .ev_model(&selection.vehicle)
            .ok_or_else(|| CatalogError::UnknownVehicle(selection.vehicle.clone()))?;

        let electricity_rate_per_kwh = selection
            .electricity_rate_per_kwh
            .unwrap_or_else(|| self.rate_for_state(&region.state));

        Ok(VehicleProfile {
            region: RegionProfile {
                id: region.fips.clone(),
                name: region.name.clone(),
                state: region.state.clone(),
                average_daily_miles: region.daily_miles,
            },
            vehicle: VehicleSpec {
                make: ev.make.clone(),
                model: ev.model.clone(),
                battery_capacity_kwh: ev.battery_capacity_kwh,
                epa_range_miles: ev.epa_range_miles,
                msrp: ev.msrp,
                ice_benchmark_model: ev.ice_benchmark.model.clone(),
                ice_benchmark_price: ev.ice_benchmark.price,
                ice_benchmark_mpg: ev.ice_benchmark.mpg,
            },
            home_charging_ratio: selection
                .home_charging_ratio
                .unwrap_or(defaults.home_charging_ratio),
            daily_miles: selection.daily_miles.unwrap_or(region.daily_miles),
            gas_price_per_gallon: selection
                .gas_price_per_gallon
                .unwrap_or(defaults.gas_price_per_gallon),
            electricity_rate_per_kwh,
            ice_mpg: selection.ice_mpg.unwrap_or(ev.ice_benchmark.mpg),
            ice_price: selection.ice_price.unwrap_or(ev.ice_benchmark.price),
            ev_price: selection.ev_price.unwrap_or(ev.msrp),
            tax_incentive: selection.tax_incentive.unwrap_or(defaults.tax_incentive),
            ev_efficiency: selection.ev_efficiency.unwrap_or(defaults.ev_efficiency),
            ownership_years: selection
                .ownership_years
                .unwrap_or(defaults.ownership_years),
            maintenance_saving_per_year: selection
                .maintenance_saving_per_year
                .unwrap_or(defaults.maintenance_saving_per_year),
        })
    }
}
