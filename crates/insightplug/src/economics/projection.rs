use super::error::{require_non_negative, require_positive, EconomicsError};
use super::monthly::blended_rate;
use super::profile::VehicleProfile;
use super::EngineAssumptions;
use serde::{Deserialize, Serialize};

/// Cumulative spend for both drivetrains at the end of a given year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub year: u32,
    pub legacy_cumulative: f64,
    pub efficient_cumulative: f64,
    /// Legacy minus efficient; positive once the EV is ahead.
    pub cumulative_savings: f64,
}

impl ProjectionPoint {
    fn new(year: u32, legacy_cumulative: f64, efficient_cumulative: f64) -> Self {
        Self {
            year,
            legacy_cumulative,
            efficient_cumulative,
            cumulative_savings: legacy_cumulative - efficient_cumulative,
        }
    }
}

pub(crate) fn projection(
    assumptions: &EngineAssumptions,
    profile: &VehicleProfile,
) -> Result<Vec<ProjectionPoint>, EconomicsError> {
    let mpg = require_positive("ice_mpg", profile.ice_mpg)?;
    let efficiency = require_positive("ev_efficiency", profile.ev_efficiency)?;
    let daily_miles = require_non_negative("daily_miles", profile.daily_miles)?;
    let years = super::error::require_years("ownership_years", profile.ownership_years)?;

    let annual_miles = daily_miles * assumptions.days_per_year;
    let annual_legacy =
        annual_miles / mpg * profile.gas_price_per_gallon + assumptions.ice_maintenance_per_year;
    let annual_efficient = annual_miles / efficiency * blended_rate(assumptions, profile)
        + assumptions.ev_maintenance_per_year;

    let mut legacy = profile.ice_price;
    let mut efficient = profile.net_ev_price();

    let mut points = Vec::with_capacity(years as usize + 1);
    points.push(ProjectionPoint::new(0, legacy, efficient));
    for year in 1..=years {
        legacy += annual_legacy;
        efficient += annual_efficient;
        points.push(ProjectionPoint::new(year, legacy, efficient));
    }

    Ok(points)
}

/// First year whose cumulative savings are no longer negative.
pub fn projection_break_even_year(points: &[ProjectionPoint]) -> Option<u32> {
    points
        .iter()
        .find(|point| point.cumulative_savings >= 0.0)
        .map(|point| point.year)
}
