use super::error::{require_non_negative, require_positive, EconomicsError};
use super::profile::VehicleProfile;
use serde::{Deserialize, Serialize};

/// Days between full recharges at the current driving pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum ChargingInterval {
    Days(u32),
    /// The car is parked (or barely driven): no recharge is ever forced.
    Unlimited,
}

impl ChargingInterval {
    pub fn days(&self) -> Option<u32> {
        match self {
            ChargingInterval::Days(days) => Some(*days),
            ChargingInterval::Unlimited => None,
        }
    }
}

impl std::fmt::Display for ChargingInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChargingInterval::Days(1) => write!(f, "every day"),
            ChargingInterval::Days(days) => write!(f, "every {days} days"),
            ChargingInterval::Unlimited => write!(f, "effectively never"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationSignals {
    /// Share of the EPA range used by one day of driving, clamped to 0..=100.
    pub daily_asset_utilization_pct: f64,
    pub charging_interval: ChargingInterval,
}

pub(crate) fn utilization_signals(
    profile: &VehicleProfile,
) -> Result<UtilizationSignals, EconomicsError> {
    let range = require_positive("vehicle.epa_range_miles", profile.vehicle.epa_range_miles)?;
    let daily_miles = require_non_negative("daily_miles", profile.daily_miles)?;

    let daily_asset_utilization_pct = (daily_miles / range * 100.0).clamp(0.0, 100.0);

    let charging_interval = if daily_miles == 0.0 {
        ChargingInterval::Unlimited
    } else {
        let days = (range / daily_miles).floor().max(1.0);
        if days > f64::from(u32::MAX) {
            ChargingInterval::Unlimited
        } else {
            ChargingInterval::Days(days as u32)
        }
    };

    Ok(UtilizationSignals {
        daily_asset_utilization_pct,
        charging_interval,
    })
}
