use super::error::{require_finite, EconomicsError};
use super::profile::VehicleProfile;
use serde::{Deserialize, Serialize};

/// Time until monthly running-cost savings repay the upfront premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "years", rename_all = "snake_case")]
pub enum BreakEven {
    Years(f64),
    /// The EV is not cheaper to run, so the premium is never recovered.
    Unreachable,
}

impl BreakEven {
    pub fn years(&self) -> Option<f64> {
        match self {
            BreakEven::Years(years) => Some(*years),
            BreakEven::Unreachable => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, BreakEven::Years(_))
    }
}

impl std::fmt::Display for BreakEven {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakEven::Years(years) => write!(f, "{years:.1} years"),
            BreakEven::Unreachable => write!(f, "unreachable"),
        }
    }
}

pub(crate) fn break_even(
    profile: &VehicleProfile,
    monthly_surplus: f64,
) -> Result<BreakEven, EconomicsError> {
    let monthly_surplus = require_finite("monthly_surplus", monthly_surplus)?;
    if monthly_surplus <= 0.0 {
        return Ok(BreakEven::Unreachable);
    }

    let years = profile.price_gap() / (monthly_surplus * 12.0);
    if years.is_finite() {
        Ok(BreakEven::Years(years))
    } else {
        Ok(BreakEven::Unreachable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economics::profile::fixtures::brooklyn_model_3;

    #[test]
    fn premium_is_divided_by_annual_surplus() {
        let outcome = break_even(&brooklyn_model_3(), 11.0).expect("valid");
        let years = outcome.years().expect("reachable");
        assert!((years - 7_490.0 / 132.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_surplus_is_unreachable() {
        let profile = brooklyn_model_3();
        assert_eq!(break_even(&profile, 0.0).expect("valid"), BreakEven::Unreachable);
        assert_eq!(break_even(&profile, -25.0).expect("valid"), BreakEven::Unreachable);
        assert_eq!(BreakEven::Unreachable.to_string(), "unreachable");
    }

    #[test]
    fn covered_premium_breaks_even_immediately() {
        let mut profile = brooklyn_model_3();
        profile.tax_incentive = 20_000.0;
        assert_eq!(break_even(&profile, 11.0).expect("valid"), BreakEven::Years(0.0));
    }

    #[test]
    fn nan_surplus_is_rejected() {
        let err = break_even(&brooklyn_model_3(), f64::NAN).expect_err("nan");
        assert_eq!(err.field(), "monthly_surplus");
    }
}
