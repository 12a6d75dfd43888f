/// Rejection raised before any arithmetic runs on an unusable profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EconomicsError {
    #[error("invalid input: {field} {reason}")]
    InvalidInput {
        field: &'static str,
        reason: &'static str,
    },
}

impl EconomicsError {
    pub fn field(&self) -> &'static str {
        match self {
            EconomicsError::InvalidInput { field, .. } => field,
        }
    }
}

pub(crate) fn require_finite(field: &'static str, value: f64) -> Result<f64, EconomicsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EconomicsError::InvalidInput {
            field,
            reason: "must be a finite number",
        })
    }
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<f64, EconomicsError> {
    let value = require_finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(EconomicsError::InvalidInput {
            field,
            reason: "must be greater than zero",
        })
    }
}

pub(crate) fn require_non_negative(
    field: &'static str,
    value: f64,
) -> Result<f64, EconomicsError> {
    let value = require_finite(field, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(EconomicsError::InvalidInput {
            field,
            reason: "must not be negative",
        })
    }
}

pub(crate) fn require_ratio(field: &'static str, value: f64) -> Result<f64, EconomicsError> {
    let value = require_finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(EconomicsError::InvalidInput {
            field,
            reason: "must be between 0 and 1",
        })
    }
}

pub(crate) fn require_years(field: &'static str, value: u32) -> Result<u32, EconomicsError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(EconomicsError::InvalidInput {
            field,
            reason: "must be at least one year",
        })
    }
}
