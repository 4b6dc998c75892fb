use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Longest horizon any planner accepts, in years.
pub const MAX_HORIZON_YEARS: i64 = 100;

/// Errors surfaced to the immediate caller of an engine operation.
///
/// Unknown risk tiers and near-zero rates are not errors: the former falls
/// back to `RiskTier::Medium`, the latter takes a linear path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid horizon: {0}")]
    InvalidHorizon(String),
}

pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlannerError::InvalidInput(format!(
            "{name} must be a finite value >= 0"
        )));
    }
    Ok(())
}

pub(crate) fn ensure_positive_years(name: &str, years: i64) -> Result<u32> {
    if years <= 0 {
        return Err(PlannerError::InvalidHorizon(format!("{name} must be > 0")));
    }
    if years > MAX_HORIZON_YEARS {
        return Err(PlannerError::InvalidHorizon(format!(
            "{name} must be <= {MAX_HORIZON_YEARS}"
        )));
    }
    u32::try_from(years)
        .map_err(|_| PlannerError::InvalidHorizon(format!("{name} is out of range")))
}

pub(crate) fn ensure_rate(name: &str, percent: f64) -> Result<()> {
    if !percent.is_finite() || percent <= -100.0 {
        return Err(PlannerError::InvalidInput(format!("{name} must be > -100")));
    }
    Ok(())
}
