use super::error::{PlannerError, Result, ensure_non_negative, ensure_rate};
use super::types::ProjectionPoint;

pub const DEFAULT_HORIZONS: [u32; 3] = [1, 3, 5];

/// Quick dashboard projection.
///
/// The lump sum compounds annually. Contributions use a mid-point
/// approximation, `contribution * 12 * years * (1 + rate / 2)`, and are not
/// compounded month by month; `sip::simulate` is the exact path.
pub fn project(
    principal: f64,
    periodic_contribution: f64,
    annual_rate_percent: f64,
    horizons: &[u32],
) -> Result<Vec<ProjectionPoint>> {
    ensure_non_negative("principal", principal)?;
    ensure_non_negative("periodic contribution", periodic_contribution)?;
    ensure_rate("annual rate", annual_rate_percent)?;
    if horizons.contains(&0) {
        return Err(PlannerError::InvalidHorizon(
            "projection horizons must be > 0 years".to_string(),
        ));
    }

    let rate = annual_rate_percent / 100.0;
    Ok(horizons
        .iter()
        .map(|&years| projection_point(principal, periodic_contribution, rate, years))
        .collect())
}

fn projection_point(principal: f64, contribution: f64, rate: f64, years: u32) -> ProjectionPoint {
    let contributed = contribution * 12.0 * years as f64;
    let future_value_principal = principal * (1.0 + rate).powi(years as i32);
    let contribution_value = contributed * (1.0 + rate / 2.0);
    let total_value = future_value_principal + contribution_value;
    let invested_amount = principal + contributed;

    ProjectionPoint {
        horizon_years: years,
        total_value,
        invested_amount,
        gains: total_value - invested_amount,
    }
}
