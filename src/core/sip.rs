use serde::Serialize;
use tracing::debug;

use super::error::{Result, ensure_non_negative, ensure_positive_years, ensure_rate};
use super::types::{format_rupees, money};

const RATE_EPSILON: f64 = 1e-12;

/// Named return-rate sweep used by `compare_scenarios`.
pub const SCENARIOS: [(&str, f64); 4] = [
    ("Conservative", 8.0),
    ("Moderate", 12.0),
    ("Aggressive", 15.0),
    ("Very Aggressive", 18.0),
];

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySnapshot {
    pub month_index: u32,
    #[serde(serialize_with = "money")]
    pub contribution_this_month: f64,
    #[serde(serialize_with = "money")]
    pub cumulative_invested: f64,
    #[serde(serialize_with = "money")]
    pub cumulative_value: f64,
    #[serde(serialize_with = "money")]
    pub cumulative_gains: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySnapshot {
    pub year: u32,
    #[serde(serialize_with = "money")]
    pub cumulative_invested: f64,
    #[serde(serialize_with = "money")]
    pub cumulative_value: f64,
    #[serde(serialize_with = "money")]
    pub cumulative_gains: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipSimulationResult {
    #[serde(serialize_with = "money")]
    pub monthly_contribution: f64,
    pub years: u32,
    pub annual_rate_percent: f64,
    pub step_up_percent: f64,
    pub months: Vec<MonthlySnapshot>,
    pub yearly_summary: Vec<YearlySnapshot>,
    #[serde(serialize_with = "money")]
    pub final_value: f64,
    #[serde(serialize_with = "money")]
    pub total_invested: f64,
    #[serde(serialize_with = "money")]
    pub total_gains: f64,
    #[serde(serialize_with = "money")]
    pub absolute_return_percent: f64,
}

/// Invested / final value / gains / ROI for one way of investing.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    #[serde(serialize_with = "money")]
    pub invested: f64,
    #[serde(serialize_with = "money")]
    pub final_value: f64,
    #[serde(serialize_with = "money")]
    pub gains: f64,
    #[serde(serialize_with = "money")]
    pub roi_percent: f64,
}

impl Outcome {
    fn new(invested: f64, final_value: f64) -> Self {
        let gains = final_value - invested;
        Self {
            invested,
            final_value,
            gains,
            roi_percent: percent_of(gains, invested),
        }
    }

    fn from_simulation(result: &SipSimulationResult) -> Self {
        Self::new(result.total_invested, result.final_value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub name: &'static str,
    pub annual_rate_percent: f64,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalBasedSip {
    #[serde(serialize_with = "money")]
    pub target_amount: f64,
    #[serde(serialize_with = "money")]
    pub required_monthly_contribution: f64,
    pub years: u32,
    pub annual_rate_percent: f64,
    #[serde(serialize_with = "money")]
    pub total_invested: f64,
    #[serde(serialize_with = "money")]
    pub simulated_final_value: f64,
    /// Target minus the simulated value; negative when the simulation
    /// overshoots because contributions are credited at the start of a month.
    #[serde(serialize_with = "money")]
    pub shortfall: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LumpsumVsSip {
    pub lumpsum: Outcome,
    pub sip: Outcome,
    pub combined: Outcome,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepUpOutcome {
    pub step_up_percent: f64,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(serialize_with = "money")]
    pub extra_gains: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepUpBenefit {
    pub regular: Outcome,
    pub step_ups: Vec<StepUpOutcome>,
    pub recommendation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayScenario {
    pub delay_years: u32,
    pub investment_years: u32,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayImpact {
    pub scenarios: Vec<DelayScenario>,
    #[serde(serialize_with = "money")]
    pub opportunity_cost_5y: f64,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationAdjustedSip {
    pub nominal_rate_percent: f64,
    pub inflation_rate_percent: f64,
    #[serde(serialize_with = "money")]
    pub real_rate_percent: f64,
    #[serde(serialize_with = "money")]
    pub nominal_value: f64,
    #[serde(serialize_with = "money")]
    pub real_value: f64,
    #[serde(serialize_with = "money")]
    pub inflation_impact: f64,
    #[serde(serialize_with = "money")]
    pub purchasing_power_percent: f64,
    pub message: String,
}

/// Month-by-month SIP simulation.
///
/// Each month the contribution is added and the whole balance then earns one
/// month of interest. From the 13th month on, the contribution is raised by
/// `step_up_percent` at the start of every year. A zero starting contribution
/// means there is no recurring plan, so step-up never applies to it.
pub fn simulate(
    monthly_contribution: f64,
    years: u32,
    annual_rate_percent: f64,
    step_up_percent: f64,
) -> Result<SipSimulationResult> {
    ensure_non_negative("monthly contribution", monthly_contribution)?;
    ensure_non_negative("step-up", step_up_percent)?;
    ensure_rate("annual rate", annual_rate_percent)?;
    let years = ensure_positive_years("years", i64::from(years))?;

    if monthly_contribution == 0.0 && step_up_percent > 0.0 {
        debug!("zero starting contribution, step-up has nothing to scale");
    }

    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let total_months = years * 12;

    let mut months = Vec::with_capacity(total_months as usize);
    let mut contribution = monthly_contribution;
    let mut invested = 0.0;
    let mut value = 0.0;

    for month in 1..=total_months {
        if month > 1 && (month - 1) % 12 == 0 && step_up_percent > 0.0 {
            contribution *= 1.0 + step_up_percent / 100.0;
        }
        invested += contribution;
        value = (value + contribution) * (1.0 + monthly_rate);

        months.push(MonthlySnapshot {
            month_index: month,
            contribution_this_month: contribution,
            cumulative_invested: invested,
            cumulative_value: value,
            cumulative_gains: value - invested,
        });
    }

    let yearly_summary = months
        .chunks(12)
        .zip(1..)
        .filter_map(|(chunk, year)| {
            chunk.last().map(|snap| YearlySnapshot {
                year,
                cumulative_invested: snap.cumulative_invested,
                cumulative_value: snap.cumulative_value,
                cumulative_gains: snap.cumulative_gains,
            })
        })
        .collect();

    let total_gains = value - invested;
    Ok(SipSimulationResult {
        monthly_contribution,
        years,
        annual_rate_percent,
        step_up_percent,
        months,
        yearly_summary,
        final_value: value,
        total_invested: invested,
        total_gains,
        absolute_return_percent: percent_of(total_gains, invested),
    })
}

/// Monthly contribution `P` solving `target = P * ((1 + r)^n - 1) / r`, with
/// `r` the monthly rate and `n` the number of months.
pub fn required_contribution(target_value: f64, years: u32, annual_rate_percent: f64) -> Result<f64> {
    ensure_non_negative("target value", target_value)?;
    ensure_rate("annual rate", annual_rate_percent)?;
    let years = ensure_positive_years("years", i64::from(years))?;
    Ok(annuity_payment(target_value, years, annual_rate_percent))
}

/// Unvalidated annuity inverse; callers have checked `years > 0`.
pub(crate) fn annuity_payment(target_value: f64, years: u32, annual_rate_percent: f64) -> f64 {
    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let months = f64::from(years) * 12.0;
    if monthly_rate.abs() < RATE_EPSILON {
        debug!("near-zero rate, using linear contribution schedule");
        return target_value / months;
    }
    target_value * monthly_rate / ((1.0 + monthly_rate).powf(months) - 1.0)
}

pub fn compare_scenarios(monthly_contribution: f64, years: u32) -> Result<Vec<ScenarioSummary>> {
    SCENARIOS
        .iter()
        .map(|&(name, rate)| {
            let result = simulate(monthly_contribution, years, rate, 0.0)?;
            Ok(ScenarioSummary {
                name,
                annual_rate_percent: rate,
                outcome: Outcome::from_simulation(&result),
            })
        })
        .collect()
}

pub fn goal_based_sip(target_amount: f64, years: u32, annual_rate_percent: f64) -> Result<GoalBasedSip> {
    let required = required_contribution(target_amount, years, annual_rate_percent)?;
    let check = simulate(required, years, annual_rate_percent, 0.0)?;
    Ok(GoalBasedSip {
        target_amount,
        required_monthly_contribution: required,
        years,
        annual_rate_percent,
        total_invested: check.total_invested,
        simulated_final_value: check.final_value,
        shortfall: target_amount - check.final_value,
    })
}

pub fn lumpsum_vs_sip(
    lumpsum: f64,
    monthly_contribution: f64,
    years: u32,
    annual_rate_percent: f64,
) -> Result<LumpsumVsSip> {
    ensure_non_negative("lumpsum", lumpsum)?;
    let sip = simulate(monthly_contribution, years, annual_rate_percent, 0.0)?;

    let lumpsum_value = lumpsum * (1.0 + annual_rate_percent / 100.0).powi(years as i32);
    let lumpsum = Outcome::new(lumpsum, lumpsum_value);
    let sip = Outcome::from_simulation(&sip);
    let combined = Outcome::new(
        lumpsum.invested + sip.invested,
        lumpsum.final_value + sip.final_value,
    );

    let recommendation = if sip.gains > lumpsum.gains {
        "SIP helps with rupee cost averaging"
    } else {
        "Lumpsum gives better absolute returns"
    };

    Ok(LumpsumVsSip {
        lumpsum,
        sip,
        combined,
        recommendation: recommendation.to_string(),
    })
}

pub fn step_up_benefit(
    monthly_contribution: f64,
    years: u32,
    annual_rate_percent: f64,
) -> Result<StepUpBenefit> {
    let regular = simulate(monthly_contribution, years, annual_rate_percent, 0.0)?;
    let regular = Outcome::from_simulation(&regular);

    let step_ups = [5.0, 10.0, 15.0]
        .into_iter()
        .map(|step_up| {
            let result = simulate(monthly_contribution, years, annual_rate_percent, step_up)?;
            let outcome = Outcome::from_simulation(&result);
            Ok(StepUpOutcome {
                step_up_percent: step_up,
                extra_gains: outcome.gains - regular.gains,
                outcome,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let ten_percent_extra = step_ups
        .iter()
        .find(|s| s.step_up_percent == 10.0)
        .map_or(0.0, |s| s.extra_gains);

    Ok(StepUpBenefit {
        regular,
        step_ups,
        recommendation: format!(
            "A 10% annual step-up can increase your corpus by {}!",
            format_rupees(ten_percent_extra)
        ),
    })
}

pub fn delay_impact(monthly_contribution: f64, years: u32, annual_rate_percent: f64) -> Result<DelayImpact> {
    let scenarios = [0u32, 1, 2, 5]
        .into_iter()
        .map(|delay| {
            let investment_years = years.saturating_sub(delay).max(1);
            let result = simulate(monthly_contribution, investment_years, annual_rate_percent, 0.0)?;
            Ok(DelayScenario {
                delay_years: delay,
                investment_years,
                outcome: Outcome::from_simulation(&result),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let value_for = |delay: u32| {
        scenarios
            .iter()
            .find(|s| s.delay_years == delay)
            .map_or(0.0, |s| s.outcome.final_value)
    };
    let opportunity_cost = value_for(0) - value_for(5);

    Ok(DelayImpact {
        scenarios,
        opportunity_cost_5y: opportunity_cost,
        message: format!(
            "Delaying 5 years can cost you {}! Start investing today.",
            format_rupees(opportunity_cost)
        ),
    })
}

/// Nominal versus real (Fisher-adjusted) SIP value.
pub fn inflation_adjusted(
    monthly_contribution: f64,
    years: u32,
    annual_rate_percent: f64,
    inflation_percent: f64,
) -> Result<InflationAdjustedSip> {
    ensure_rate("inflation", inflation_percent)?;
    let nominal = simulate(monthly_contribution, years, annual_rate_percent, 0.0)?;
    let real_rate =
        ((1.0 + annual_rate_percent / 100.0) / (1.0 + inflation_percent / 100.0) - 1.0) * 100.0;
    let real = simulate(monthly_contribution, years, real_rate, 0.0)?;

    Ok(InflationAdjustedSip {
        nominal_rate_percent: annual_rate_percent,
        inflation_rate_percent: inflation_percent,
        real_rate_percent: real_rate,
        nominal_value: nominal.final_value,
        real_value: real.final_value,
        inflation_impact: nominal.final_value - real.final_value,
        purchasing_power_percent: percent_of(real.final_value, nominal.final_value),
        message: format!(
            "Your {} will have purchasing power of {} in today's terms",
            format_rupees(nominal.final_value),
            format_rupees(real.final_value)
        ),
    })
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}
