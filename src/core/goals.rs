use serde::Serialize;

use super::error::{
    MAX_HORIZON_YEARS, PlannerError, Result, ensure_non_negative, ensure_positive_years,
    ensure_rate,
};
use super::sip::annuity_payment;
use super::types::{format_rupees, money};

pub const GENERAL_INFLATION: f64 = 6.0;
pub const EDUCATION_INFLATION: f64 = 10.0;
pub const REAL_ESTATE_INFLATION: f64 = 8.0;
pub const WEDDING_INFLATION: f64 = 10.0;
pub const TRAVEL_INFLATION: f64 = 8.0;

/// Accumulation return for equity-oriented goals.
pub const GROWTH_RETURN: f64 = 12.0;
/// Accumulation return for near-term goals parked in debt.
pub const DEBT_RETURN: f64 = 8.0;

const POST_RETIREMENT_RETURN: f64 = 8.0;
const DEFAULT_LIFE_EXPECTANCY: u32 = 85;
const HOME_LOAN_TENURE_YEARS: u32 = 20;
const HOME_LOAN_RATE: f64 = 8.5;
const EMERGENCY_BUILD_YEARS: u32 = 1;
const UNRANKED_PRIORITY: u32 = 999;
const RATE_EPSILON: f64 = 1e-12;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPlan {
    pub goal_name: &'static str,
    pub years_to_goal: u32,
    /// Today's cost of the goal. For retirement this is the required corpus
    /// deflated back to today.
    #[serde(serialize_with = "money")]
    pub present_cost: f64,
    #[serde(serialize_with = "money")]
    pub future_cost: f64,
    #[serde(serialize_with = "money")]
    pub existing_savings: f64,
    #[serde(serialize_with = "money")]
    pub shortfall: f64,
    #[serde(serialize_with = "money")]
    pub required_monthly_contribution: f64,
    #[serde(serialize_with = "money")]
    pub required_lumpsum: f64,
    pub inflation_rate_percent: f64,
    pub accumulation_rate_percent: f64,
    pub recommendation_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<GoalDetails>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GoalDetails {
    #[serde(rename_all = "camelCase")]
    Retirement {
        current_age: u32,
        retirement_age: u32,
        life_expectancy: u32,
        retirement_duration_years: u32,
        #[serde(serialize_with = "money")]
        current_monthly_expense: f64,
        #[serde(serialize_with = "money")]
        future_monthly_expense: f64,
        post_retirement_return_percent: f64,
    },
    #[serde(rename_all = "camelCase")]
    Education {
        child_age: u32,
        education_start_age: u32,
    },
    #[serde(rename_all = "camelCase")]
    HomePurchase {
        down_payment_percent: f64,
        #[serde(serialize_with = "money")]
        future_home_price: f64,
        #[serde(serialize_with = "money")]
        loan_amount: f64,
        #[serde(serialize_with = "money")]
        estimated_emi: f64,
        loan_tenure_years: u32,
        loan_interest_rate_percent: f64,
    },
    #[serde(rename_all = "camelCase")]
    EmergencyFund {
        #[serde(serialize_with = "money")]
        monthly_expenses: f64,
        months_coverage: u32,
        months_to_build: u32,
        status: &'static str,
        allocation: Vec<LiquidityTier>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityTier {
    pub instrument: &'static str,
    pub percent: f64,
    #[serde(serialize_with = "money")]
    pub amount: f64,
    pub liquidity: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RetirementInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_monthly_expense: f64,
    pub life_expectancy: Option<u32>,
    pub existing_corpus: f64,
    pub inflation_percent: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EducationInputs {
    pub child_age: u32,
    pub education_start_age: u32,
    pub course_cost_today: f64,
    pub existing_savings: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HomePurchaseInputs {
    pub home_price_today: f64,
    pub down_payment_percent: f64,
    pub years_to_purchase: u32,
    pub existing_savings: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmergencyFundInputs {
    pub monthly_expenses: f64,
    pub months_coverage: u32,
    pub existing_fund: f64,
}

/// Inputs shared by the simple inflate-then-save goals (wedding, vacation).
#[derive(Clone, Debug, PartialEq)]
pub struct TargetGoalInputs {
    pub cost_today: f64,
    pub years_to_goal: u32,
    pub existing_savings: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GoalRequest {
    pub name: String,
    pub amount: f64,
    pub years: u32,
    /// 1 is the highest priority; unranked goals sort last.
    pub priority: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiGoalLine {
    pub name: String,
    #[serde(serialize_with = "money")]
    pub target_amount: f64,
    pub years: u32,
    pub priority: Option<u32>,
    #[serde(serialize_with = "money")]
    pub required_monthly_contribution: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiGoalPlan {
    pub total_goals: usize,
    #[serde(serialize_with = "money")]
    pub total_required_monthly_contribution: f64,
    pub goals: Vec<MultiGoalLine>,
    pub recommendation_text: String,
}

struct Funding {
    shortfall: f64,
    monthly: f64,
    lumpsum: f64,
}

fn fund(future_cost: f64, existing_savings: f64, years: u32, accumulation_rate: f64) -> Funding {
    let shortfall = (future_cost - existing_savings).max(0.0);
    Funding {
        shortfall,
        monthly: annuity_payment(shortfall, years, accumulation_rate),
        lumpsum: shortfall / (1.0 + accumulation_rate / 100.0).powi(years as i32),
    }
}

fn inflate(amount: f64, inflation_percent: f64, years: u32) -> f64 {
    amount * (1.0 + inflation_percent / 100.0).powi(years as i32)
}

fn years_between(name: &str, from: u32, to: u32) -> Result<u32> {
    ensure_positive_years(name, i64::from(to) - i64::from(from))
}

pub fn plan_retirement(inputs: &RetirementInputs) -> Result<GoalPlan> {
    ensure_non_negative("current monthly expense", inputs.current_monthly_expense)?;
    ensure_non_negative("existing corpus", inputs.existing_corpus)?;
    let inflation = inputs.inflation_percent.unwrap_or(GENERAL_INFLATION);
    ensure_rate("inflation", inflation)?;

    let years = years_between("years to retirement", inputs.current_age, inputs.retirement_age)?;
    let life_expectancy = inputs.life_expectancy.unwrap_or(DEFAULT_LIFE_EXPECTANCY);
    let duration = years_between("retirement duration", inputs.retirement_age, life_expectancy)?;

    let future_monthly_expense = inflate(inputs.current_monthly_expense, inflation, years);
    let required_corpus = retirement_corpus(future_monthly_expense, inflation, duration);
    let funding = fund(required_corpus, inputs.existing_corpus, years, GROWTH_RETURN);

    Ok(GoalPlan {
        goal_name: "Retirement Planning",
        years_to_goal: years,
        present_cost: required_corpus / (1.0 + inflation / 100.0).powi(years as i32),
        future_cost: required_corpus,
        existing_savings: inputs.existing_corpus,
        shortfall: funding.shortfall,
        required_monthly_contribution: funding.monthly,
        required_lumpsum: funding.lumpsum,
        inflation_rate_percent: inflation,
        accumulation_rate_percent: GROWTH_RETURN,
        recommendation_text: retirement_recommendation(years, funding.monthly),
        details: Some(GoalDetails::Retirement {
            current_age: inputs.current_age,
            retirement_age: inputs.retirement_age,
            life_expectancy,
            retirement_duration_years: duration,
            current_monthly_expense: inputs.current_monthly_expense,
            future_monthly_expense,
            post_retirement_return_percent: POST_RETIREMENT_RETURN,
        }),
    })
}

/// Present value, at retirement, of `duration_years` of monthly expenses
/// discounted at the real post-retirement return.
fn retirement_corpus(monthly_expense: f64, inflation_percent: f64, duration_years: u32) -> f64 {
    let real_return = (1.0 + POST_RETIREMENT_RETURN / 100.0) / (1.0 + inflation_percent / 100.0) - 1.0;
    let monthly_real = real_return / 12.0;
    let months = f64::from(duration_years * 12);
    if monthly_real.abs() < RATE_EPSILON {
        return monthly_expense * months;
    }
    monthly_expense * (1.0 - (1.0 + monthly_real).powf(-months)) / monthly_real
}

fn retirement_recommendation(years: u32, monthly: f64) -> String {
    if years > 30 {
        format!("Excellent! Starting early gives you {years} years. Consider aggressive equity allocation.")
    } else if years > 20 {
        format!("Good timing! {years} years allows for balanced portfolio with equity focus.")
    } else if years > 10 {
        format!(
            "Start immediately! {years} years requires disciplined SIP of {}/month.",
            format_rupees(monthly)
        )
    } else {
        format!(
            "Critical! Only {years} years left. Consider increasing SIP significantly and maximizing equity exposure."
        )
    }
}

pub fn plan_education(inputs: &EducationInputs) -> Result<GoalPlan> {
    ensure_non_negative("course cost", inputs.course_cost_today)?;
    ensure_non_negative("existing savings", inputs.existing_savings)?;
    let years = years_between("years to education", inputs.child_age, inputs.education_start_age)?;

    let future_cost = inflate(inputs.course_cost_today, EDUCATION_INFLATION, years);
    let funding = fund(future_cost, inputs.existing_savings, years, GROWTH_RETURN);

    Ok(GoalPlan {
        goal_name: "Child Education Planning",
        years_to_goal: years,
        present_cost: inputs.course_cost_today,
        future_cost,
        existing_savings: inputs.existing_savings,
        shortfall: funding.shortfall,
        required_monthly_contribution: funding.monthly,
        required_lumpsum: funding.lumpsum,
        inflation_rate_percent: EDUCATION_INFLATION,
        accumulation_rate_percent: GROWTH_RETURN,
        recommendation_text: format!(
            "Start SIP of {}/month or invest {} lumpsum today",
            format_rupees(funding.monthly),
            format_rupees(funding.lumpsum)
        ),
        details: Some(GoalDetails::Education {
            child_age: inputs.child_age,
            education_start_age: inputs.education_start_age,
        }),
    })
}

/// Saves for the down payment on an inflated home price and estimates the
/// EMI on the remainder.
pub fn plan_home_purchase(inputs: &HomePurchaseInputs) -> Result<GoalPlan> {
    ensure_non_negative("home price", inputs.home_price_today)?;
    ensure_non_negative("existing savings", inputs.existing_savings)?;
    if !(0.0..=100.0).contains(&inputs.down_payment_percent) {
        return Err(PlannerError::InvalidInput(
            "down payment percent must be between 0 and 100".to_string(),
        ));
    }
    let years = ensure_positive_years("years to purchase", i64::from(inputs.years_to_purchase))?;

    let share = inputs.down_payment_percent / 100.0;
    let future_home_price = inflate(inputs.home_price_today, REAL_ESTATE_INFLATION, years);
    let down_payment = future_home_price * share;
    let funding = fund(down_payment, inputs.existing_savings, years, GROWTH_RETURN);

    let loan_amount = future_home_price - down_payment;
    let estimated_emi = loan_emi(loan_amount, HOME_LOAN_RATE, HOME_LOAN_TENURE_YEARS * 12);

    Ok(GoalPlan {
        goal_name: "Home Purchase Planning",
        years_to_goal: years,
        present_cost: inputs.home_price_today * share,
        future_cost: down_payment,
        existing_savings: inputs.existing_savings,
        shortfall: funding.shortfall,
        required_monthly_contribution: funding.monthly,
        required_lumpsum: funding.lumpsum,
        inflation_rate_percent: REAL_ESTATE_INFLATION,
        accumulation_rate_percent: GROWTH_RETURN,
        recommendation_text: format!(
            "Save {}/month for down payment. Expected EMI: {}/month",
            format_rupees(funding.monthly),
            format_rupees(estimated_emi)
        ),
        details: Some(GoalDetails::HomePurchase {
            down_payment_percent: inputs.down_payment_percent,
            future_home_price,
            loan_amount,
            estimated_emi,
            loan_tenure_years: HOME_LOAN_TENURE_YEARS,
            loan_interest_rate_percent: HOME_LOAN_RATE,
        }),
    })
}

/// Equated monthly instalment: `P * r * (1 + r)^n / ((1 + r)^n - 1)`.
pub fn loan_emi(principal: f64, annual_rate_percent: f64, months: u32) -> f64 {
    if months == 0 {
        return principal;
    }
    let r = annual_rate_percent / 100.0 / 12.0;
    let n = f64::from(months);
    if r.abs() < RATE_EPSILON {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Uninflated corpus of `months_coverage` months of expenses, built over a
/// fixed one-year window and split across three liquidity tiers.
pub fn plan_emergency_fund(inputs: &EmergencyFundInputs) -> Result<GoalPlan> {
    ensure_non_negative("monthly expenses", inputs.monthly_expenses)?;
    ensure_non_negative("existing emergency fund", inputs.existing_fund)?;

    let corpus = inputs.monthly_expenses * f64::from(inputs.months_coverage);
    let funding = fund(corpus, inputs.existing_fund, EMERGENCY_BUILD_YEARS, DEBT_RETURN);

    let tier = |instrument, percent: f64, liquidity| LiquidityTier {
        instrument,
        percent,
        amount: corpus * percent / 100.0,
        liquidity,
    };
    let allocation = vec![
        tier("Savings Account", 30.0, "Instant"),
        tier("Liquid Funds", 50.0, "1-2 days"),
        tier("Short-term FD", 20.0, "1 week"),
    ];

    Ok(GoalPlan {
        goal_name: "Emergency Fund",
        years_to_goal: EMERGENCY_BUILD_YEARS,
        present_cost: corpus,
        future_cost: corpus,
        existing_savings: inputs.existing_fund,
        shortfall: funding.shortfall,
        required_monthly_contribution: funding.monthly,
        required_lumpsum: funding.lumpsum,
        inflation_rate_percent: 0.0,
        accumulation_rate_percent: DEBT_RETURN,
        recommendation_text: format!(
            "Build {} emergency fund by saving {}/month",
            format_rupees(corpus),
            format_rupees(funding.monthly)
        ),
        details: Some(GoalDetails::EmergencyFund {
            monthly_expenses: inputs.monthly_expenses,
            months_coverage: inputs.months_coverage,
            months_to_build: EMERGENCY_BUILD_YEARS * 12,
            status: if funding.shortfall == 0.0 {
                "Adequate"
            } else {
                "Needs Attention"
            },
            allocation,
        }),
    })
}

pub fn plan_wedding(inputs: &TargetGoalInputs) -> Result<GoalPlan> {
    plan_target_goal("Wedding Planning", inputs, WEDDING_INFLATION, GROWTH_RETURN, |plan| {
        format!(
            "Start SIP of {}/month to save {}",
            format_rupees(plan.required_monthly_contribution),
            format_rupees(plan.future_cost)
        )
    })
}

pub fn plan_vacation(inputs: &TargetGoalInputs) -> Result<GoalPlan> {
    plan_target_goal("Vacation Planning", inputs, TRAVEL_INFLATION, DEBT_RETURN, |plan| {
        format!(
            "Save {}/month in debt funds for your dream vacation",
            format_rupees(plan.required_monthly_contribution)
        )
    })
}

fn plan_target_goal(
    goal_name: &'static str,
    inputs: &TargetGoalInputs,
    inflation: f64,
    accumulation: f64,
    recommend: impl Fn(&GoalPlan) -> String,
) -> Result<GoalPlan> {
    ensure_non_negative("cost today", inputs.cost_today)?;
    ensure_non_negative("existing savings", inputs.existing_savings)?;
    let years = ensure_positive_years("years to goal", i64::from(inputs.years_to_goal))?;

    let future_cost = inflate(inputs.cost_today, inflation, years);
    let funding = fund(future_cost, inputs.existing_savings, years, accumulation);

    let mut plan = GoalPlan {
        goal_name,
        years_to_goal: years,
        present_cost: inputs.cost_today,
        future_cost,
        existing_savings: inputs.existing_savings,
        shortfall: funding.shortfall,
        required_monthly_contribution: funding.monthly,
        required_lumpsum: funding.lumpsum,
        inflation_rate_percent: inflation,
        accumulation_rate_percent: accumulation,
        recommendation_text: String::new(),
        details: None,
    };
    plan.recommendation_text = recommend(&plan);
    Ok(plan)
}

/// Independent annuity inverse per goal at the growth return, reported in
/// (priority, years) order. Goals with no years left need no contribution.
pub fn plan_multiple(goals: &[GoalRequest]) -> Result<MultiGoalPlan> {
    for goal in goals {
        ensure_non_negative(&format!("amount for goal '{}'", goal.name), goal.amount)?;
        if i64::from(goal.years) > MAX_HORIZON_YEARS {
            return Err(PlannerError::InvalidHorizon(format!(
                "years for goal '{}' must be <= {MAX_HORIZON_YEARS}",
                goal.name
            )));
        }
    }

    let mut ordered: Vec<&GoalRequest> = goals.iter().collect();
    ordered.sort_by_key(|g| (g.priority.unwrap_or(UNRANKED_PRIORITY), g.years));

    let lines: Vec<MultiGoalLine> = ordered
        .into_iter()
        .map(|goal| MultiGoalLine {
            name: goal.name.clone(),
            target_amount: goal.amount,
            years: goal.years,
            priority: goal.priority,
            required_monthly_contribution: if goal.years > 0 {
                annuity_payment(goal.amount, goal.years, GROWTH_RETURN)
            } else {
                0.0
            },
        })
        .collect();

    let total: f64 = lines.iter().map(|l| l.required_monthly_contribution).sum();
    Ok(MultiGoalPlan {
        total_goals: lines.len(),
        total_required_monthly_contribution: total,
        goals: lines,
        recommendation_text: format!(
            "Total monthly investment needed: {}. Focus on high-priority goals first.",
            format_rupees(total)
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sip::required_contribution;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_retirement() -> RetirementInputs {
        RetirementInputs {
            current_age: 30,
            retirement_age: 60,
            current_monthly_expense: 50_000.0,
            life_expectancy: None,
            existing_corpus: 0.0,
            inflation_percent: None,
        }
    }

    #[test]
    fn emergency_fund_splits_corpus_thirty_fifty_twenty() {
        let plan = plan_emergency_fund(&EmergencyFundInputs {
            monthly_expenses: 50_000.0,
            months_coverage: 6,
            existing_fund: 0.0,
        })
        .expect("valid inputs");
        assert_approx(plan.future_cost, 300_000.0);
        assert_approx(plan.present_cost, 300_000.0);
        assert_eq!(plan.years_to_goal, 1);

        let Some(GoalDetails::EmergencyFund { allocation, status, months_to_build, .. }) =
            &plan.details
        else {
            panic!("expected emergency fund details");
        };
        let amounts: Vec<f64> = allocation.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![90_000.0, 150_000.0, 60_000.0]);
        assert_eq!(*status, "Needs Attention");
        assert_eq!(*months_to_build, 12);
        assert_approx(
            plan.required_monthly_contribution,
            required_contribution(300_000.0, 1, 8.0).expect("valid"),
        );
    }

    #[test]
    fn emergency_fund_already_covered_is_adequate() {
        let plan = plan_emergency_fund(&EmergencyFundInputs {
            monthly_expenses: 20_000.0,
            months_coverage: 6,
            existing_fund: 150_000.0,
        })
        .expect("valid inputs");
        assert_eq!(plan.shortfall, 0.0);
        assert_eq!(plan.required_monthly_contribution, 0.0);
        assert!(matches!(
            plan.details,
            Some(GoalDetails::EmergencyFund { status: "Adequate", .. })
        ));
    }

    #[test]
    fn education_inflates_at_ten_percent_and_funds_shortfall() {
        let plan = plan_education(&EducationInputs {
            child_age: 5,
            education_start_age: 18,
            course_cost_today: 1_000_000.0,
            existing_savings: 200_000.0,
        })
        .expect("valid inputs");
        assert_eq!(plan.years_to_goal, 13);
        assert_approx_tol(plan.future_cost, 1_000_000.0 * 1.1_f64.powi(13), 1e-3);
        assert_approx(plan.shortfall, plan.future_cost - 200_000.0);
        assert_approx(
            plan.required_monthly_contribution,
            required_contribution(plan.shortfall, 13, 12.0).expect("valid"),
        );
        assert_approx_tol(plan.required_lumpsum, plan.shortfall / 1.12_f64.powi(13), 1e-3);
        assert!(plan.recommendation_text.starts_with("Start SIP of ₹"));
    }

    #[test]
    fn education_start_not_after_current_age_is_invalid_horizon() {
        let err = plan_education(&EducationInputs {
            child_age: 18,
            education_start_age: 18,
            course_cost_today: 1.0,
            existing_savings: 0.0,
        })
        .expect_err("zero years");
        assert!(matches!(err, PlannerError::InvalidHorizon(_)));
    }

    #[test]
    fn savings_above_future_cost_leave_no_shortfall() {
        let plan = plan_wedding(&TargetGoalInputs {
            cost_today: 100_000.0,
            years_to_goal: 2,
            existing_savings: 1_000_000.0,
        })
        .expect("valid inputs");
        assert_eq!(plan.shortfall, 0.0);
        assert_eq!(plan.required_monthly_contribution, 0.0);
        assert_eq!(plan.required_lumpsum, 0.0);
    }

    #[test]
    fn retirement_corpus_uses_real_return_annuity() {
        let plan = plan_retirement(&sample_retirement()).expect("valid inputs");
        assert_eq!(plan.years_to_goal, 30);
        let future_expense = 50_000.0 * 1.06_f64.powi(30);
        let real: f64 = 1.08 / 1.06 - 1.0;
        let monthly_real = real / 12.0;
        let expected_corpus =
            future_expense * (1.0 - (1.0 + monthly_real).powf(-300.0)) / monthly_real;
        assert_approx_tol(plan.future_cost, expected_corpus, 1e-3);
        assert_approx_tol(plan.present_cost, expected_corpus / 1.06_f64.powi(30), 1e-3);

        let Some(GoalDetails::Retirement { retirement_duration_years, future_monthly_expense, .. }) =
            plan.details
        else {
            panic!("expected retirement details");
        };
        assert_eq!(retirement_duration_years, 25);
        assert_approx_tol(future_monthly_expense, future_expense, 1e-6);
        assert!(plan.recommendation_text.starts_with("Good timing! 30 years"));
    }

    #[test]
    fn retirement_with_inflation_matching_return_uses_linear_corpus() {
        let mut inputs = sample_retirement();
        inputs.inflation_percent = Some(8.0);
        let plan = plan_retirement(&inputs).expect("valid inputs");
        let future_expense = 50_000.0 * 1.08_f64.powi(30);
        assert_approx_tol(plan.future_cost, future_expense * 300.0, 1e-3);
    }

    #[test]
    fn retirement_recommendation_tiers() {
        assert!(retirement_recommendation(35, 1.0).starts_with("Excellent!"));
        assert!(retirement_recommendation(15, 12_345.0).contains("₹12,345/month"));
        assert!(retirement_recommendation(5, 1.0).starts_with("Critical! Only 5 years"));
    }

    #[test]
    fn retirement_rejects_bad_ages() {
        let mut inputs = sample_retirement();
        inputs.retirement_age = 30;
        assert!(matches!(
            plan_retirement(&inputs),
            Err(PlannerError::InvalidHorizon(_))
        ));

        let mut inputs = sample_retirement();
        inputs.life_expectancy = Some(55);
        let err = plan_retirement(&inputs).expect_err("life expectancy before retirement");
        assert!(err.to_string().contains("retirement duration"));
    }

    #[test]
    fn home_purchase_sizes_down_payment_and_emi() {
        let plan = plan_home_purchase(&HomePurchaseInputs {
            home_price_today: 5_000_000.0,
            down_payment_percent: 20.0,
            years_to_purchase: 5,
            existing_savings: 0.0,
        })
        .expect("valid inputs");
        let future_price = 5_000_000.0 * 1.08_f64.powi(5);
        assert_approx_tol(plan.future_cost, future_price * 0.2, 1e-3);
        assert_approx(plan.present_cost, 1_000_000.0);

        let Some(GoalDetails::HomePurchase { loan_amount, estimated_emi, .. }) = plan.details
        else {
            panic!("expected home purchase details");
        };
        assert_approx_tol(loan_amount, future_price * 0.8, 1e-3);
        assert_approx(estimated_emi, loan_emi(loan_amount, 8.5, 240));
    }

    #[test]
    fn home_purchase_rejects_out_of_range_down_payment() {
        let err = plan_home_purchase(&HomePurchaseInputs {
            home_price_today: 1.0,
            down_payment_percent: 120.0,
            years_to_purchase: 5,
            existing_savings: 0.0,
        })
        .expect_err("bad percent");
        assert!(matches!(err, PlannerError::InvalidInput(_)));
    }

    #[test]
    fn loan_emi_known_value() {
        // 1 lakh over 12 months at 12% a year.
        assert_approx_tol(loan_emi(100_000.0, 12.0, 12), 8_884.88, 0.01);
        assert_approx(loan_emi(120_000.0, 0.0, 12), 10_000.0);
    }

    #[test]
    fn vacation_uses_debt_return() {
        let plan = plan_vacation(&TargetGoalInputs {
            cost_today: 300_000.0,
            years_to_goal: 3,
            existing_savings: 0.0,
        })
        .expect("valid inputs");
        assert_eq!(plan.accumulation_rate_percent, 8.0);
        assert_approx_tol(plan.future_cost, 300_000.0 * 1.08_f64.powi(3), 1e-3);
        assert!(plan.recommendation_text.ends_with("for your dream vacation"));
        assert!(plan.details.is_none());
    }

    #[test]
    fn vacation_with_zero_years_is_invalid_horizon() {
        let err = plan_vacation(&TargetGoalInputs {
            cost_today: 1.0,
            years_to_goal: 0,
            existing_savings: 0.0,
        })
        .expect_err("zero years");
        assert!(matches!(err, PlannerError::InvalidHorizon(_)));
    }

    #[test]
    fn multi_goal_sorts_by_priority_then_years_and_sums() {
        let goal = |name: &str, amount, years, priority| GoalRequest {
            name: name.to_string(),
            amount,
            years,
            priority,
        };
        let plan = plan_multiple(&[
            goal("car", 800_000.0, 4, Some(2)),
            goal("house", 2_000_000.0, 10, Some(1)),
            goal("trip", 200_000.0, 2, None),
            goal("laptop", 100_000.0, 1, Some(1)),
            goal("now", 50_000.0, 0, Some(3)),
        ])
        .expect("valid inputs");

        let names: Vec<&str> = plan.goals.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["laptop", "house", "car", "now", "trip"]);
        assert_eq!(plan.total_goals, 5);
        assert_eq!(plan.goals[3].required_monthly_contribution, 0.0);

        let expected: f64 = [
            (100_000.0, 1),
            (2_000_000.0, 10),
            (800_000.0, 4),
            (200_000.0, 2),
        ]
        .iter()
        .map(|&(amount, years)| required_contribution(amount, years, 12.0).expect("valid"))
        .sum();
        assert_approx_tol(plan.total_required_monthly_contribution, expected, 1e-6);
    }

    #[test]
    fn multi_goal_rejects_horizon_beyond_cap() {
        let err = plan_multiple(&[GoalRequest {
            name: "forever".to_string(),
            amount: 1_000_000.0,
            years: u32::MAX,
            priority: None,
        }])
        .expect_err("unbounded horizon");
        assert!(matches!(err, PlannerError::InvalidHorizon(_)));

        let at_cap = plan_multiple(&[GoalRequest {
            name: "century".to_string(),
            amount: 1_000_000.0,
            years: 100,
            priority: None,
        }])
        .expect("cap is inclusive");
        assert!(at_cap.total_required_monthly_contribution > 0.0);
    }

    #[test]
    fn plans_are_idempotent() {
        let a = plan_retirement(&sample_retirement()).expect("valid");
        let b = plan_retirement(&sample_retirement()).expect("valid");
        assert_eq!(a, b);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_shortfall_is_clamped_difference(
            cost in 0u32..10_000_000,
            savings in 0u32..20_000_000,
            years in 1u32..30
        ) {
            let plan = plan_wedding(&TargetGoalInputs {
                cost_today: cost as f64,
                years_to_goal: years,
                existing_savings: savings as f64,
            }).expect("valid inputs");
            let expected = (plan.future_cost - savings as f64).max(0.0);
            prop_assert!((plan.shortfall - expected).abs() <= EPS);
            prop_assert!(plan.required_monthly_contribution >= 0.0);
            prop_assert!(plan.required_lumpsum <= plan.shortfall + EPS);
        }
    }
}
