mod allocation;
mod catalog;
mod error;
mod goals;
mod portfolio;
mod projection;
mod sip;
mod tax;
mod types;

pub use allocation::{allocation_for, expected_annual_return};
pub use catalog::{
    DebtOption, FundCategory, InstrumentCatalog, MutualFund, Quote, QuoteSource, StaticCatalog,
    Stock,
};
pub use error::{PlannerError, Result};
pub use goals::{
    EducationInputs, EmergencyFundInputs, GoalDetails, GoalPlan, GoalRequest, HomePurchaseInputs,
    LiquidityTier, MultiGoalLine, MultiGoalPlan, RetirementInputs, TargetGoalInputs, loan_emi,
    plan_education, plan_emergency_fund, plan_home_purchase, plan_multiple, plan_retirement,
    plan_vacation, plan_wedding,
};
pub use portfolio::{
    Portfolio, PortfolioRequest, Preferences, Quoted, RecommendationBucket, Recommendations,
    advisor_context, assemble, enrich_with_quotes,
};
pub use projection::{DEFAULT_HORIZONS, project};
pub use sip::{
    DelayImpact, DelayScenario, GoalBasedSip, InflationAdjustedSip, LumpsumVsSip,
    MonthlySnapshot, Outcome, SCENARIOS, ScenarioSummary, SipSimulationResult, StepUpBenefit,
    StepUpOutcome, YearlySnapshot, compare_scenarios, delay_impact, goal_based_sip,
    inflation_adjusted, lumpsum_vs_sip, required_contribution, simulate, step_up_benefit,
};
pub use tax::{
    AppliedDeduction, BracketRow, Deductions, HomeLoanBenefit, InvestmentSuggestion, NpsBenefit,
    RegimeComparison, Section80cPlan, TaxRegime, TaxResult, compare_regimes, compute_tax,
    home_loan_benefit, nps_benefit, suggest_80c_investments,
};
pub use types::{Allocation, ProjectionPoint, RiskTier, format_rupees, round_money};
