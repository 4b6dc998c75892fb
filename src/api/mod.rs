use axum::{
    Router,
    extract::{Json, Path, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::core::{
    Deductions, EducationInputs, EmergencyFundInputs, GoalRequest, HomeLoanBenefit,
    HomePurchaseInputs, NpsBenefit, Portfolio, PortfolioRequest, Preferences, RetirementInputs,
    RiskTier, Section80cPlan, StaticCatalog, TargetGoalInputs, TaxRegime, advisor_context,
    assemble, compare_regimes, compare_scenarios, compute_tax, delay_impact, goal_based_sip,
    home_loan_benefit, inflation_adjusted, lumpsum_vs_sip, nps_benefit, plan_education,
    plan_emergency_fund, plan_home_purchase, plan_multiple, plan_retirement, plan_vacation,
    plan_wedding, simulate, step_up_benefit, suggest_80c_investments,
};

const DEFAULT_INFLATION_PERCENT: f64 = 6.0;
const DEFAULT_EDUCATION_START_AGE: u32 = 18;
const DEFAULT_EMERGENCY_MONTHS: u32 = 6;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRiskTier {
    Low,
    Medium,
    High,
}

impl From<CliRiskTier> for RiskTier {
    fn from(value: CliRiskTier) -> Self {
        match value {
            CliRiskTier::Low => RiskTier::Low,
            CliRiskTier::Medium => RiskTier::Medium,
            CliRiskTier::High => RiskTier::High,
        }
    }
}

impl From<RiskTier> for CliRiskTier {
    fn from(value: RiskTier) -> Self {
        match value {
            RiskTier::Low => CliRiskTier::Low,
            RiskTier::Medium => CliRiskTier::Medium,
            RiskTier::High => CliRiskTier::High,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTaxRegime {
    New,
    Old,
}

impl From<CliTaxRegime> for TaxRegime {
    fn from(value: CliTaxRegime) -> Self {
        match value {
            CliTaxRegime::New => TaxRegime::New,
            CliTaxRegime::Old => TaxRegime::Old,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiTaxRegime {
    #[serde(alias = "newRegime", alias = "new_regime", alias = "new-regime")]
    New,
    #[serde(alias = "oldRegime", alias = "old_regime", alias = "old-regime")]
    Old,
}

impl From<ApiTaxRegime> for CliTaxRegime {
    fn from(value: ApiTaxRegime) -> Self {
        match value {
            ApiTaxRegime::New => CliTaxRegime::New,
            ApiTaxRegime::Old => CliTaxRegime::Old,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiSipAnalysis {
    #[serde(alias = "lumpsumVsSip", alias = "lumpsum_vs_sip", alias = "lumpsum")]
    LumpsumVsSip,
    #[serde(alias = "stepUp", alias = "step_up")]
    StepUp,
    #[serde(alias = "delayImpact", alias = "delay_impact", alias = "delay-impact")]
    Delay,
    #[serde(
        alias = "inflationAdjusted",
        alias = "inflation_adjusted",
        alias = "inflation-adjusted"
    )]
    Inflation,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum GoalKind {
    Retirement,
    Education,
    HomePurchase,
    EmergencyFund,
    Wedding,
    Vacation,
    Multiple,
}

impl GoalKind {
    fn from_path(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "retirement" => Some(GoalKind::Retirement),
            "education" | "child-education" => Some(GoalKind::Education),
            "home" | "home-purchase" => Some(GoalKind::HomePurchase),
            "emergency" | "emergency-fund" => Some(GoalKind::EmergencyFund),
            "wedding" => Some(GoalKind::Wedding),
            "vacation" => Some(GoalKind::Vacation),
            "multiple" | "multi-goal" => Some(GoalKind::Multiple),
            _ => None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "finplan",
    about = "Personal finance planner (allocation, SIP, income tax and goal projections)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON HTTP API
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Build a portfolio and print it as JSON
    Portfolio(PortfolioArgs),
    /// Simulate a monthly SIP and print it as JSON
    Sip(SipArgs),
    /// Compute income tax; compares both regimes unless --regime is given
    Tax(TaxArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PortfolioArgs {
    #[arg(long)]
    capital: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_contribution: f64,
    #[arg(long, value_enum, default_value_t = CliRiskTier::Medium)]
    risk: CliRiskTier,
    #[arg(long)]
    stocks: bool,
    #[arg(long)]
    mutual_funds: bool,
    #[arg(long)]
    debt_funds: bool,
    #[arg(long)]
    bonds: bool,
    #[arg(long, help = "Print the plain-text advisor summary instead of JSON")]
    context: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SipArgs {
    #[arg(long)]
    monthly_contribution: f64,
    #[arg(long)]
    years: u32,
    #[arg(long, default_value_t = 12.0, help = "Expected annual return in percent")]
    annual_rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Yearly increase of the contribution in percent"
    )]
    step_up: f64,
}

#[derive(Args, Debug, Clone)]
pub struct TaxArgs {
    #[arg(long)]
    income: f64,
    #[arg(long, value_enum)]
    regime: Option<CliTaxRegime>,
    #[arg(long = "section-80c", default_value_t = 0.0)]
    section_80c: f64,
    #[arg(long = "section-80ccd-1b", default_value_t = 0.0)]
    section_80ccd_1b: f64,
    #[arg(long = "section-80d", default_value_t = 0.0)]
    section_80d: f64,
    #[arg(long = "section-80d-parents", default_value_t = 0.0)]
    section_80d_parents: f64,
    #[arg(long = "section-80g", default_value_t = 0.0)]
    section_80g: f64,
    #[arg(long = "section-24b", default_value_t = 0.0)]
    section_24b: f64,
    #[arg(long, default_value_t = 0.0)]
    hra: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PortfolioPayload {
    capital: Option<f64>,
    #[serde(alias = "monthlyInvestment", alias = "monthly_investment")]
    monthly_contribution: Option<f64>,
    #[serde(alias = "riskAppetite", alias = "risk_appetite", alias = "risk")]
    risk_tier: Option<String>,
    preferences: Option<PreferencesPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PreferencesPayload {
    stocks: Option<bool>,
    #[serde(alias = "mutual_funds")]
    mutual_funds: Option<bool>,
    #[serde(alias = "debt_funds")]
    debt_funds: Option<bool>,
    bonds: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SipPayload {
    #[serde(alias = "monthlyInvestment")]
    monthly_contribution: Option<f64>,
    years: Option<u32>,
    #[serde(alias = "expectedReturn")]
    annual_rate: Option<f64>,
    #[serde(alias = "stepUpPercent")]
    step_up: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RequiredSipPayload {
    #[serde(alias = "target")]
    target_amount: Option<f64>,
    years: Option<u32>,
    #[serde(alias = "expectedReturn")]
    annual_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScenariosQuery {
    monthly_contribution: Option<f64>,
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SipAnalysisPayload {
    analysis: Option<ApiSipAnalysis>,
    monthly_contribution: Option<f64>,
    years: Option<u32>,
    annual_rate: Option<f64>,
    lumpsum: Option<f64>,
    inflation: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    #[serde(alias = "income")]
    gross_income: Option<f64>,
    regime: Option<ApiTaxRegime>,
    deductions: Option<DeductionsPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DeductionsPayload {
    #[serde(alias = "80c", alias = "80C")]
    section_80c: Option<f64>,
    #[serde(alias = "80ccd_1b", alias = "80CCD(1B)")]
    section_80ccd_1b: Option<f64>,
    #[serde(alias = "80d", alias = "80D")]
    section_80d: Option<f64>,
    #[serde(alias = "80d_parents")]
    section_80d_parents: Option<f64>,
    #[serde(alias = "80g", alias = "80G")]
    section_80g: Option<f64>,
    #[serde(alias = "24b", alias = "24B")]
    section_24b: Option<f64>,
    #[serde(alias = "HRA")]
    hra: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxSuggestionsPayload {
    #[serde(alias = "currentInvestment")]
    current_80c: Option<f64>,
    nps_contribution: Option<f64>,
    home_loan_interest: Option<f64>,
    home_loan_principal: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RetirementPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    #[serde(alias = "monthlyExpenses", alias = "monthlyExpense")]
    current_monthly_expense: Option<f64>,
    life_expectancy: Option<u32>,
    #[serde(alias = "existingSavings")]
    existing_corpus: Option<f64>,
    #[serde(alias = "inflationRate")]
    inflation: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EducationPayload {
    child_age: Option<u32>,
    education_start_age: Option<u32>,
    #[serde(alias = "educationCost")]
    course_cost_today: Option<f64>,
    existing_savings: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HomePurchasePayload {
    #[serde(alias = "targetHomePrice", alias = "homePrice")]
    home_price_today: Option<f64>,
    down_payment_percent: Option<f64>,
    years_to_purchase: Option<u32>,
    existing_savings: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EmergencyFundPayload {
    monthly_expenses: Option<f64>,
    months_coverage: Option<u32>,
    #[serde(alias = "existingEmergencyFund")]
    existing_fund: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TargetGoalPayload {
    #[serde(alias = "cost")]
    cost_today: Option<f64>,
    #[serde(alias = "years")]
    years_to_goal: Option<u32>,
    existing_savings: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MultiGoalPayload {
    goals: Vec<GoalEntryPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalEntryPayload {
    name: Option<String>,
    amount: Option<f64>,
    years: Option<u32>,
    priority: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioResponse {
    #[serde(flatten)]
    portfolio: Portfolio,
    advisor_context: String,
}

impl From<Portfolio> for PortfolioResponse {
    fn from(portfolio: Portfolio) -> Self {
        let advisor_context = advisor_context(&portfolio);
        Self {
            portfolio,
            advisor_context,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaxSuggestionsResponse {
    section_80c: Section80cPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    nps: Option<NpsBenefit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    home_loan: Option<HomeLoanBenefit>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct SipInputs {
    monthly_contribution: f64,
    years: u32,
    annual_rate: f64,
    step_up: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct TaxInputs {
    gross_income: f64,
    regime: Option<TaxRegime>,
    deductions: Deductions,
}

fn ensure_amount(flag: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{flag} must be >= 0"));
    }
    Ok(())
}

fn build_portfolio_request(args: &PortfolioArgs) -> Result<PortfolioRequest, String> {
    ensure_amount("--capital", args.capital)?;
    ensure_amount("--monthly-contribution", args.monthly_contribution)?;

    Ok(PortfolioRequest {
        capital: args.capital,
        monthly_contribution: args.monthly_contribution,
        risk_tier: args.risk.into(),
        preferences: Preferences {
            stocks: args.stocks,
            mutual_funds: args.mutual_funds,
            debt_funds: args.debt_funds,
            bonds: args.bonds,
        },
    })
}

fn build_sip_inputs(args: &SipArgs) -> Result<SipInputs, String> {
    ensure_amount("--monthly-contribution", args.monthly_contribution)?;
    if args.years == 0 {
        return Err("--years must be > 0".to_string());
    }
    if !args.annual_rate.is_finite() || args.annual_rate <= -100.0 {
        return Err("--annual-rate must be > -100".to_string());
    }
    ensure_amount("--step-up", args.step_up)?;

    Ok(SipInputs {
        monthly_contribution: args.monthly_contribution,
        years: args.years,
        annual_rate: args.annual_rate,
        step_up: args.step_up,
    })
}

fn build_tax_inputs(args: &TaxArgs) -> Result<TaxInputs, String> {
    ensure_amount("--income", args.income)?;
    let deductions = Deductions {
        section_80c: args.section_80c,
        section_80ccd_1b: args.section_80ccd_1b,
        section_80d: args.section_80d,
        section_80d_parents: args.section_80d_parents,
        section_80g: args.section_80g,
        section_24b: args.section_24b,
        hra: args.hra,
    };
    for (flag, amount) in [
        ("--section-80c", deductions.section_80c),
        ("--section-80ccd-1b", deductions.section_80ccd_1b),
        ("--section-80d", deductions.section_80d),
        ("--section-80d-parents", deductions.section_80d_parents),
        ("--section-80g", deductions.section_80g),
        ("--section-24b", deductions.section_24b),
        ("--hra", deductions.hra),
    ] {
        ensure_amount(flag, amount)?;
    }

    Ok(TaxInputs {
        gross_income: args.income,
        regime: args.regime.map(Into::into),
        deductions,
    })
}

/// Runs a non-server subcommand and returns what should be printed.
pub fn run_one_shot(command: Command) -> Result<String, String> {
    match command {
        Command::Serve { .. } => Err("serve does not produce one-shot output".to_string()),
        Command::Portfolio(args) => {
            let request = build_portfolio_request(&args)?;
            let portfolio = assemble(&request, &StaticCatalog).map_err(|e| e.to_string())?;
            if args.context {
                return Ok(advisor_context(&portfolio));
            }
            to_pretty_json(&PortfolioResponse::from(portfolio))
        }
        Command::Sip(args) => {
            let inputs = build_sip_inputs(&args)?;
            let result = simulate(
                inputs.monthly_contribution,
                inputs.years,
                inputs.annual_rate,
                inputs.step_up,
            )
            .map_err(|e| e.to_string())?;
            to_pretty_json(&result)
        }
        Command::Tax(args) => {
            let inputs = build_tax_inputs(&args)?;
            match inputs.regime {
                Some(regime) => {
                    let result = compute_tax(inputs.gross_income, regime, Some(&inputs.deductions))
                        .map_err(|e| e.to_string())?;
                    to_pretty_json(&result)
                }
                None => {
                    let result = compare_regimes(inputs.gross_income, &inputs.deductions)
                        .map_err(|e| e.to_string())?;
                    to_pretty_json(&result)
                }
            }
        }
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize output: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "finplan HTTP API listening");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/portfolio", post(portfolio_handler))
        .route("/api/portfolio/generate", post(portfolio_handler))
        .route("/api/sip/simulate", post(sip_simulate_handler))
        .route("/api/sip/required", post(sip_required_handler))
        .route("/api/sip/scenarios", get(sip_scenarios_handler))
        .route("/api/sip/analysis", post(sip_analysis_handler))
        .route("/api/tax/compute", post(tax_compute_handler))
        .route("/api/tax/compare", post(tax_compare_handler))
        .route("/api/tax/suggestions", post(tax_suggestions_handler))
        .route("/api/goals/:kind", post(goal_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "healthy" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn portfolio_handler(Json(payload): Json<PortfolioPayload>) -> Response {
    let request = match portfolio_args_from_payload(payload).and_then(|a| build_portfolio_request(&a))
    {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    engine_response(assemble(&request, &StaticCatalog).map(PortfolioResponse::from))
}

async fn sip_simulate_handler(Json(payload): Json<SipPayload>) -> Response {
    let inputs = match sip_args_from_payload(payload).and_then(|a| build_sip_inputs(&a)) {
        Ok(inputs) => inputs,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    engine_response(simulate(
        inputs.monthly_contribution,
        inputs.years,
        inputs.annual_rate,
        inputs.step_up,
    ))
}

async fn sip_required_handler(Json(payload): Json<RequiredSipPayload>) -> Response {
    let target = match required(payload.target_amount, "targetAmount") {
        Ok(target) => target,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let defaults = default_sip_args_for_api();
    engine_response(goal_based_sip(
        target,
        payload.years.unwrap_or(defaults.years),
        payload.annual_rate.unwrap_or(defaults.annual_rate),
    ))
}

async fn sip_scenarios_handler(Query(query): Query<ScenariosQuery>) -> Response {
    let defaults = default_sip_args_for_api();
    engine_response(compare_scenarios(
        query
            .monthly_contribution
            .unwrap_or(defaults.monthly_contribution),
        query.years.unwrap_or(defaults.years),
    ))
}

async fn sip_analysis_handler(Json(payload): Json<SipAnalysisPayload>) -> Response {
    let analysis = match required(payload.analysis, "analysis") {
        Ok(analysis) => analysis,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let defaults = default_sip_args_for_api();
    let monthly = payload
        .monthly_contribution
        .unwrap_or(defaults.monthly_contribution);
    let years = payload.years.unwrap_or(defaults.years);
    let rate = payload.annual_rate.unwrap_or(defaults.annual_rate);

    match analysis {
        ApiSipAnalysis::LumpsumVsSip => match required(payload.lumpsum, "lumpsum") {
            Ok(lumpsum) => engine_response(lumpsum_vs_sip(lumpsum, monthly, years, rate)),
            Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
        },
        ApiSipAnalysis::StepUp => engine_response(step_up_benefit(monthly, years, rate)),
        ApiSipAnalysis::Delay => engine_response(delay_impact(monthly, years, rate)),
        ApiSipAnalysis::Inflation => engine_response(inflation_adjusted(
            monthly,
            years,
            rate,
            payload.inflation.unwrap_or(DEFAULT_INFLATION_PERCENT),
        )),
    }
}

async fn tax_compute_handler(Json(payload): Json<TaxPayload>) -> Response {
    let inputs = match tax_args_from_payload(payload).and_then(|a| build_tax_inputs(&a)) {
        Ok(inputs) => inputs,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let regime = inputs.regime.unwrap_or(TaxRegime::New);
    engine_response(compute_tax(
        inputs.gross_income,
        regime,
        Some(&inputs.deductions),
    ))
}

async fn tax_compare_handler(Json(payload): Json<TaxPayload>) -> Response {
    let inputs = match tax_args_from_payload(payload).and_then(|a| build_tax_inputs(&a)) {
        Ok(inputs) => inputs,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    engine_response(compare_regimes(inputs.gross_income, &inputs.deductions))
}

async fn tax_suggestions_handler(Json(payload): Json<TaxSuggestionsPayload>) -> Response {
    engine_response(build_tax_suggestions(&payload))
}

fn build_tax_suggestions(payload: &TaxSuggestionsPayload) -> crate::core::Result<TaxSuggestionsResponse> {
    let section_80c = suggest_80c_investments(payload.current_80c.unwrap_or(0.0))?;
    let nps = payload.nps_contribution.map(nps_benefit).transpose()?;
    let home_loan = match (payload.home_loan_interest, payload.home_loan_principal) {
        (None, None) => None,
        (interest, principal) => Some(home_loan_benefit(
            interest.unwrap_or(0.0),
            principal.unwrap_or(0.0),
        )?),
    };
    Ok(TaxSuggestionsResponse {
        section_80c,
        nps,
        home_loan,
    })
}

async fn goal_handler(Path(kind): Path<String>, Json(body): Json<serde_json::Value>) -> Response {
    let Some(kind) = GoalKind::from_path(&kind) else {
        return error_response(StatusCode::NOT_FOUND, &format!("Unknown goal kind: {kind}"));
    };
    goal_response(kind, body)
}

fn goal_response(kind: GoalKind, body: serde_json::Value) -> Response {
    match kind {
        GoalKind::Retirement => match parse_payload(body).and_then(retirement_inputs) {
            Ok(inputs) => engine_response(plan_retirement(&inputs)),
            Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
        },
        GoalKind::Education => match parse_payload(body).and_then(education_inputs) {
            Ok(inputs) => engine_response(plan_education(&inputs)),
            Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
        },
        GoalKind::HomePurchase => match parse_payload(body).and_then(home_purchase_inputs) {
            Ok(inputs) => engine_response(plan_home_purchase(&inputs)),
            Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
        },
        GoalKind::EmergencyFund => match parse_payload(body).and_then(emergency_fund_inputs) {
            Ok(inputs) => engine_response(plan_emergency_fund(&inputs)),
            Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
        },
        GoalKind::Wedding => match parse_payload(body).and_then(target_goal_inputs) {
            Ok(inputs) => engine_response(plan_wedding(&inputs)),
            Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
        },
        GoalKind::Vacation => match parse_payload(body).and_then(target_goal_inputs) {
            Ok(inputs) => engine_response(plan_vacation(&inputs)),
            Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
        },
        GoalKind::Multiple => match parse_payload(body).and_then(goal_requests) {
            Ok(goals) => engine_response(plan_multiple(&goals)),
            Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
        },
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(body).map_err(|e| format!("Invalid API JSON payload: {e}"))
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("{name} is required"))
}

fn retirement_inputs(payload: RetirementPayload) -> Result<RetirementInputs, String> {
    Ok(RetirementInputs {
        current_age: required(payload.current_age, "currentAge")?,
        retirement_age: required(payload.retirement_age, "retirementAge")?,
        current_monthly_expense: required(
            payload.current_monthly_expense,
            "currentMonthlyExpense",
        )?,
        life_expectancy: payload.life_expectancy,
        existing_corpus: payload.existing_corpus.unwrap_or(0.0),
        inflation_percent: payload.inflation,
    })
}

fn education_inputs(payload: EducationPayload) -> Result<EducationInputs, String> {
    Ok(EducationInputs {
        child_age: required(payload.child_age, "childAge")?,
        education_start_age: payload
            .education_start_age
            .unwrap_or(DEFAULT_EDUCATION_START_AGE),
        course_cost_today: required(payload.course_cost_today, "courseCostToday")?,
        existing_savings: payload.existing_savings.unwrap_or(0.0),
    })
}

fn home_purchase_inputs(payload: HomePurchasePayload) -> Result<HomePurchaseInputs, String> {
    Ok(HomePurchaseInputs {
        home_price_today: required(payload.home_price_today, "homePriceToday")?,
        down_payment_percent: required(payload.down_payment_percent, "downPaymentPercent")?,
        years_to_purchase: required(payload.years_to_purchase, "yearsToPurchase")?,
        existing_savings: payload.existing_savings.unwrap_or(0.0),
    })
}

fn emergency_fund_inputs(payload: EmergencyFundPayload) -> Result<EmergencyFundInputs, String> {
    Ok(EmergencyFundInputs {
        monthly_expenses: required(payload.monthly_expenses, "monthlyExpenses")?,
        months_coverage: payload.months_coverage.unwrap_or(DEFAULT_EMERGENCY_MONTHS),
        existing_fund: payload.existing_fund.unwrap_or(0.0),
    })
}

fn target_goal_inputs(payload: TargetGoalPayload) -> Result<TargetGoalInputs, String> {
    Ok(TargetGoalInputs {
        cost_today: required(payload.cost_today, "costToday")?,
        years_to_goal: required(payload.years_to_goal, "yearsToGoal")?,
        existing_savings: payload.existing_savings.unwrap_or(0.0),
    })
}

fn goal_requests(payload: MultiGoalPayload) -> Result<Vec<GoalRequest>, String> {
    payload
        .goals
        .into_iter()
        .enumerate()
        .map(|(idx, goal)| {
            Ok(GoalRequest {
                name: goal.name.unwrap_or_else(|| format!("Goal {}", idx + 1)),
                amount: required(goal.amount, &format!("goals[{idx}].amount"))?,
                years: required(goal.years, &format!("goals[{idx}].years"))?,
                priority: goal.priority,
            })
        })
        .collect()
}

fn engine_response<T: Serialize>(result: crate::core::Result<T>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn portfolio_args_from_payload(payload: PortfolioPayload) -> Result<PortfolioArgs, String> {
    let mut args = default_portfolio_args_for_api();

    if let Some(v) = payload.capital {
        args.capital = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(label) = payload.risk_tier {
        args.risk = RiskTier::from_label(&label).into();
    }
    if let Some(prefs) = payload.preferences {
        if let Some(v) = prefs.stocks {
            args.stocks = v;
        }
        if let Some(v) = prefs.mutual_funds {
            args.mutual_funds = v;
        }
        if let Some(v) = prefs.debt_funds {
            args.debt_funds = v;
        }
        if let Some(v) = prefs.bonds {
            args.bonds = v;
        }
    }

    Ok(args)
}

fn sip_args_from_payload(payload: SipPayload) -> Result<SipArgs, String> {
    let mut args = default_sip_args_for_api();

    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.annual_rate {
        args.annual_rate = v;
    }
    if let Some(v) = payload.step_up {
        args.step_up = v;
    }

    Ok(args)
}

fn tax_args_from_payload(payload: TaxPayload) -> Result<TaxArgs, String> {
    let mut args = default_tax_args_for_api();
    args.income = required(payload.gross_income, "grossIncome")?;
    args.regime = payload.regime.map(Into::into);

    if let Some(d) = payload.deductions {
        args.section_80c = d.section_80c.unwrap_or(0.0);
        args.section_80ccd_1b = d.section_80ccd_1b.unwrap_or(0.0);
        args.section_80d = d.section_80d.unwrap_or(0.0);
        args.section_80d_parents = d.section_80d_parents.unwrap_or(0.0);
        args.section_80g = d.section_80g.unwrap_or(0.0);
        args.section_24b = d.section_24b.unwrap_or(0.0);
        args.hra = d.hra.unwrap_or(0.0);
    }

    Ok(args)
}

fn default_portfolio_args_for_api() -> PortfolioArgs {
    PortfolioArgs {
        capital: 100_000.0,
        monthly_contribution: 5_000.0,
        risk: CliRiskTier::Medium,
        stocks: true,
        mutual_funds: true,
        debt_funds: true,
        bonds: false,
        context: false,
    }
}

fn default_sip_args_for_api() -> SipArgs {
    SipArgs {
        monthly_contribution: 5_000.0,
        years: 10,
        annual_rate: 12.0,
        step_up: 0.0,
    }
}

fn default_tax_args_for_api() -> TaxArgs {
    TaxArgs {
        income: 0.0,
        regime: None,
        section_80c: 0.0,
        section_80ccd_1b: 0.0,
        section_80d: 0.0,
        section_80d_parents: 0.0,
        section_80g: 0.0,
        section_24b: 0.0,
        hra: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn portfolio_from_json(json: &str) -> Result<PortfolioRequest, String> {
        let payload = serde_json::from_str::<PortfolioPayload>(json)
            .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
        build_portfolio_request(&portfolio_args_from_payload(payload)?)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn portfolio_payload_accepts_snake_case_field_names() {
        let json = r#"{
          "capital": 250000,
          "monthly_investment": 10000,
          "risk_appetite": "Aggressive",
          "preferences": {"stocks": false, "mutual_funds": true, "debt_funds": false, "bonds": true}
        }"#;
        let request = portfolio_from_json(json).expect("json should parse");

        assert_approx(request.capital, 250_000.0);
        assert_approx(request.monthly_contribution, 10_000.0);
        assert_eq!(request.risk_tier, RiskTier::High);
        assert_eq!(
            request.preferences,
            Preferences {
                stocks: false,
                mutual_funds: true,
                debt_funds: false,
                bonds: true,
            }
        );
    }

    #[test]
    fn portfolio_payload_falls_back_to_defaults() {
        let request = portfolio_from_json(r#"{"riskTier": "something-else"}"#)
            .expect("json should parse");

        assert_approx(request.capital, 100_000.0);
        assert_approx(request.monthly_contribution, 5_000.0);
        assert_eq!(request.risk_tier, RiskTier::Medium);
        assert!(request.preferences.stocks);
        assert!(!request.preferences.bonds);
    }

    #[test]
    fn build_portfolio_request_rejects_negative_capital() {
        let mut args = default_portfolio_args_for_api();
        args.capital = -1.0;

        let err = build_portfolio_request(&args).expect_err("must reject negative capital");
        assert!(err.contains("--capital"));
    }

    #[test]
    fn build_sip_inputs_rejects_zero_years() {
        let mut args = default_sip_args_for_api();
        args.years = 0;

        let err = build_sip_inputs(&args).expect_err("must reject zero years");
        assert!(err.contains("--years"));
    }

    #[test]
    fn tax_payload_parses_deduction_aliases() {
        let json = r#"{
          "income": 1500000,
          "regime": "old",
          "deductions": {"80C": 150000, "section80d": 25000, "24b": 200000, "hra": 120000}
        }"#;
        let payload = serde_json::from_str::<TaxPayload>(json).expect("json should parse");
        let inputs = build_tax_inputs(&tax_args_from_payload(payload).expect("valid payload"))
            .expect("valid inputs");

        assert_approx(inputs.gross_income, 1_500_000.0);
        assert_eq!(inputs.regime, Some(TaxRegime::Old));
        assert_approx(inputs.deductions.section_80c, 150_000.0);
        assert_approx(inputs.deductions.section_80d, 25_000.0);
        assert_approx(inputs.deductions.section_24b, 200_000.0);
        assert_approx(inputs.deductions.hra, 120_000.0);
        assert_approx(inputs.deductions.section_80g, 0.0);
    }

    #[test]
    fn tax_payload_requires_income() {
        let payload = serde_json::from_str::<TaxPayload>(r#"{"regime": "new"}"#)
            .expect("json should parse");
        let err = tax_args_from_payload(payload).expect_err("income is required");
        assert!(err.contains("grossIncome"));
    }

    #[test]
    fn build_tax_inputs_rejects_negative_deduction() {
        let mut args = default_tax_args_for_api();
        args.income = 800_000.0;
        args.section_80d = -5.0;

        let err = build_tax_inputs(&args).expect_err("must reject negative deduction");
        assert!(err.contains("--section-80d"));
    }

    #[test]
    fn goal_kind_accepts_path_variants() {
        assert_eq!(GoalKind::from_path("retirement"), Some(GoalKind::Retirement));
        assert_eq!(GoalKind::from_path("home-purchase"), Some(GoalKind::HomePurchase));
        assert_eq!(GoalKind::from_path("Emergency"), Some(GoalKind::EmergencyFund));
        assert_eq!(GoalKind::from_path("multi-goal"), Some(GoalKind::Multiple));
        assert_eq!(GoalKind::from_path("yacht"), None);
    }

    #[test]
    fn goal_requests_name_unnamed_goals() {
        let payload: MultiGoalPayload = serde_json::from_str(
            r#"{"goals": [{"amount": 500000, "years": 3}, {"name": "Car", "amount": 800000, "years": 5, "priority": 1}]}"#,
        )
        .expect("json should parse");
        let goals = goal_requests(payload).expect("valid goals");

        assert_eq!(goals[0].name, "Goal 1");
        assert_eq!(goals[0].priority, None);
        assert_eq!(goals[1].name, "Car");
        assert_eq!(goals[1].priority, Some(1));
    }

    #[test]
    fn goal_requests_report_missing_amount() {
        let payload: MultiGoalPayload =
            serde_json::from_str(r#"{"goals": [{"name": "Car", "years": 5}]}"#)
                .expect("json should parse");
        let err = goal_requests(payload).expect_err("amount is required");
        assert!(err.contains("goals[0].amount"));
    }

    #[test]
    fn portfolio_response_serialization_contains_expected_fields() {
        let request = build_portfolio_request(&default_portfolio_args_for_api())
            .expect("valid request");
        let portfolio = assemble(&request, &StaticCatalog).expect("valid portfolio");
        let json = serde_json::to_string(&PortfolioResponse::from(portfolio))
            .expect("response should serialize");

        assert!(json.contains("\"totalInvestment\":100000.0"));
        assert!(json.contains("\"riskTier\":\"Medium\""));
        assert!(json.contains("\"allocation\""));
        assert!(json.contains("\"recommendations\""));
        assert!(json.contains("\"projections\""));
        assert!(json.contains("\"advisorContext\""));
        assert!(!json.contains("\"quote\""));
    }

    #[test]
    fn one_shot_tax_without_regime_compares_both() {
        let mut args = default_tax_args_for_api();
        args.income = 1_000_000.0;

        let out = run_one_shot(Command::Tax(args)).expect("valid command");
        let value: serde_json::Value = serde_json::from_str(&out).expect("output is JSON");
        assert_eq!(value["newRegime"]["totalTax"], 46_800.0);
        assert!(value["recommendationText"].is_string());
    }

    #[test]
    fn one_shot_portfolio_context_is_plain_text() {
        let mut args = default_portfolio_args_for_api();
        args.context = true;

        let out = run_one_shot(Command::Portfolio(args)).expect("valid command");
        assert!(out.starts_with("Portfolio: capital ₹100,000"));
    }

    #[test]
    fn one_shot_rejects_serve() {
        let err = run_one_shot(Command::Serve { port: 8080 }).expect_err("serve is not one-shot");
        assert!(err.contains("serve"));
    }

    #[test]
    fn cli_parses_sip_subcommand() {
        let cli = Cli::try_parse_from([
            "finplan",
            "sip",
            "--monthly-contribution",
            "5000",
            "--years",
            "10",
            "--step-up",
            "10",
        ])
        .expect("cli should parse");

        let Command::Sip(args) = cli.command else {
            panic!("expected sip subcommand");
        };
        let inputs = build_sip_inputs(&args).expect("valid inputs");
        assert_approx(inputs.annual_rate, 12.0);
        assert_approx(inputs.step_up, 10.0);
    }

    #[tokio::test]
    async fn engine_errors_map_to_bad_request() {
        let response = goal_response(
            GoalKind::Wedding,
            serde_json::json!({"costToday": 1500000, "yearsToGoal": 0}),
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let body = body_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .is_some_and(|e| e.starts_with("invalid horizon"))
        );
    }

    #[tokio::test]
    async fn emergency_goal_response_contains_split() {
        let response = goal_response(
            GoalKind::EmergencyFund,
            serde_json::json!({"monthlyExpenses": 50000}),
        );
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let allocation = body["details"]["allocation"]
            .as_array()
            .expect("allocation array");
        let amounts: Vec<f64> = allocation
            .iter()
            .map(|tier| tier["amount"].as_f64().expect("amount"))
            .collect();
        assert_eq!(amounts, vec![90_000.0, 150_000.0, 60_000.0]);
    }

    #[test]
    fn tax_suggestions_include_optional_sections() {
        let payload = TaxSuggestionsPayload {
            current_80c: Some(100_000.0),
            nps_contribution: Some(50_000.0),
            home_loan_interest: None,
            home_loan_principal: None,
        };
        let response = build_tax_suggestions(&payload).expect("valid payload");

        assert_approx(response.section_80c.remaining, 50_000.0);
        assert!(response.nps.is_some());
        assert!(response.home_loan.is_none());
    }
}
