use serde::Serialize;
use tracing::{debug, warn};

use super::allocation::{allocation_for, expected_annual_return};
use super::catalog::{
    DebtOption, FundCategory, InstrumentCatalog, MutualFund, Quote, QuoteSource, Stock,
};
use super::error::{Result, ensure_non_negative};
use super::projection::{DEFAULT_HORIZONS, project};
use super::types::{Allocation, ProjectionPoint, RiskTier, format_rupees, money};

const STOCK_PICKS: usize = 5;
const FUND_PICKS: usize = 3;
const DEBT_PICKS: usize = 3;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Preferences {
    pub stocks: bool,
    pub mutual_funds: bool,
    pub debt_funds: bool,
    pub bonds: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PortfolioRequest {
    pub capital: f64,
    pub monthly_contribution: f64,
    pub risk_tier: RiskTier,
    pub preferences: Preferences,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quoted<T> {
    #[serde(flatten)]
    pub instrument: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
}

impl<T> Quoted<T> {
    fn unquoted(instrument: T) -> Self {
        Self {
            instrument,
            quote: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBucket<T> {
    #[serde(serialize_with = "money")]
    pub amount: f64,
    pub list: Vec<T>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stocks: Option<RecommendationBucket<Quoted<Stock>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutual_funds: Option<RecommendationBucket<Quoted<MutualFund>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt: Option<RecommendationBucket<DebtOption>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    #[serde(serialize_with = "money")]
    pub total_investment: f64,
    #[serde(serialize_with = "money")]
    pub monthly_contribution: f64,
    pub risk_tier: RiskTier,
    pub expected_annual_return_percent: f64,
    pub allocation: Allocation,
    pub recommendations: Recommendations,
    pub projections: Vec<ProjectionPoint>,
}

/// Allocation, 1/3/5-year projections and catalog picks for one request.
pub fn assemble(request: &PortfolioRequest, catalog: &impl InstrumentCatalog) -> Result<Portfolio> {
    ensure_non_negative("capital", request.capital)?;
    ensure_non_negative("monthly contribution", request.monthly_contribution)?;

    let allocation = allocation_for(request.risk_tier);
    let rate = expected_annual_return(request.risk_tier);
    let sized = |percent: f64| request.capital * percent / 100.0;
    let prefs = request.preferences;

    let stocks = prefs.stocks.then(|| RecommendationBucket {
        amount: sized(allocation.equity),
        list: catalog
            .top_stocks(STOCK_PICKS)
            .into_iter()
            .map(Quoted::unquoted)
            .collect(),
    });
    let mutual_funds = prefs.mutual_funds.then(|| RecommendationBucket {
        amount: sized(allocation.mutual_funds),
        list: catalog
            .mutual_funds(FundCategory::Equity)
            .into_iter()
            .take(FUND_PICKS)
            .map(Quoted::unquoted)
            .collect(),
    });
    let debt = (prefs.debt_funds || prefs.bonds).then(|| RecommendationBucket {
        amount: sized(allocation.debt),
        list: catalog.debt_options().into_iter().take(DEBT_PICKS).collect(),
    });

    let projections = project(
        request.capital,
        request.monthly_contribution,
        rate,
        &DEFAULT_HORIZONS,
    )?;

    debug!(
        tier = request.risk_tier.label(),
        capital = request.capital,
        "assembled portfolio"
    );

    Ok(Portfolio {
        total_investment: request.capital,
        monthly_contribution: request.monthly_contribution,
        risk_tier: request.risk_tier,
        expected_annual_return_percent: rate,
        allocation,
        recommendations: Recommendations {
            stocks,
            mutual_funds,
            debt,
        },
        projections,
    })
}

/// Attaches live quotes where the source has them. A failed lookup leaves
/// that entry unquoted; amounts and projections are untouched.
pub fn enrich_with_quotes(mut portfolio: Portfolio, source: &impl QuoteSource) -> Portfolio {
    if let Some(bucket) = portfolio.recommendations.stocks.as_mut() {
        for pick in &mut bucket.list {
            pick.quote = lookup(&pick.instrument.symbol, |s| source.stock_quote(s));
        }
    }
    if let Some(bucket) = portfolio.recommendations.mutual_funds.as_mut() {
        for pick in &mut bucket.list {
            pick.quote = lookup(&pick.instrument.scheme_code, |c| source.fund_nav(c));
        }
    }
    portfolio
}

fn lookup(key: &str, fetch: impl Fn(&str) -> std::result::Result<Quote, String>) -> Option<Quote> {
    match fetch(key) {
        Ok(quote) => Some(quote),
        Err(err) => {
            warn!(key, error = %err, "quote lookup failed, leaving entry unquoted");
            None
        }
    }
}

/// Plain-text summary handed to the conversational assistant as read-only
/// context.
pub fn advisor_context(portfolio: &Portfolio) -> String {
    let allocation = portfolio
        .allocation
        .entries()
        .iter()
        .map(|(name, pct)| format!("{name} {pct}%"))
        .collect::<Vec<_>>()
        .join(", ");
    let projections = portfolio
        .projections
        .iter()
        .map(|p| format!("{}y {}", p.horizon_years, format_rupees(p.total_value)))
        .collect::<Vec<_>>()
        .join("; ");

    format!(
        "Portfolio: capital {}, monthly SIP {}, risk {} (expected {}% a year). \
         Allocation: {allocation}. Projected value: {projections}.",
        format_rupees(portfolio.total_investment),
        format_rupees(portfolio.monthly_contribution),
        portfolio.risk_tier.label(),
        portfolio.expected_annual_return_percent,
    )
}
