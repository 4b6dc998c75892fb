//! Instrument catalog and live-quote seams.
//!
//! The engine never analyses catalog entries; they are labels attached to an
//! allocation bucket that has already been sized.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub sector: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutualFund {
    pub name: String,
    pub category: String,
    pub returns_3y: String,
    pub scheme_code: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub interest_rate: String,
    pub tenure: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FundCategory {
    Equity,
    Debt,
}

pub trait InstrumentCatalog {
    fn top_stocks(&self, limit: usize) -> Vec<Stock>;
    fn mutual_funds(&self, category: FundCategory) -> Vec<MutualFund>;
    fn debt_options(&self) -> Vec<DebtOption>;
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub price: f64,
    pub change_percent: f64,
}

/// Current price / NAV lookup. Implementations live outside the engine.
pub trait QuoteSource {
    fn stock_quote(&self, symbol: &str) -> Result<Quote, String>;
    fn fund_nav(&self, scheme_code: &str) -> Result<Quote, String>;
}

/// Built-in blue-chip, fund and fixed-income lists.
#[derive(Copy, Clone, Debug, Default)]
pub struct StaticCatalog;

const STOCKS: [(&str, &str, &str); 10] = [
    ("RELIANCE", "Reliance Industries", "Energy"),
    ("TCS", "Tata Consultancy Services", "IT"),
    ("HDFCBANK", "HDFC Bank", "Banking"),
    ("INFY", "Infosys", "IT"),
    ("ICICIBANK", "ICICI Bank", "Banking"),
    ("HINDUNILVR", "Hindustan Unilever", "FMCG"),
    ("ITC", "ITC Limited", "FMCG"),
    ("SBIN", "State Bank of India", "Banking"),
    ("BHARTIARTL", "Bharti Airtel", "Telecom"),
    ("KOTAKBANK", "Kotak Mahindra Bank", "Banking"),
];

const EQUITY_FUNDS: [(&str, &str, &str, &str); 5] = [
    ("SBI Bluechip Fund", "Large Cap", "15.2%", "119551"),
    ("ICICI Prudential Bluechip Fund", "Large Cap", "14.8%", "120503"),
    ("Axis Bluechip Fund", "Large Cap", "16.1%", "120505"),
    ("Mirae Asset Large Cap Fund", "Large Cap", "15.5%", "119598"),
    ("Parag Parikh Flexi Cap Fund", "Flexi Cap", "18.2%", "122639"),
];

const DEBT_FUNDS: [(&str, &str, &str, &str); 3] = [
    ("HDFC Corporate Bond Fund", "Corporate Bond", "7.2%", "119533"),
    ("ICICI Prudential Corporate Bond Fund", "Corporate Bond", "6.9%", "120504"),
    ("Axis Banking & PSU Debt Fund", "Banking & PSU", "7.5%", "120506"),
];

const DEBT_OPTIONS: [(&str, &str, &str, &str); 4] = [
    ("SBI Fixed Deposit", "Bank FD", "7.0%", "1-5 years"),
    ("HDFC Bank Fixed Deposit", "Bank FD", "7.1%", "1-5 years"),
    ("ICICI Bank Fixed Deposit", "Bank FD", "7.0%", "1-5 years"),
    ("Government Bonds", "Bonds", "7.3%", "5-10 years"),
];

impl InstrumentCatalog for StaticCatalog {
    fn top_stocks(&self, limit: usize) -> Vec<Stock> {
        STOCKS
            .iter()
            .take(limit)
            .map(|&(symbol, name, sector)| Stock {
                symbol: symbol.to_string(),
                name: name.to_string(),
                sector: sector.to_string(),
            })
            .collect()
    }

    fn mutual_funds(&self, category: FundCategory) -> Vec<MutualFund> {
        let funds: &[_] = match category {
            FundCategory::Equity => &EQUITY_FUNDS,
            FundCategory::Debt => &DEBT_FUNDS,
        };
        funds
            .iter()
            .map(|&(name, category, returns_3y, scheme_code)| MutualFund {
                name: name.to_string(),
                category: category.to_string(),
                returns_3y: returns_3y.to_string(),
                scheme_code: scheme_code.to_string(),
            })
            .collect()
    }

    fn debt_options(&self) -> Vec<DebtOption> {
        DEBT_OPTIONS
            .iter()
            .map(|&(name, kind, interest_rate, tenure)| DebtOption {
                name: name.to_string(),
                kind: kind.to_string(),
                interest_rate: interest_rate.to_string(),
                tenure: tenure.to_string(),
            })
            .collect()
    }
}
