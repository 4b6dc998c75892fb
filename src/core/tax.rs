use serde::Serialize;

use super::error::{Result, ensure_non_negative};
use super::types::{format_rupees, money};

pub const STANDARD_DEDUCTION: f64 = 50_000.0;
pub const CESS_RATE: f64 = 0.04;

const LIMIT_80C: f64 = 150_000.0;
const LIMIT_80CCD_1B: f64 = 50_000.0;
const LIMIT_80D_SELF: f64 = 25_000.0;
const LIMIT_80D_PARENTS: f64 = 50_000.0;
const LIMIT_80G_SHARE_OF_INCOME: f64 = 0.10;
const LIMIT_24B: f64 = 200_000.0;

/// Claimed-deduction level below which the old regime advice nudges towards
/// filling 80C.
const DEDUCTION_ADVICE_THRESHOLD: f64 = 200_000.0;
/// Marginal rate assumed by the savings helpers.
const ASSUMED_MARGINAL_RATE: f64 = 0.30;

#[derive(Copy, Clone, Debug)]
struct Slab {
    upper: f64,
    rate: f64,
}

/// FY 2024-25 new regime slabs.
const NEW_REGIME_SLABS: [Slab; 6] = [
    Slab { upper: 300_000.0, rate: 0.0 },
    Slab { upper: 700_000.0, rate: 0.05 },
    Slab { upper: 1_000_000.0, rate: 0.10 },
    Slab { upper: 1_200_000.0, rate: 0.15 },
    Slab { upper: 1_500_000.0, rate: 0.20 },
    Slab { upper: f64::INFINITY, rate: 0.30 },
];

const OLD_REGIME_SLABS: [Slab; 4] = [
    Slab { upper: 250_000.0, rate: 0.0 },
    Slab { upper: 500_000.0, rate: 0.05 },
    Slab { upper: 1_000_000.0, rate: 0.20 },
    Slab { upper: f64::INFINITY, rate: 0.30 },
];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxRegime {
    New,
    Old,
}

impl TaxRegime {
    pub fn label(self) -> &'static str {
        match self {
            TaxRegime::New => "New Regime",
            TaxRegime::Old => "Old Regime",
        }
    }

    fn slabs(self) -> &'static [Slab] {
        match self {
            TaxRegime::New => &NEW_REGIME_SLABS,
            TaxRegime::Old => &OLD_REGIME_SLABS,
        }
    }
}

/// Amounts claimed under each old regime section, before caps.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Deductions {
    pub section_80c: f64,
    pub section_80ccd_1b: f64,
    pub section_80d: f64,
    pub section_80d_parents: f64,
    pub section_80g: f64,
    pub section_24b: f64,
    pub hra: f64,
}

impl Deductions {
    fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("80C", self.section_80c),
            ("80CCD(1B)", self.section_80ccd_1b),
            ("80D", self.section_80d),
            ("80D parents", self.section_80d_parents),
            ("80G", self.section_80g),
            ("24B", self.section_24b),
            ("HRA", self.hra),
        ]
    }

    pub fn claimed_total(&self) -> f64 {
        self.named().iter().map(|(_, amount)| amount).sum()
    }

    fn validate(&self) -> Result<()> {
        for (name, amount) in self.named() {
            ensure_non_negative(&format!("deduction {name}"), amount)?;
        }
        Ok(())
    }

    fn capped(&self, gross_income: f64) -> Vec<AppliedDeduction> {
        let applied = |name, amount: f64| AppliedDeduction { name, amount };
        vec![
            applied("Section 80C", self.section_80c.min(LIMIT_80C)),
            applied("Section 80CCD(1B) - NPS", self.section_80ccd_1b.min(LIMIT_80CCD_1B)),
            applied("Section 80D - Health", self.section_80d.min(LIMIT_80D_SELF)),
            applied("Section 80D - Parents", self.section_80d_parents.min(LIMIT_80D_PARENTS)),
            applied(
                "Section 80G - Donations",
                self.section_80g.min(gross_income * LIMIT_80G_SHARE_OF_INCOME),
            ),
            applied("Section 24B - Home Loan", self.section_24b.min(LIMIT_24B)),
            applied("HRA Exemption", self.hra),
            applied("Standard Deduction", STANDARD_DEDUCTION),
        ]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDeduction {
    pub name: &'static str,
    #[serde(serialize_with = "money")]
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketRow {
    pub bracket_label: String,
    pub lower_bound: f64,
    /// `None` for the open top slab.
    pub upper_bound: Option<f64>,
    #[serde(serialize_with = "money")]
    pub taxable_amount_in_bracket: f64,
    pub rate: f64,
    #[serde(serialize_with = "money")]
    pub tax_in_bracket: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub regime: TaxRegime,
    pub regime_name: &'static str,
    #[serde(serialize_with = "money")]
    pub gross_income: f64,
    #[serde(serialize_with = "money")]
    pub standard_deduction: f64,
    pub deductions_applied: Vec<AppliedDeduction>,
    #[serde(serialize_with = "money")]
    pub total_deductions: f64,
    #[serde(serialize_with = "money")]
    pub taxable_income: f64,
    #[serde(serialize_with = "money")]
    pub tax_before_surcharge: f64,
    /// Health and education cess on `tax_before_surcharge`.
    #[serde(serialize_with = "money")]
    pub surcharge: f64,
    #[serde(serialize_with = "money")]
    pub total_tax: f64,
    #[serde(serialize_with = "money")]
    pub effective_rate_percent: f64,
    pub bracket_breakdown: Vec<BracketRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeComparison {
    pub new_regime: TaxResult,
    pub old_regime: TaxResult,
    #[serde(serialize_with = "money")]
    pub absolute_savings: f64,
    pub better_regime: TaxRegime,
    pub better_regime_name: &'static str,
    pub recommendation_text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSuggestion {
    pub option: &'static str,
    #[serde(serialize_with = "money")]
    pub amount: f64,
    pub benefit: &'static str,
    pub lock_in: &'static str,
    pub priority: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section80cPlan {
    pub fully_utilized: bool,
    #[serde(serialize_with = "money")]
    pub remaining: f64,
    #[serde(serialize_with = "money")]
    pub potential_savings: f64,
    pub message: String,
    pub suggestions: Vec<InvestmentSuggestion>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpsBenefit {
    #[serde(serialize_with = "money")]
    pub contribution: f64,
    #[serde(serialize_with = "money")]
    pub eligible_deduction: f64,
    #[serde(serialize_with = "money")]
    pub tax_saved: f64,
    pub recommendation: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeLoanBenefit {
    #[serde(serialize_with = "money")]
    pub interest_paid: f64,
    #[serde(serialize_with = "money")]
    pub interest_deduction: f64,
    #[serde(serialize_with = "money")]
    pub principal_paid: f64,
    #[serde(serialize_with = "money")]
    pub principal_deduction: f64,
    #[serde(serialize_with = "money")]
    pub total_benefit: f64,
    #[serde(serialize_with = "money")]
    pub tax_saved: f64,
}

/// Tax under one regime. Deductions other than the standard deduction are
/// only honoured by the old regime.
pub fn compute_tax(
    gross_income: f64,
    regime: TaxRegime,
    deductions: Option<&Deductions>,
) -> Result<TaxResult> {
    ensure_non_negative("gross income", gross_income)?;
    if let Some(deductions) = deductions {
        deductions.validate()?;
    }

    let deductions_applied = match regime {
        TaxRegime::New => Vec::new(),
        TaxRegime::Old => deductions
            .copied()
            .unwrap_or_default()
            .capped(gross_income),
    };
    let total_deductions = match regime {
        TaxRegime::New => STANDARD_DEDUCTION,
        TaxRegime::Old => deductions_applied.iter().map(|d| d.amount).sum(),
    };
    let taxable_income = (gross_income - total_deductions).max(0.0);

    let (tax, bracket_breakdown) = walk_brackets(taxable_income, regime.slabs());
    let surcharge = tax * CESS_RATE;
    let total_tax = tax + surcharge;
    let effective_rate_percent = if gross_income > 0.0 {
        total_tax / gross_income * 100.0
    } else {
        0.0
    };

    Ok(TaxResult {
        regime,
        regime_name: regime.label(),
        gross_income,
        standard_deduction: STANDARD_DEDUCTION,
        deductions_applied,
        total_deductions,
        taxable_income,
        tax_before_surcharge: tax,
        surcharge,
        total_tax,
        effective_rate_percent,
        bracket_breakdown,
    })
}

fn walk_brackets(taxable_income: f64, slabs: &[Slab]) -> (f64, Vec<BracketRow>) {
    let mut tax = 0.0;
    let mut previous_bound = 0.0;
    let mut rows = Vec::new();

    for slab in slabs {
        if taxable_income <= previous_bound {
            break;
        }
        let in_bracket = (taxable_income.min(slab.upper) - previous_bound).max(0.0);
        let bracket_tax = in_bracket * slab.rate;
        tax += bracket_tax;

        if in_bracket > 0.0 {
            rows.push(BracketRow {
                bracket_label: bracket_label(previous_bound, slab.upper),
                lower_bound: previous_bound,
                upper_bound: slab.upper.is_finite().then_some(slab.upper),
                taxable_amount_in_bracket: in_bracket,
                rate: slab.rate,
                tax_in_bracket: bracket_tax,
            });
        }

        if taxable_income <= slab.upper {
            break;
        }
        previous_bound = slab.upper;
    }

    (tax, rows)
}

fn bracket_label(lower: f64, upper: f64) -> String {
    if upper.is_finite() {
        format!("{} - {}", format_rupees(lower), format_rupees(upper))
    } else {
        format!("Above {}", format_rupees(lower))
    }
}

pub fn compare_regimes(gross_income: f64, deductions: &Deductions) -> Result<RegimeComparison> {
    let new_regime = compute_tax(gross_income, TaxRegime::New, None)?;
    let old_regime = compute_tax(gross_income, TaxRegime::Old, Some(deductions))?;

    let savings = new_regime.total_tax - old_regime.total_tax;
    let better_regime = if savings > 0.0 {
        TaxRegime::Old
    } else {
        TaxRegime::New
    };
    let amount = format_rupees(savings.abs());
    let recommendation_text = match better_regime {
        TaxRegime::Old if deductions.claimed_total() < DEDUCTION_ADVICE_THRESHOLD => {
            format!("Old Regime saves you {amount}! Consider maximizing 80C deductions.")
        }
        TaxRegime::Old => format!("Old Regime is optimal for you, saving {amount}!"),
        TaxRegime::New => {
            format!("New Regime saves you {amount}! Simpler with no deduction hassles.")
        }
    };

    Ok(RegimeComparison {
        new_regime,
        old_regime,
        absolute_savings: savings.abs(),
        better_regime,
        better_regime_name: better_regime.label(),
        recommendation_text,
    })
}

pub fn suggest_80c_investments(current_investment: f64) -> Result<Section80cPlan> {
    ensure_non_negative("current 80C investment", current_investment)?;
    let remaining = LIMIT_80C - current_investment;
    if remaining <= 0.0 {
        return Ok(Section80cPlan {
            fully_utilized: true,
            remaining: 0.0,
            potential_savings: 0.0,
            message: "Section 80C limit fully utilized!".to_string(),
            suggestions: Vec::new(),
        });
    }

    let suggestion = |option, cap: f64, benefit, lock_in, priority| InvestmentSuggestion {
        option,
        amount: remaining.min(cap),
        benefit,
        lock_in,
        priority,
    };
    let suggestions = vec![
        suggestion("ELSS Mutual Funds", 50_000.0, "Tax saving + Equity returns", "3 years", "High"),
        suggestion("PPF (Public Provident Fund)", 150_000.0, "Safe returns ~7.1%", "15 years", "High"),
        suggestion("EPF (Employee Provident Fund)", 100_000.0, "Safe, employer matching", "Till retirement", "Medium"),
        suggestion("NSC (National Savings Certificate)", 100_000.0, "Fixed returns ~7%", "5 years", "Medium"),
        suggestion("Tax Saving FD", 150_000.0, "Fixed returns ~6-7%", "5 years", "Low"),
    ];
    let potential_savings = remaining * ASSUMED_MARGINAL_RATE;

    Ok(Section80cPlan {
        fully_utilized: false,
        remaining,
        potential_savings,
        message: format!(
            "Invest {} more to save up to {} in taxes!",
            format_rupees(remaining),
            format_rupees(potential_savings)
        ),
        suggestions,
    })
}

pub fn nps_benefit(contribution: f64) -> Result<NpsBenefit> {
    ensure_non_negative("NPS contribution", contribution)?;
    let eligible = contribution.min(LIMIT_80CCD_1B);
    Ok(NpsBenefit {
        contribution,
        eligible_deduction: eligible,
        tax_saved: eligible * ASSUMED_MARGINAL_RATE,
        recommendation: if eligible < LIMIT_80CCD_1B {
            "Maximize NPS for extra ₹50,000 deduction beyond 80C!"
        } else {
            "NPS limit optimized!"
        },
    })
}

/// Interest counts under 24B, principal repayment under the 80C cap.
pub fn home_loan_benefit(interest_paid: f64, principal_paid: f64) -> Result<HomeLoanBenefit> {
    ensure_non_negative("interest paid", interest_paid)?;
    ensure_non_negative("principal paid", principal_paid)?;
    let interest_deduction = interest_paid.min(LIMIT_24B);
    let principal_deduction = principal_paid.min(LIMIT_80C);
    let total_benefit = interest_deduction + principal_deduction;
    Ok(HomeLoanBenefit {
        interest_paid,
        interest_deduction,
        principal_paid,
        principal_deduction,
        total_benefit,
        tax_saved: total_benefit * ASSUMED_MARGINAL_RATE,
    })
}
