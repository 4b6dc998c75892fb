use serde::{Serialize, Serializer};
use tracing::warn;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    /// Lenient parse used by the outer layers. Anything that is not a known
    /// tier label is treated as `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" | "conservative" => RiskTier::Low,
            "medium" | "moderate" => RiskTier::Medium,
            "high" | "aggressive" => RiskTier::High,
            other => {
                warn!(label = other, "unknown risk tier, falling back to Medium");
                RiskTier::Medium
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

/// Target weights in percent across the four asset buckets.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub equity: f64,
    pub mutual_funds: f64,
    pub debt: f64,
    pub liquid: f64,
}

impl Allocation {
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("equity", self.equity),
            ("mutual_funds", self.mutual_funds),
            ("debt", self.debt),
            ("liquid", self.liquid),
        ]
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, pct)| pct).sum()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub horizon_years: u32,
    #[serde(serialize_with = "money")]
    pub total_value: f64,
    #[serde(serialize_with = "money")]
    pub invested_amount: f64,
    #[serde(serialize_with = "money")]
    pub gains: f64,
}

pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Serializes an engine amount rounded to paise. Engine values stay at full
/// precision until they cross this boundary.
pub fn money<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_money(*value))
}

/// Whole-rupee display with western digit grouping, e.g. `₹1,234,567`.
pub fn format_rupees(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}₹{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_accepts_known_tiers_case_insensitively() {
        assert_eq!(RiskTier::from_label("low"), RiskTier::Low);
        assert_eq!(RiskTier::from_label(" HIGH "), RiskTier::High);
        assert_eq!(RiskTier::from_label("Medium"), RiskTier::Medium);
    }

    #[test]
    fn from_label_falls_back_to_medium() {
        assert_eq!(RiskTier::from_label("yolo"), RiskTier::Medium);
        assert_eq!(RiskTier::from_label(""), RiskTier::Medium);
    }

    #[test]
    fn round_money_keeps_two_decimals() {
        assert_eq!(round_money(1234.5678), 1234.57);
        assert_eq!(round_money(0.004), 0.0);
        assert_eq!(round_money(-10.125), -10.13);
    }

    #[test]
    fn format_rupees_groups_thousands() {
        assert_eq!(format_rupees(0.0), "₹0");
        assert_eq!(format_rupees(999.4), "₹999");
        assert_eq!(format_rupees(1000.0), "₹1,000");
        assert_eq!(format_rupees(1_234_567.8), "₹1,234,568");
        assert_eq!(format_rupees(-46_800.0), "-₹46,800");
    }

    #[test]
    fn money_serializer_rounds_at_the_boundary() {
        let point = ProjectionPoint {
            horizon_years: 1,
            total_value: 100.456,
            invested_amount: 100.0,
            gains: 0.456,
        };
        let json = serde_json::to_string(&point).expect("serialize");
        assert_eq!(
            json,
            r#"{"horizonYears":1,"totalValue":100.46,"investedAmount":100.0,"gains":0.46}"#
        );
    }
}
