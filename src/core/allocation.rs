use super::types::{Allocation, RiskTier};

pub fn allocation_for(tier: RiskTier) -> Allocation {
    match tier {
        RiskTier::Low => Allocation {
            equity: 20.0,
            mutual_funds: 20.0,
            debt: 50.0,
            liquid: 10.0,
        },
        RiskTier::Medium => Allocation {
            equity: 30.0,
            mutual_funds: 30.0,
            debt: 30.0,
            liquid: 10.0,
        },
        RiskTier::High => Allocation {
            equity: 45.0,
            mutual_funds: 35.0,
            debt: 15.0,
            liquid: 5.0,
        },
    }
}

/// Assumed annual return for a tier, in percent.
pub fn expected_annual_return(tier: RiskTier) -> f64 {
    match tier {
        RiskTier::Low => 8.0,
        RiskTier::Medium => 12.0,
        RiskTier::High => 15.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tier_sums_to_one_hundred() {
        for tier in RiskTier::ALL {
            let allocation = allocation_for(tier);
            assert_eq!(allocation.total(), 100.0, "tier {tier:?}");
            assert!(allocation.entries().iter().all(|(_, pct)| *pct >= 0.0));
        }
    }

    #[test]
    fn medium_tier_matches_balanced_split() {
        let allocation = allocation_for(RiskTier::Medium);
        assert_eq!(allocation.equity, 30.0);
        assert_eq!(allocation.mutual_funds, 30.0);
        assert_eq!(allocation.debt, 30.0);
        assert_eq!(allocation.liquid, 10.0);
    }

    #[test]
    fn riskier_tiers_hold_more_equity_and_less_debt() {
        let low = allocation_for(RiskTier::Low);
        let high = allocation_for(RiskTier::High);
        assert!(high.equity > low.equity);
        assert!(high.debt < low.debt);
        assert!(expected_annual_return(RiskTier::High) > expected_annual_return(RiskTier::Low));
    }

    #[test]
    fn unknown_label_uses_medium_table() {
        let fallback = allocation_for(RiskTier::from_label("unknown"));
        assert_eq!(fallback, allocation_for(RiskTier::Medium));
        assert_eq!(expected_annual_return(RiskTier::from_label("?")), 12.0);
    }
}
