use serde::Serialize;

use super::types::{GrowthStatus, Verdict};
use crate::constants::{
    BALANCED_SCORE, BOOMING_CONSTRUCTION, GROWING_CONSTRUCTION, HIGH_POTENTIAL_SCORE, SCORE_DIGITS,
};
use crate::utils::round_to;

/// Score, verdict and growth label for one site
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Opportunity {
    pub score: f64,
    pub verdict: Verdict,
    pub growth_status: GrowthStatus,
}

/// Turns supply, demand and construction counts into an `Opportunity`
pub struct OpportunityScorer;

impl OpportunityScorer {
    pub fn assess(supply_count: usize, demand_count: usize, construction_count: usize) -> Opportunity {
        let score = Self::score(supply_count, demand_count);
        Opportunity {
            score,
            verdict: Self::verdict(supply_count, demand_count, score),
            growth_status: Self::growth(construction_count),
        }
    }

    /// Demand per competitor, two decimals; no supply counts as one competitor
    pub fn score(supply_count: usize, demand_count: usize) -> f64 {
        let divisor = supply_count.max(1);
        round_to(demand_count as f64 / divisor as f64, SCORE_DIGITS)
    }

    pub fn verdict(supply_count: usize, demand_count: usize, score: f64) -> Verdict {
        if supply_count == 0 && demand_count > 0 {
            Verdict::Uncontested
        } else if score > HIGH_POTENTIAL_SCORE {
            Verdict::HighPotential
        } else if score > BALANCED_SCORE {
            Verdict::Balanced
        } else {
            Verdict::Saturated
        }
    }

    pub fn growth(construction_count: usize) -> GrowthStatus {
        if construction_count > BOOMING_CONSTRUCTION {
            GrowthStatus::Booming
        } else if construction_count > GROWING_CONSTRUCTION {
            GrowthStatus::Growing
        } else {
            GrowthStatus::Stable
        }
    }
}
