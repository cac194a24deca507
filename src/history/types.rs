use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::{AnalysisResult, BusinessType, GrowthStatus, Verdict};
use crate::constants::HISTORY_COORD_DIGITS;
use crate::utils::round_to;

/// Stored location, rounded to 6 decimal digits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn rounded(lat: f64, lon: f64) -> Self {
        Self {
            lat: round_to(lat, HISTORY_COORD_DIGITS),
            lon: round_to(lon, HISTORY_COORD_DIGITS),
        }
    }

    /// Axis-aligned box check, each axis independently
    pub fn is_within(&self, lat: f64, lon: f64, tolerance: f64) -> bool {
        (self.lat - lat).abs() <= tolerance && (self.lon - lon).abs() <= tolerance
    }
}

/// The headline numbers of an analysis, without the point lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub score: f64,
    pub verdict: Verdict,
    pub supply_count: usize,
    pub demand_count: usize,
    pub growth_status: GrowthStatus,
    pub construction_count: usize,
}

impl From<&AnalysisResult> for ResultSummary {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            score: result.score,
            verdict: result.verdict,
            supply_count: result.supply_count,
            demand_count: result.demand_count,
            growth_status: result.growth_status,
            construction_count: result.construction_count,
        }
    }
}

/// One immutable record of a past analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Local>,
    pub location: Location,
    pub business_type: BusinessType,
    pub radius: u32,
    pub result: ResultSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DateRange {
    pub first: Option<DateTime<Local>>,
    pub last: Option<DateTime<Local>>,
}

/// Aggregates over the whole log
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_analyses: usize,
    pub business_types: BTreeMap<BusinessType, usize>,
    pub average_score: f64,
    pub most_analyzed_type: Option<BusinessType>,
    pub date_range: DateRange,
}
