use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::UNKNOWN_PLACE_NAME;

/// A geodata feature as handed over by the data-fetch layer: a centroid plus its tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl RawPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    pub fn has_valid_coordinates(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// A competing business shown on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyPoint {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

impl SupplyPoint {
    /// None when the point has no usable coordinates
    pub fn from_raw(raw: &RawPoint) -> Option<Self> {
        if !raw.has_valid_coordinates() {
            return None;
        }
        let name = raw
            .tags
            .get("name")
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_PLACE_NAME.to_string());
        Some(Self {
            lat: raw.lat,
            lon: raw.lon,
            name,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandCategory {
    Office,
    Students,
    Residential,
    Transport,
}

/// Demand point counts per category; always sums to the classified total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandBreakdown {
    #[serde(rename = "Office")]
    pub office: usize,
    #[serde(rename = "Students")]
    pub students: usize,
    #[serde(rename = "Residential")]
    pub residential: usize,
    #[serde(rename = "Transport")]
    pub transport: usize,
}

impl DemandBreakdown {
    pub fn add(&mut self, category: DemandCategory) {
        *self.slot(category) += 1;
    }

    pub fn get(&self, category: DemandCategory) -> usize {
        match category {
            DemandCategory::Office => self.office,
            DemandCategory::Students => self.students,
            DemandCategory::Residential => self.residential,
            DemandCategory::Transport => self.transport,
        }
    }

    pub fn total(&self) -> usize {
        self.office + self.students + self.residential + self.transport
    }

    fn slot(&mut self, category: DemandCategory) -> &mut usize {
        match category {
            DemandCategory::Office => &mut self.office,
            DemandCategory::Students => &mut self.students,
            DemandCategory::Residential => &mut self.residential,
            DemandCategory::Transport => &mut self.transport,
        }
    }
}

/// Market-opportunity label derived from the demand/supply ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Uncontested market (high opportunity)")]
    Uncontested,
    #[serde(rename = "High potential")]
    HighPotential,
    #[serde(rename = "Balanced market")]
    Balanced,
    #[serde(rename = "Saturated market")]
    Saturated,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Uncontested => "Uncontested market (high opportunity)",
            Verdict::HighPotential => "High potential",
            Verdict::Balanced => "Balanced market",
            Verdict::Saturated => "Saturated market",
        }
    }

    /// Display hint for the caller's UI
    pub fn color(&self) -> &'static str {
        match self {
            Verdict::Uncontested => "#2980b9",
            Verdict::HighPotential => "#27ae60",
            Verdict::Balanced => "#f39c12",
            Verdict::Saturated => "#c0392b",
        }
    }
}

/// Nearby construction activity as a proxy for future demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthStatus {
    Booming,
    Growing,
    Stable,
}

/// Everything one analysis produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f64,
    pub verdict: Verdict,
    pub verdict_color: String,
    pub supply_count: usize,
    pub demand_count: usize,
    pub demand_breakdown: DemandBreakdown,
    pub growth_status: GrowthStatus,
    pub construction_count: usize,
    pub supply_points: Vec<SupplyPoint>,
    pub demand_points: Vec<DemandPoint>,
}
