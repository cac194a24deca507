use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::business::BusinessType;
use super::classifier::DemandClassifier;
use super::scorer::OpportunityScorer;
use super::source::{GeoDataSource, SiteData};
use super::types::{AnalysisResult, SupplyPoint};
use crate::cache::{AnalysisParams, KeyedCache};
use crate::history::HistoryLog;
use crate::utils::SiteError;

/// One site evaluation request, already validated by the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteRequest {
    pub lat: f64,
    pub lon: f64,
    pub business_type: BusinessType,
    pub radius: u32,
}

impl SiteRequest {
    pub fn new(lat: f64, lon: f64, business_type: BusinessType, radius: u32) -> Self {
        Self {
            lat,
            lon,
            business_type,
            radius,
        }
    }

    /// Build from an untyped business type name; an unknown name is a contract violation
    pub fn parse(lat: f64, lon: f64, business_type: &str, radius: u32) -> Result<Self, SiteError> {
        Ok(Self::new(lat, lon, business_type.parse()?, radius))
    }

    pub fn cache_params(&self) -> AnalysisParams {
        AnalysisParams::new(self.lat, self.lon, self.business_type, self.radius)
    }
}

/// Score a site from raw data. Failed facets are logged and contribute zero.
pub fn analyze(request: &SiteRequest, data: SiteData) -> AnalysisResult {
    analyze_with_rng(request, data, &DemandClassifier::default(), &mut rand::thread_rng())
}

pub fn analyze_with_rng<R: Rng + ?Sized>(
    request: &SiteRequest,
    data: SiteData,
    classifier: &DemandClassifier,
    rng: &mut R,
) -> AnalysisResult {
    let supply_points: Vec<SupplyPoint> = match data.supply {
        Ok(raw) => raw.iter().filter_map(SupplyPoint::from_raw).collect(),
        Err(e) => {
            warn!("Error supply for {}: {}", request.business_type, e);
            Vec::new()
        }
    };

    let demand = match data.demand {
        Ok(raw) => classifier.classify(&raw, rng),
        Err(e) => {
            warn!("Error demand: {}", e);
            Default::default()
        }
    };

    let construction_count = data.construction.unwrap_or_else(|e| {
        warn!("Error construction: {}", e);
        0
    });

    let opportunity =
        OpportunityScorer::assess(supply_points.len(), demand.total, construction_count);

    AnalysisResult {
        score: opportunity.score,
        verdict: opportunity.verdict,
        verdict_color: opportunity.verdict.color().to_string(),
        supply_count: supply_points.len(),
        demand_count: demand.total,
        demand_breakdown: demand.breakdown,
        growth_status: opportunity.growth_status,
        construction_count,
        supply_points,
        demand_points: demand.points,
    }
}

/// Cache-first analysis service: owns the two shared stores
pub struct SiteAnalyzer {
    cache: KeyedCache,
    history: HistoryLog,
    classifier: DemandClassifier,
}

impl SiteAnalyzer {
    pub fn new(cache: KeyedCache, history: HistoryLog) -> Self {
        Self {
            cache,
            history,
            classifier: DemandClassifier::default(),
        }
    }

    pub fn cache(&self) -> &KeyedCache {
        &self.cache
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Return the cached result, or fetch, score, cache and record a fresh one
    pub fn analyze(&self, request: &SiteRequest, source: &dyn GeoDataSource) -> AnalysisResult {
        let params = request.cache_params();
        if let Some(cached) = self.cache.get::<AnalysisResult>(&params) {
            info!(
                "Returning cached result for {} at ({}, {})",
                request.business_type, params.lat, params.lon
            );
            return cached;
        }

        info!(
            "Analyzing {} at ({}, {}) within {}m",
            request.business_type, request.lat, request.lon, request.radius
        );
        let data = SiteData::fetch(source, request);
        let result = analyze_with_rng(request, data, &self.classifier, &mut rand::thread_rng());

        self.cache.set(&params, &result);
        self.history.append(
            request.lat,
            request.lon,
            request.business_type,
            request.radius,
            &result,
        );

        result
    }
}
