// Gateway module for analysis - follows the Train Station Pattern
// All external access must go through this gateway

mod analyzer;
mod business;
mod classifier;
mod scorer;
mod source;
mod types;

pub use analyzer::{analyze, analyze_with_rng, SiteAnalyzer, SiteRequest};
pub use business::{BusinessType, TagFilter};
pub use classifier::{Classification, DemandClassifier, CONSTRUCTION_QUERY_TAG, DEMAND_QUERY_TAGS};
pub use scorer::{Opportunity, OpportunityScorer};
pub use source::{GeoDataSource, SiteData, SnapshotSource};
pub use types::{
    AnalysisResult, DemandBreakdown, DemandCategory, DemandPoint, GrowthStatus, RawPoint,
    SupplyPoint, Verdict,
};
