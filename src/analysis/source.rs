use serde::Deserialize;
use std::path::Path;

use super::analyzer::SiteRequest;
use super::types::RawPoint;
use crate::utils::SiteError;

/// The geodata collaborator: answers point+radius queries with already-fetched features.
///
/// The core never performs network I/O itself; implementations own their own
/// timeouts and retries.
#[cfg_attr(test, mockall::automock)]
pub trait GeoDataSource {
    /// Competing businesses matching `request.business_type.supply_tags()`
    fn supply_points(&self, request: &SiteRequest) -> Result<Vec<RawPoint>, SiteError>;

    /// Demand generators matching `DEMAND_QUERY_TAGS`
    fn demand_points(&self, request: &SiteRequest) -> Result<Vec<RawPoint>, SiteError>;

    /// Number of features matching `CONSTRUCTION_QUERY_TAG`
    fn construction_count(&self, request: &SiteRequest) -> Result<usize, SiteError>;
}

/// The three independently fallible inputs of one analysis
#[derive(Debug)]
pub struct SiteData {
    pub supply: Result<Vec<RawPoint>, SiteError>,
    pub demand: Result<Vec<RawPoint>, SiteError>,
    pub construction: Result<usize, SiteError>,
}

impl SiteData {
    /// Run all three queries; one failing never stops the others
    pub fn fetch(source: &dyn GeoDataSource, request: &SiteRequest) -> Self {
        Self {
            supply: source.supply_points(request),
            demand: source.demand_points(request),
            construction: source.construction_count(request),
        }
    }
}

/// A pre-fetched JSON snapshot of an area, e.g. exported from an Overpass query.
///
/// Any facet left out of the file reports as a source failure for that facet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotSource {
    #[serde(default)]
    pub supply: Option<Vec<RawPoint>>,
    #[serde(default)]
    pub demand: Option<Vec<RawPoint>>,
    #[serde(default)]
    pub construction_count: Option<usize>,
}

impl SnapshotSource {
    pub fn from_json(json: &str) -> Result<Self, SiteError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SiteError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl GeoDataSource for SnapshotSource {
    fn supply_points(&self, _request: &SiteRequest) -> Result<Vec<RawPoint>, SiteError> {
        self.supply
            .clone()
            .ok_or_else(|| SiteError::source_failure("supply", "not present in snapshot"))
    }

    fn demand_points(&self, _request: &SiteRequest) -> Result<Vec<RawPoint>, SiteError> {
        self.demand
            .clone()
            .ok_or_else(|| SiteError::source_failure("demand", "not present in snapshot"))
    }

    fn construction_count(&self, _request: &SiteRequest) -> Result<usize, SiteError> {
        self.construction_count
            .ok_or_else(|| SiteError::source_failure("construction", "not present in snapshot"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::BusinessType;

    fn request() -> SiteRequest {
        SiteRequest::new(13.7563, 100.5018, BusinessType::Cafe, 1000)
    }

    #[test]
    fn test_snapshot_parses_tags() {
        let snapshot = SnapshotSource::from_json(
            r#"{
                "supply": [{"lat": 13.75, "lon": 100.5, "tags": {"amenity": "cafe", "name": "Brew"}}],
                "demand": [{"lat": 13.76, "lon": 100.51}],
                "construction_count": 3
            }"#,
        )
        .unwrap();

        let data = SiteData::fetch(&snapshot, &request());
        let supply = data.supply.unwrap();
        assert_eq!(supply[0].tags["name"], "Brew");
        assert!(data.demand.unwrap()[0].tags.is_empty());
        assert_eq!(data.construction.unwrap(), 3);
    }

    #[test]
    fn test_missing_facet_is_a_source_error() {
        let snapshot = SnapshotSource::from_json(r#"{"demand": []}"#).unwrap();
        let data = SiteData::fetch(&snapshot, &request());

        assert!(matches!(data.supply, Err(SiteError::SourceError { source_name: "supply", .. })));
        assert!(data.demand.is_ok());
        assert!(data.construction.is_err());
    }
}
