use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;

use crate::analysis::BusinessType;
use crate::constants::CACHE_KEY_COORD_DIGITS;
use crate::utils::round_to;

/// The closed set of parameters an analysis result is cached under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub lat: f64,
    pub lon: f64,
    pub business_type: BusinessType,
    pub radius: u32,
}

impl AnalysisParams {
    /// Normalize request parameters; coordinates are rounded so nearby clicks share a key
    pub fn new(lat: f64, lon: f64, business_type: BusinessType, radius: u32) -> Self {
        Self {
            lat: round_to(lat, CACHE_KEY_COORD_DIGITS),
            lon: round_to(lon, CACHE_KEY_COORD_DIGITS),
            business_type,
            radius,
        }
    }

    /// Canonical serialization: fields keyed by name, sorted lexicographically
    pub fn canonical_string(&self) -> String {
        // serde_json's Map is BTree-backed, so iteration (and output) order is sorted
        let mut fields = Map::new();
        fields.insert("business_type".into(), Value::from(self.business_type.name()));
        fields.insert("lat".into(), Value::from(self.lat));
        fields.insert("lon".into(), Value::from(self.lon));
        fields.insert("radius".into(), Value::from(self.radius));
        Value::Object(fields).to_string()
    }
}

/// Key for cache entries: hex SHA-256 of the canonical parameter string
#[derive(Debug, Clone, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(params: &AnalysisParams) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(params.canonical_string().as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cache entry as persisted: `{timestamp, params, data}`, one file per key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Carried by the file name, not the record
    #[serde(skip)]
    pub key: CacheKey,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Local>,
    pub params: AnalysisParams,
    pub data: T,
}

/// Just enough of an entry to decide whether it has expired
#[derive(Debug, Deserialize)]
pub(crate) struct EntryStamp {
    pub timestamp: DateTime<Local>,
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_cached_items: usize,
    pub cache_dir: PathBuf,
    pub ttl_hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canonical_string_is_sorted() {
        let params = AnalysisParams::new(13.75634, 100.50181, BusinessType::Cafe, 1000);
        assert_eq!(
            params.canonical_string(),
            r#"{"business_type":"Cafe","lat":13.7563,"lon":100.5018,"radius":1000}"#
        );
    }

    #[test]
    fn test_key_independent_of_construction_order() {
        let a = AnalysisParams::new(13.7563, 100.5018, BusinessType::Pharmacy, 500);
        let b = AnalysisParams {
            radius: 500,
            business_type: BusinessType::Pharmacy,
            lon: 100.5018,
            lat: 13.7563,
        };
        assert_eq!(CacheKey::derive(&a), CacheKey::derive(&b));
        assert_eq!(CacheKey::derive(&a).as_str().len(), 64);
    }

    #[test]
    fn test_key_distinguishes_parameters() {
        let base = AnalysisParams::new(13.7563, 100.5018, BusinessType::Cafe, 1000);
        let other_type = AnalysisParams::new(13.7563, 100.5018, BusinessType::Restaurant, 1000);
        let other_radius = AnalysisParams::new(13.7563, 100.5018, BusinessType::Cafe, 1500);
        assert_ne!(CacheKey::derive(&base), CacheKey::derive(&other_type));
        assert_ne!(CacheKey::derive(&base), CacheKey::derive(&other_radius));
    }

    #[test]
    fn test_nearby_coordinates_share_key() {
        let a = AnalysisParams::new(13.75631, 100.50179, BusinessType::Cafe, 1000);
        let b = AnalysisParams::new(13.75629, 100.50182, BusinessType::Cafe, 1000);
        assert_eq!(CacheKey::derive(&a), CacheKey::derive(&b));
    }
}
