use serde_json::Value;
use tracing::{debug, warn};

use super::types::{RankedCandidate, SearchCandidate, Suggestion};
use crate::constants::{
    ANYWHERE_MATCH_BONUS, EXCLUDED_PLACE_TYPES, FIRST_SEGMENT_MATCH_BONUS, IMPORTANCE_WEIGHT,
    MAX_SUGGESTIONS, PREFIX_MATCH_BONUS, UNKNOWN_CLASS_SCORE, UNKNOWN_PLACE_TYPE_SCORE,
};

/// Configuration for the ranking system
#[derive(Debug, Clone)]
pub struct RankerConfig {
    pub max_results: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_SUGGESTIONS,
        }
    }
}

/// Orders geocoder candidates so specific places beat broad regions
#[derive(Debug, Clone, Default)]
pub struct RelevanceRanker {
    config: RankerConfig,
}

impl RelevanceRanker {
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }

    /// Rank a raw geocoder response body; an unparseable body yields no suggestions
    pub fn rank_response(&self, query: &str, body: &str) -> Vec<Suggestion> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Array(items)) => self.rank_json(query, &items),
            Ok(other) => {
                warn!("Geocoder response is not a list: {}", other);
                Vec::new()
            }
            Err(e) => {
                warn!("Error parsing geocoder response: {}", e);
                Vec::new()
            }
        }
    }

    /// Rank raw JSON items, skipping any that are malformed
    pub fn rank_json(&self, query: &str, items: &[Value]) -> Vec<Suggestion> {
        let candidates: Vec<SearchCandidate> = items
            .iter()
            .filter_map(|item| {
                let candidate = SearchCandidate::from_json(item);
                if candidate.is_none() {
                    debug!("Skipping malformed candidate: {}", item);
                }
                candidate
            })
            .collect();

        self.search_rank(query, &candidates)
    }

    /// Top suggestions with the internal score stripped
    pub fn search_rank(&self, query: &str, candidates: &[SearchCandidate]) -> Vec<Suggestion> {
        self.rank(query, candidates)
            .into_iter()
            .map(Suggestion::from)
            .collect()
    }

    /// Score, stable-sort descending and truncate; excluded candidates are dropped
    pub fn rank(&self, query: &str, candidates: &[SearchCandidate]) -> Vec<RankedCandidate> {
        let query = query.to_lowercase();

        let mut ranked: Vec<RankedCandidate> = candidates
            .iter()
            .filter(|candidate| !is_excluded(candidate))
            .map(|candidate| RankedCandidate {
                relevance_score: relevance_score(candidate, &query),
                candidate: candidate.clone(),
            })
            .collect();

        // sort_by is stable: equal scores keep input order
        ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        ranked.truncate(self.config.max_results);
        ranked
    }
}

/// Bare countries and seas/oceans/continents are never useful site searches
pub fn is_excluded(candidate: &SearchCandidate) -> bool {
    let class = candidate.place_class.as_str();
    let kind = candidate.place_type.as_str();

    let country_level = match class {
        "boundary" => matches!(kind, "country" | "administrative"),
        "place" => kind == "country",
        _ => false,
    };
    if country_level && candidate.name_segments() <= 1 {
        return true;
    }

    EXCLUDED_PLACE_TYPES.contains(&kind)
}

/// Specificity of a place by its class (and, for `place`, its type)
pub fn base_score(place_class: &str, place_type: &str) -> f64 {
    match place_class {
        "amenity" => 100.0,
        "shop" => 95.0,
        "tourism" => 90.0,
        "leisure" => 85.0,
        "building" => 80.0,
        "highway" => 70.0,
        "boundary" => 20.0,
        "place" => match place_type {
            "city_block" => 62.0,
            "neighbourhood" => 60.0,
            "quarter" => 58.0,
            "suburb" => 55.0,
            "hamlet" => 50.0,
            "village" => 45.0,
            "town" => 40.0,
            "city" => 35.0,
            "state" => 10.0,
            "country" => 5.0,
            _ => UNKNOWN_PLACE_TYPE_SCORE,
        },
        _ => UNKNOWN_CLASS_SCORE,
    }
}

/// Bonus for where the query appears in the display name; `query` must be lowercase
pub fn name_match_bonus(display_name: &str, query: &str) -> f64 {
    let name = display_name.to_lowercase();
    let first_segment = name.split(',').next().unwrap_or_default();

    if name.starts_with(query) {
        PREFIX_MATCH_BONUS
    } else if first_segment.contains(query) {
        FIRST_SEGMENT_MATCH_BONUS
    } else if name.contains(query) {
        ANYWHERE_MATCH_BONUS
    } else {
        0.0
    }
}

fn relevance_score(candidate: &SearchCandidate, query: &str) -> f64 {
    base_score(&candidate.place_class, &candidate.place_type)
        + candidate.importance * IMPORTANCE_WEIGHT
        + name_match_bonus(&candidate.display_name, query)
}
