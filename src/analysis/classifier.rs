use rand::seq::index;
use rand::Rng;
use tracing::debug;

use super::business::TagFilter;
use super::types::{DemandBreakdown, DemandCategory, DemandPoint, RawPoint};
use crate::constants::MAX_DISPLAY_DEMAND_POINTS;

/// Tag values that mark a demand generator, in priority order
const DEMAND_TAG_PRIORITY: &[(&str, DemandCategory)] = &[
    ("office", DemandCategory::Office),
    ("school", DemandCategory::Students),
    ("university", DemandCategory::Students),
    ("college", DemandCategory::Students),
    ("apartments", DemandCategory::Residential),
    ("condominium", DemandCategory::Residential),
    ("residential", DemandCategory::Residential),
    ("station", DemandCategory::Transport),
];

/// Queries the data-fetch layer runs to collect demand points
pub const DEMAND_QUERY_TAGS: &[TagFilter] = &[
    TagFilter { key: "office", values: &[] },
    TagFilter { key: "amenity", values: &["school", "university", "college"] },
    TagFilter { key: "building", values: &["apartments", "condominium", "residential"] },
    TagFilter { key: "public_transport", values: &["station"] },
];

/// Query for construction sites, counted as a growth signal
pub const CONSTRUCTION_QUERY_TAG: TagFilter = TagFilter {
    key: "landuse",
    values: &["construction"],
};

/// Outcome of classifying one batch of demand points
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub breakdown: DemandBreakdown,
    /// Number of classified points; equals `breakdown.total()`
    pub total: usize,
    /// Points kept for display, at most the classifier's limit
    pub points: Vec<DemandPoint>,
    pub skipped: usize,
}

/// Buckets raw demand points into demand categories
#[derive(Debug, Clone)]
pub struct DemandClassifier {
    max_display_points: usize,
}

impl Default for DemandClassifier {
    fn default() -> Self {
        Self {
            max_display_points: MAX_DISPLAY_DEMAND_POINTS,
        }
    }
}

impl DemandClassifier {
    pub fn new(max_display_points: usize) -> Self {
        Self { max_display_points }
    }

    /// First category in priority order whose tag value the point carries; Residential otherwise
    pub fn categorize(point: &RawPoint) -> DemandCategory {
        DEMAND_TAG_PRIORITY
            .iter()
            .find(|(value, _)| point.tags.values().any(|v| v == value))
            .map(|(_, category)| *category)
            .unwrap_or(DemandCategory::Residential)
    }

    /// Count every valid point; keep a uniform random sample of them for display
    pub fn classify<R: Rng + ?Sized>(&self, points: &[RawPoint], rng: &mut R) -> Classification {
        let mut classification = Classification::default();
        let mut kept = Vec::with_capacity(points.len());

        for point in points {
            if !point.has_valid_coordinates() {
                classification.skipped += 1;
                continue;
            }
            classification.breakdown.add(Self::categorize(point));
            kept.push(DemandPoint {
                lat: point.lat,
                lon: point.lon,
            });
        }

        classification.total = kept.len();
        if classification.skipped > 0 {
            debug!("Skipped {} demand points without coordinates", classification.skipped);
        }

        classification.points = if kept.len() > self.max_display_points {
            let mut picked = index::sample(rng, kept.len(), self.max_display_points).into_vec();
            picked.sort_unstable();
            picked.into_iter().map(|i| kept[i]).collect()
        } else {
            kept
        };

        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_categorize_by_tag_value() {
        let office = RawPoint::new(0.0, 0.0).with_tag("building", "office");
        let school = RawPoint::new(0.0, 0.0).with_tag("amenity", "university");
        let condo = RawPoint::new(0.0, 0.0).with_tag("building", "condominium");
        let station = RawPoint::new(0.0, 0.0).with_tag("public_transport", "station");

        assert_eq!(DemandClassifier::categorize(&office), DemandCategory::Office);
        assert_eq!(DemandClassifier::categorize(&school), DemandCategory::Students);
        assert_eq!(DemandClassifier::categorize(&condo), DemandCategory::Residential);
        assert_eq!(DemandClassifier::categorize(&station), DemandCategory::Transport);
    }

    #[test]
    fn test_untagged_point_defaults_to_residential() {
        let point = RawPoint::new(0.0, 0.0).with_tag("office", "company");
        assert_eq!(DemandClassifier::categorize(&point), DemandCategory::Residential);
    }

    #[test]
    fn test_multiple_matches_follow_priority_not_tag_order() {
        // "amenity" sorts before "building", but office outranks school
        let point = RawPoint::new(0.0, 0.0)
            .with_tag("amenity", "school")
            .with_tag("building", "office");
        assert_eq!(DemandClassifier::categorize(&point), DemandCategory::Office);
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let points = vec![
            RawPoint::new(1.0, 1.0).with_tag("building", "office"),
            RawPoint::new(1.0, 1.0).with_tag("amenity", "school"),
            RawPoint::new(1.0, 1.0).with_tag("amenity", "college"),
            RawPoint::new(1.0, 1.0),
            RawPoint::new(1.0, 1.0).with_tag("public_transport", "station"),
        ];
        let result = DemandClassifier::default().classify(&points, &mut rng());

        assert_eq!(result.total, 5);
        assert_eq!(result.breakdown.total(), result.total);
        assert_eq!(result.breakdown.get(DemandCategory::Students), 2);
        assert_eq!(result.breakdown.get(DemandCategory::Transport), 1);
        assert_eq!(
            result.breakdown,
            DemandBreakdown {
                office: 1,
                students: 2,
                residential: 1,
                transport: 1,
            }
        );
    }

    #[test]
    fn test_query_tags_reach_every_category() {
        let queried =
            |key: &str, value: &str| DEMAND_QUERY_TAGS.iter().any(|f| f.matches(key, value));
        assert!(queried("office", "company"));
        assert!(queried("amenity", "university"));
        assert!(queried("building", "condominium"));
        assert!(queried("public_transport", "station"));
        assert!(!queried("amenity", "cafe"));

        assert!(CONSTRUCTION_QUERY_TAG.matches("landuse", "construction"));
        assert!(!CONSTRUCTION_QUERY_TAG.matches("landuse", "residential"));
    }

    #[test]
    fn test_empty_input() {
        let result = DemandClassifier::default().classify(&[], &mut rng());
        assert_eq!(result.total, 0);
        assert_eq!(result.breakdown, DemandBreakdown::default());
        assert!(result.points.is_empty());
    }

    #[test]
    fn test_invalid_points_are_skipped() {
        let points = vec![
            RawPoint::new(f64::NAN, 1.0).with_tag("building", "office"),
            RawPoint::new(1.0, 1.0).with_tag("building", "office"),
        ];
        let result = DemandClassifier::default().classify(&points, &mut rng());
        assert_eq!(result.total, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.breakdown.office, 1);
    }

    #[test]
    fn test_sampling_caps_points_but_not_counts() {
        let points: Vec<RawPoint> = (0..25)
            .map(|i| RawPoint::new(i as f64, 0.0).with_tag("building", "apartments"))
            .collect();
        let result = DemandClassifier::new(10).classify(&points, &mut rng());

        assert_eq!(result.total, 25);
        assert_eq!(result.breakdown.residential, 25);
        assert_eq!(result.points.len(), 10);

        // Sampled without replacement, original order kept
        let lats: Vec<f64> = result.points.iter().map(|p| p.lat).collect();
        assert!(lats.windows(2).all(|w| w[0] < w[1]));
    }
}
