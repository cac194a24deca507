use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::SiteError;

/// A tag query the geodata collaborator runs: `key` equal to any of `values`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagFilter {
    pub key: &'static str,
    /// Empty means "any value"
    pub values: &'static [&'static str],
}

impl TagFilter {
    /// True if a feature tagged `key=value` would be returned by this query
    pub fn matches(&self, key: &str, value: &str) -> bool {
        self.key == key && (self.values.is_empty() || self.values.contains(&value))
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            write!(f, "{}=*", self.key)
        } else {
            write!(f, "{}={}", self.key, self.values.join("|"))
        }
    }
}

/// The business types a site can be evaluated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BusinessType {
    #[serde(rename = "Cafe")]
    Cafe,
    #[serde(rename = "Restaurant")]
    Restaurant,
    #[serde(rename = "Bar/Pub")]
    BarPub,
    #[serde(rename = "Convenience Store")]
    ConvenienceStore,
    #[serde(rename = "Pharmacy")]
    Pharmacy,
    #[serde(rename = "Gym/Fitness")]
    GymFitness,
    #[serde(rename = "Coworking Space")]
    CoworkingSpace,
}

impl BusinessType {
    pub const ALL: [BusinessType; 7] = [
        BusinessType::Cafe,
        BusinessType::Restaurant,
        BusinessType::BarPub,
        BusinessType::ConvenienceStore,
        BusinessType::Pharmacy,
        BusinessType::GymFitness,
        BusinessType::CoworkingSpace,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BusinessType::Cafe => "Cafe",
            BusinessType::Restaurant => "Restaurant",
            BusinessType::BarPub => "Bar/Pub",
            BusinessType::ConvenienceStore => "Convenience Store",
            BusinessType::Pharmacy => "Pharmacy",
            BusinessType::GymFitness => "Gym/Fitness",
            BusinessType::CoworkingSpace => "Coworking Space",
        }
    }

    /// Features that count as competing supply for this business type
    pub fn supply_tags(&self) -> TagFilter {
        match self {
            BusinessType::Cafe => TagFilter { key: "amenity", values: &["cafe"] },
            BusinessType::Restaurant => TagFilter { key: "amenity", values: &["restaurant"] },
            BusinessType::BarPub => TagFilter { key: "amenity", values: &["bar", "pub"] },
            BusinessType::ConvenienceStore => TagFilter { key: "shop", values: &["convenience"] },
            BusinessType::Pharmacy => TagFilter { key: "amenity", values: &["pharmacy"] },
            BusinessType::GymFitness => TagFilter { key: "leisure", values: &["fitness_centre"] },
            BusinessType::CoworkingSpace => {
                TagFilter { key: "amenity", values: &["coworking_space"] }
            }
        }
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BusinessType {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BusinessType::ALL
            .into_iter()
            .find(|bt| bt.name() == s)
            .ok_or_else(|| SiteError::UnknownBusinessType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_every_name() {
        for business_type in BusinessType::ALL {
            assert_eq!(business_type.name().parse::<BusinessType>().unwrap(), business_type);
        }
    }

    #[test]
    fn test_unknown_business_type_is_a_distinct_error() {
        let err = "Bakery".parse::<BusinessType>().unwrap_err();
        assert!(matches!(err, SiteError::UnknownBusinessType(ref name) if name == "Bakery"));
        assert!(!err.is_store_error());
    }

    #[test]
    fn test_serializes_as_display_name() {
        let json = serde_json::to_string(&BusinessType::BarPub).unwrap();
        assert_eq!(json, "\"Bar/Pub\"");
    }

    #[test]
    fn test_supply_tags() {
        let tags = BusinessType::BarPub.supply_tags();
        assert_eq!(tags.key, "amenity");
        assert_eq!(tags.values, &["bar", "pub"]);
        assert_eq!(BusinessType::GymFitness.supply_tags().key, "leisure");
    }

    #[test]
    fn test_tag_filter_matching_and_display() {
        let bars = BusinessType::BarPub.supply_tags();
        assert!(bars.matches("amenity", "pub"));
        assert!(!bars.matches("amenity", "cafe"));
        assert!(!bars.matches("shop", "pub"));
        assert_eq!(bars.to_string(), "amenity=bar|pub");

        let any_office = TagFilter { key: "office", values: &[] };
        assert!(any_office.matches("office", "company"));
        assert_eq!(any_office.to_string(), "office=*");
    }
}
