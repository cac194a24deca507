use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One place returned by the geocoder for a free-text query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
    pub place_class: String,
    pub place_type: String,
    /// Geocoder's own 0-1 relevance signal
    pub importance: f64,
    /// Country component of the structured address, when the geocoder sent one
    pub country: Option<String>,
}

impl SearchCandidate {
    /// Read a geocoder JSON item; `None` if any required field is missing or malformed.
    ///
    /// Coordinates and importance are accepted as numbers or numeric strings,
    /// since Nominatim sends `lat`/`lon` as strings.
    pub fn from_json(item: &Value) -> Option<Self> {
        let display_name = item.get("display_name")?.as_str()?.to_string();
        let lat = number_field(item, "lat")?;
        let lon = number_field(item, "lon")?;
        let importance = match item.get("importance") {
            None | Some(Value::Null) => 0.0,
            Some(_) => number_field(item, "importance")?,
        };

        Some(Self {
            display_name,
            lat,
            lon,
            place_class: text_field(item, "class"),
            place_type: text_field(item, "type"),
            importance,
            country: item
                .get("address")
                .and_then(|address| address.get("country"))
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    /// Number of comma-separated components in the display name
    pub fn name_segments(&self) -> usize {
        self.display_name.split(',').count()
    }
}

fn number_field(item: &Value, key: &str) -> Option<f64> {
    let value = match item.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn text_field(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// A candidate with its computed relevance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: SearchCandidate,
    pub relevance_score: f64,
}

/// What the caller gets back: the ranking score is internal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<RankedCandidate> for Suggestion {
    fn from(ranked: RankedCandidate) -> Self {
        Self {
            display_name: ranked.candidate.display_name,
            lat: ranked.candidate.lat,
            lon: ranked.candidate.lon,
        }
    }
}
